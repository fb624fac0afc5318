//! Discovery: which nodes of a batch (or of the whole page) need work.
//!
//! ```text
//! inserted root ─┬─ img / source ─────▶ Media
//!                ├─ table link ───────▶ TableLink
//!                └─ anything else ────▶ scan subtree for both kinds
//! ```

use std::sync::LazyLock;

use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use crate::dom::{Document, NodeExt, NodeRef, Selector};
use crate::inline::{TABLE_LINK, is_table_link};

use super::NodeHandler;

/// Elements whose `src`/`srcset` get enhanced.
const MEDIA_TAGS: [&str; 2] = ["img", "source"];

static MEDIA: LazyLock<Selector> = LazyLock::new(|| Selector::builtin("img, source"));

/// One node that needs work
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    Media(NodeRef),
    TableLink(NodeRef),
}

impl Target {
    pub fn node(&self) -> &NodeRef {
        match self {
            Self::Media(node) | Self::TableLink(node) => node,
        }
    }
}

#[inline]
fn is_media(node: &NodeRef) -> bool {
    node.tag().is_some_and(|tag| MEDIA_TAGS.contains(&tag))
}

/// Classify a single node on its own, without looking inside it.
fn classify(node: &NodeRef) -> Option<Target> {
    if is_media(node) {
        Some(Target::Media(node.clone()))
    } else if is_table_link(node) {
        Some(Target::TableLink(node.clone()))
    } else {
        None
    }
}

/// Collect the targets of one batch of inserted roots, in document order per root.
///
/// A node reachable from several roots (a root inserted inside another root
/// of the same batch) is reported once. Roots no longer connected are skipped.
pub fn collect_targets(doc: &Document, roots: &[NodeRef]) -> SmallVec<[Target; 8]> {
    let mut seen = FxHashSet::default();
    let mut targets = SmallVec::new();

    for root in roots {
        if !doc.is_connected(root) {
            crate::debug!("watch"; "skipping detached <{}>", root.tag().unwrap_or("#text"));
            continue;
        }

        if let Some(target) = classify(root) {
            if seen.insert(root.key()) {
                targets.push(target);
            }
            continue;
        }

        for node in root.descendants() {
            if let Some(target) = classify(&node)
                && seen.insert(node.key())
            {
                targets.push(target);
            }
        }
    }

    targets
}

/// Run `handler` on every target of a batch. Returns the number handled.
pub fn dispatch(doc: &Document, handler: &dyn NodeHandler, roots: &[NodeRef]) -> usize {
    let targets = collect_targets(doc, roots);
    for target in &targets {
        match target {
            Target::Media(node) => handler.on_media(node),
            Target::TableLink(link) => handler.on_table_link(link),
        }
    }
    targets.len()
}

/// Counts from [`sweep_media`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MediaSweep {
    pub images: usize,
    pub sources: usize,
}

/// Run `handler` on every `img` and `source` under the page body.
pub fn sweep_media(doc: &Document, handler: &dyn NodeHandler) -> MediaSweep {
    let nodes = MEDIA.select_all(&doc.body());

    let mut counts = MediaSweep::default();
    for node in &nodes {
        match node.tag() {
            Some("img") => counts.images += 1,
            _ => counts.sources += 1,
        }
    }
    crate::log!("image"; "found {} images and {} source elements", counts.images, counts.sources);

    for node in &nodes {
        handler.on_media(node);
    }
    counts
}

/// Run `handler` on every table link under the page body.
pub fn sweep_table_links(doc: &Document, handler: &dyn NodeHandler) -> usize {
    let links = TABLE_LINK.select_all(&doc.body());
    crate::log!("table"; "found {} table links", links.len());

    for link in &links {
        handler.on_table_link(link);
    }
    links.len()
}
