//! Table inliner.
//!
//! Article pages show an abbreviated table with a "Full size table" link to a
//! separate page. The inliner fetches that page, pulls out the full table
//! and moves it into the article where the summary was:
//!
//! ```text
//! link href ──▶ table id ──▶ fetch ──▶ parse ──▶ full table
//!     │                                              │ move
//!     └──▶ nearest container ──▶ summary table ◀─────┘ replace, or insert before link
//! ```
//!
//! The link itself is left in place. Each link is claimed before its fetch,
//! and a spliced container is marked, so nothing is fetched or spliced twice.

mod fetch;
mod locate;

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use url::Url;

use crate::core::InlineError;
use crate::dom::{Document, NodeExt, NodeKey, NodeRef, SharedDocument};

pub use fetch::{FetchFuture, Fetcher, HttpFetcher};
pub use locate::{container_of, full_table, is_table_link, summary_table, table_id};

pub(crate) use locate::TABLE_LINK;

/// Marks a container whose table was replaced; value is the table id.
pub const INLINED_ATTR: &str = "data-sn-inlined";

/// Result of one inlining attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Full table spliced in; `replaced` is false when it was inserted
    /// before the link because the container held no summary table.
    Inlined { table_id: String, replaced: bool },
    /// Link or container was already handled
    Skipped,
}

/// Inlines full-size tables into one page document
pub struct TableInliner {
    doc: SharedDocument,
    fetcher: Arc<dyn Fetcher>,
    /// Page URL that relative link targets resolve against
    base: Option<Url>,
    /// Claimed links; holding the node keeps its key from being reused.
    claimed: RefCell<FxHashMap<NodeKey, NodeRef>>,
    in_flight: watch::Sender<usize>,
}

/// Counts one submitted inlining until it finishes, panics or is aborted.
struct InFlight(Rc<TableInliner>);

impl InFlight {
    fn enter(inliner: Rc<TableInliner>) -> Self {
        inliner.in_flight.send_modify(|n| *n += 1);
        Self(inliner)
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.in_flight.send_modify(|n| *n = n.saturating_sub(1));
    }
}

impl TableInliner {
    pub fn new(doc: SharedDocument, fetcher: Arc<dyn Fetcher>, base: Option<Url>) -> Self {
        Self {
            doc,
            fetcher,
            base,
            claimed: RefCell::new(FxHashMap::default()),
            in_flight: watch::Sender::new(0),
        }
    }

    /// Inline in a background task; the outcome is logged, never returned.
    ///
    /// Must be called inside a tokio `LocalSet`.
    pub fn submit(self: &Rc<Self>, link: NodeRef) -> JoinHandle<()> {
        let guard = InFlight::enter(Rc::clone(self));
        tokio::task::spawn_local(async move {
            match guard.0.inline_table(&link).await {
                Ok(Outcome::Inlined { table_id, replaced }) => {
                    let how = if replaced { "replaced summary" } else { "inserted" };
                    crate::log!("table"; "inlined full table {} ({})", table_id, how);
                }
                Ok(Outcome::Skipped) => {}
                Err(e) => crate::warn!("table"; "{:#}", anyhow::Error::from(e)),
            }
        })
    }

    /// Resolve once no submitted inlining is still running.
    pub async fn settled(&self) {
        let mut rx = self.in_flight.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        let _ = rx.wait_for(|&n| n == 0).await;
    }

    /// Number of submitted inlinings still running.
    pub fn in_flight(&self) -> usize {
        *self.in_flight.borrow()
    }

    /// False when `link` was claimed before.
    fn claim(&self, link: &NodeRef) -> bool {
        let mut claimed = self.claimed.borrow_mut();
        if claimed.contains_key(&link.key()) {
            return false;
        }
        claimed.insert(link.key(), link.clone());
        true
    }

    /// Fetch the full table behind `link` and splice it into the page.
    ///
    /// Every failure aborts only this link. Calling this again for a link
    /// that was already claimed returns [`Outcome::Skipped`] without fetching.
    pub async fn inline_table(&self, link: &NodeRef) -> Result<Outcome, InlineError> {
        if !self.claim(link) {
            crate::debug!("table"; "link to {} already handled", link.attr("href").unwrap_or_default());
            return Ok(Outcome::Skipped);
        }

        let href = link.attr("href").ok_or(InlineError::DetachedLink)?;
        let id = table_id(&href)
            .ok_or_else(|| InlineError::MalformedReference(href.clone()))?
            .to_string();

        if let Some(container) = container_of(link)
            && let Some(done) = container.attr(INLINED_ATTR)
        {
            crate::debug!("table"; "container already holds full table {}", done);
            return Ok(Outcome::Skipped);
        }

        let url = self.resolve(&href);
        crate::debug!("table"; "fetching table {} from {}", id, url);
        let body = self
            .fetcher
            .fetch(&url)
            .await
            .map_err(|source| InlineError::Network {
                url: url.clone(),
                source,
            })?;

        let source = Document::parse(&body);
        let table = full_table(&source).ok_or_else(|| InlineError::MissingContent(url.clone()))?;

        let container =
            container_of(link).ok_or_else(|| InlineError::MissingContainer(id.clone()))?;
        // Another link of the same container may have finished first.
        if container.attr(INLINED_ATTR).is_some() {
            return Ok(Outcome::Skipped);
        }

        let replaced = match summary_table(&container) {
            Some(summary) => self.doc.replace_node(&summary, table),
            None if self.doc.insert_before(table, link) => false,
            None => return Err(InlineError::DetachedLink),
        };
        container.set_attr(INLINED_ATTR, &id);

        Ok(Outcome::Inlined {
            table_id: id,
            replaced,
        })
    }

    /// Absolute URL of a link target (kept as-is when it cannot be resolved).
    fn resolve(&self, href: &str) -> String {
        self.base
            .as_ref()
            .and_then(|base| base.join(href).ok())
            .map_or_else(|| href.to_string(), |url| url.to_string())
    }
}
