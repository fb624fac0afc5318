//! Page document.
//!
//! A `kuchikiki` tree (html5ever parsing, `selectors` matching) plus the
//! insertion recording a browser's mutation observer would give. Nodes are
//! reference counted, so handles held by in-flight work stay valid after a
//! node is removed; they just stop being connected.
//!
//! Insertions are only seen when they go through [`Document`]; the tree
//! itself has no notion of observers.
//!
//! # Modules
//!
//! - `selector`: compiled CSS selectors and the queries built on them
//! - `observer`: insertion recording and batch delivery

mod observer;
mod selector;

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::LazyLock;

use kuchikiki::traits::TendrilSink;

pub use kuchikiki::NodeRef;
pub use observer::MutationObserver;
pub use selector::{Selector, SelectorError};

use observer::Recorder;

/// Document shared between the watcher, the sweeps and in-flight inlining
/// tasks. Everything runs on one thread, inside a tokio `LocalSet`.
pub type SharedDocument = Rc<Document>;

static BODY: LazyLock<Selector> = LazyLock::new(|| Selector::builtin("body"));

/// Identity of a node, usable as a hash key while the node is alive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeKey(usize);

/// Element accessors on tree nodes
pub trait NodeExt {
    /// Lowercase tag name, `None` for non-elements.
    fn tag(&self) -> Option<&str>;
    fn attr(&self, name: &str) -> Option<String>;
    /// Set an attribute. False for non-elements.
    fn set_attr(&self, name: &str, value: &str) -> bool;
    fn key(&self) -> NodeKey;
}

impl NodeExt for NodeRef {
    fn tag(&self) -> Option<&str> {
        self.as_element().map(|el| &*el.name.local)
    }

    fn attr(&self, name: &str) -> Option<String> {
        let el = self.as_element()?;
        el.attributes.borrow().get(name).map(str::to_string)
    }

    fn set_attr(&self, name: &str, value: &str) -> bool {
        match self.as_element() {
            Some(el) => {
                el.attributes.borrow_mut().insert(name, value.to_string());
                true
            }
            None => false,
        }
    }

    fn key(&self) -> NodeKey {
        NodeKey(Rc::as_ptr(&self.0) as usize)
    }
}

/// A parsed page and its insertion recorder
pub struct Document {
    root: NodeRef,
    recorder: RefCell<Option<Recorder>>,
}

impl Document {
    /// Parse a full HTML document. Parsing is error-tolerant and never fails.
    pub fn parse(html: &str) -> Self {
        Self::from_root(kuchikiki::parse_html().one(html))
    }

    /// Wrap an existing tree.
    pub fn from_root(root: NodeRef) -> Self {
        Self {
            root,
            recorder: RefCell::new(None),
        }
    }

    pub fn into_shared(self) -> SharedDocument {
        Rc::new(self)
    }

    /// The document node.
    pub fn root(&self) -> &NodeRef {
        &self.root
    }

    /// The `body` element, or the document node when there is none.
    pub fn body(&self) -> NodeRef {
        BODY.select_first(&self.root)
            .unwrap_or_else(|| self.root.clone())
    }

    /// Whether `node` is part of this document's tree.
    pub fn is_connected(&self, node: &NodeRef) -> bool {
        node.inclusive_ancestors()
            .last()
            .is_some_and(|top| top == self.root)
    }

    // ------------------------------------------------------------------------
    // Recorded mutations
    // ------------------------------------------------------------------------

    /// Move `child` to the end of `parent`'s children.
    pub fn append_child(&self, parent: &NodeRef, child: NodeRef) {
        parent.append(child.clone());
        self.record_insertion(parent, child);
    }

    /// Move `node` right before `reference`. False when `reference` has no parent.
    pub fn insert_before(&self, node: NodeRef, reference: &NodeRef) -> bool {
        let Some(parent) = reference.parent() else {
            return false;
        };
        reference.insert_before(node.clone());
        self.record_insertion(&parent, node);
        true
    }

    /// Put `replacement` where `old` is and detach `old`.
    pub fn replace_node(&self, old: &NodeRef, replacement: NodeRef) -> bool {
        if !self.insert_before(replacement, old) {
            return false;
        }
        old.detach();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_and_connectivity() {
        let doc = Document::parse("<html><body><p id=a>x</p></body></html>");
        let body = doc.body();
        assert_eq!(body.tag(), Some("body"));

        let p = body.first_child().unwrap();
        assert!(doc.is_connected(&p));
        p.detach();
        assert!(!doc.is_connected(&p));
        assert_eq!(p.attr("id").as_deref(), Some("a"));
    }

    #[test]
    fn test_attributes() {
        let doc = Document::parse(r#"<img src="/a.png">"#);
        let img = doc.body().first_child().unwrap();
        assert_eq!(img.attr("src").as_deref(), Some("/a.png"));
        assert!(img.set_attr("src", "/b.png"));
        assert_eq!(img.attr("src").as_deref(), Some("/b.png"));
        assert_eq!(img.attr("alt"), None);

        let text = NodeRef::new_text("t");
        assert!(!text.set_attr("src", "x"));
        assert_eq!(text.tag(), None);
    }

    #[test]
    fn test_insert_before_and_replace() {
        let doc = Document::parse("<div><i></i><b></b></div>");
        let div = doc.body().first_child().unwrap();
        let b = div.last_child().unwrap();
        let i = div.first_child().unwrap();

        let span = Document::parse("<span></span>").body().first_child().unwrap();
        assert!(doc.insert_before(span.clone(), &b));
        let tags: Vec<_> = div.children().filter_map(|c| c.tag().map(str::to_string)).collect();
        assert_eq!(tags, ["i", "span", "b"]);

        assert!(doc.replace_node(&i, NodeRef::new_text("t")));
        assert!(i.parent().is_none());
        assert_eq!(div.text_contents(), "t");

        let loose = NodeRef::new_text("x");
        assert!(!doc.insert_before(span, &loose));
    }

    #[test]
    fn test_node_key_is_identity() {
        let doc = Document::parse("<p></p><p></p>");
        let body = doc.body();
        let first = body.first_child().unwrap();
        let second = body.last_child().unwrap();
        assert_eq!(first.key(), body.first_child().unwrap().key());
        assert_ne!(first.key(), second.key());
    }

    #[test]
    fn test_deeply_nested_markup() {
        let depth = 10_000;
        let html = format!("{}<img src=\"/x.png\">{}", "<div>".repeat(depth), "</div>".repeat(depth));
        let doc = Document::parse(&html);
        let img = Selector::parse("img").unwrap().select_first(doc.root()).unwrap();
        assert!(doc.is_connected(&img));
        assert_eq!(img.ancestors().count(), depth + 3);
    }
}
