//! Compiled CSS selectors and the queries the enhancer needs.

use kuchikiki::Selectors;
use kuchikiki::iter::NodeIterator;
use thiserror::Error;

use super::NodeRef;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid selector `{0}`")]
pub struct SelectorError(pub String);

/// A selector list such as `figure, div.c-article-table`
pub struct Selector(Selectors);

impl Selector {
    pub fn parse(source: &str) -> Result<Self, SelectorError> {
        Selectors::compile(source)
            .map(Self)
            .map_err(|()| SelectorError(source.to_string()))
    }

    /// Selector literal written in this crate.
    pub(crate) fn builtin(source: &str) -> Self {
        Self::parse(source).expect("built-in selector must parse")
    }

    /// Whether `node` is an element matching this selector.
    pub fn matches(&self, node: &NodeRef) -> bool {
        node.clone()
            .into_element_ref()
            .is_some_and(|el| self.0.matches(&el))
    }

    /// Matching descendants of `scope`, in document order.
    pub fn select_all(&self, scope: &NodeRef) -> Vec<NodeRef> {
        scope
            .descendants()
            .elements()
            .filter(|el| self.0.matches(el))
            .map(|el| el.as_node().clone())
            .collect()
    }

    pub fn select_first(&self, scope: &NodeRef) -> Option<NodeRef> {
        scope
            .descendants()
            .elements()
            .find(|el| self.0.matches(el))
            .map(|el| el.as_node().clone())
    }

    /// Nearest inclusive ancestor of `node` matching this selector.
    pub fn closest(&self, node: &NodeRef) -> Option<NodeRef> {
        node.inclusive_ancestors()
            .elements()
            .find(|el| self.0.matches(el))
            .map(|el| el.as_node().clone())
    }
}
