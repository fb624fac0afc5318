//! Where tables and table links live in the two article templates.
//!
//! Every list below is tried in order; the order matters because real pages
//! vary in structure and the earlier shapes are the more specific ones.

use std::sync::LazyLock;

use regex::Regex;

use crate::dom::{Document, NodeRef, Selector};

/// Links to a full-size table page.
pub(crate) static TABLE_LINK: LazyLock<Selector> = LazyLock::new(|| {
    Selector::builtin(r#"a[data-track-action="view table"], a[data-test="table-link"]"#)
});

/// Full table in a fetched table page: primary, then fallback.
static FULL_TABLE: LazyLock<[Selector; 2]> = LazyLock::new(|| {
    [
        Selector::builtin(".c-article-table table"),
        Selector::builtin("table"),
    ]
});

/// Container shapes around a table link, nearest-ancestor search per shape.
static CONTAINERS: LazyLock<[Selector; 3]> = LazyLock::new(|| {
    [
        Selector::builtin("figure"),
        Selector::builtin("div.c-article-table"),
        Selector::builtin(r#"div[data-container-section="table"]"#),
    ]
});

static TABLE: LazyLock<Selector> = LazyLock::new(|| Selector::builtin("table"));

/// Table identifier in a table page URL, e.g. `/articles/x/tables/3`.
static TABLE_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/tables/([0-9]+)").unwrap());

/// Whether the node is a link to a full-size table page.
#[inline]
pub fn is_table_link(node: &NodeRef) -> bool {
    TABLE_LINK.matches(node)
}

/// Extract the table identifier from a link target.
pub fn table_id(href: &str) -> Option<&str> {
    TABLE_ID
        .captures(href)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Locate the full table in a fetched table page.
pub fn full_table(doc: &Document) -> Option<NodeRef> {
    FULL_TABLE
        .iter()
        .find_map(|sel| sel.select_first(doc.root()))
}

/// Nearest container of `link`, trying each known shape in order.
pub fn container_of(link: &NodeRef) -> Option<NodeRef> {
    CONTAINERS.iter().find_map(|sel| sel.closest(link))
}

/// Summary table already present in a container.
pub fn summary_table(container: &NodeRef) -> Option<NodeRef> {
    TABLE.select_first(container)
}
