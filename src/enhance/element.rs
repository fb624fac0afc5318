//! Element transformer for `img` and `source` elements.

use std::borrow::Cow;

use crate::dom::{NodeExt, NodeRef};

use super::{enhance, enhance_srcset};

/// Primary reference attribute.
const ATTR_SRC: &str = "src";
/// Responsive-candidate list attribute.
const ATTR_SRCSET: &str = "srcset";

/// Which attributes a [`transform`] call wrote
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Transformed {
    pub src: bool,
    pub srcset: bool,
}

impl Transformed {
    #[inline]
    pub fn any(self) -> bool {
        self.src || self.srcset
    }
}

/// Both rewrites hand back `Cow::Owned` only when something changed.
#[inline]
fn changed(value: Cow<'_, str>) -> Option<String> {
    match value {
        Cow::Owned(v) => Some(v),
        Cow::Borrowed(_) => None,
    }
}

/// Enhance the `src` and `srcset` of one element in place.
///
/// Attributes are only written when the value actually changes, so running
/// this again on an already enhanced element is a no-op.
pub fn transform(node: &NodeRef) -> Transformed {
    let mut report = Transformed::default();

    if let Some(enhanced) = node.attr(ATTR_SRC).and_then(|v| changed(enhance(&v))) {
        report.src = node.set_attr(ATTR_SRC, &enhanced);
    }

    if let Some(enhanced) = node
        .attr(ATTR_SRCSET)
        .and_then(|v| changed(enhance_srcset(&v)))
    {
        report.srcset = node.set_attr(ATTR_SRCSET, &enhanced);
        if report.srcset {
            crate::debug!("image"; "enhanced <{}> srcset", node.tag().unwrap_or("?"));
        }
    }

    report
}
