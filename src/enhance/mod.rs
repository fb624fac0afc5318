//! Image reference enhancement.
//!
//! - `enhance()`: scaled-width media URL → full-resolution URL (pure)
//! - `srcset`: the same rewrite applied to every candidate of a srcset list
//! - `element`: writes the rewrite back into `img` / `source` elements

mod element;
mod srcset;

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

pub use element::{Transformed, transform};
pub use srcset::enhance_srcset;

/// Path segment requesting a downscaled variant, e.g. `/lw685/`.
static SCALED_WIDTH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/lw[0-9]+/").unwrap());

/// Replacement segment requesting the original image.
const FULL_SEGMENT: &str = "/full/";

/// Whether the URL still carries a scaled-width segment.
#[inline]
pub fn is_scaled(url: &str) -> bool {
    SCALED_WIDTH.is_match(url)
}

/// Rewrite every scaled-width segment of `url` to the full-resolution marker.
///
/// Total and pure; borrowed when nothing matched (empty input included).
///
/// Postcondition: `!is_scaled(result)`. The marker `/full/` has no digits,
/// so the result never matches again and `enhance(enhance(u)) == enhance(u)`.
pub fn enhance(url: &str) -> Cow<'_, str> {
    if !is_scaled(url) {
        return Cow::Borrowed(url);
    }

    // Loop instead of `replace_all`: adjacent segments (`/lw1/lw2/`) share a
    // slash, so a single non-overlapping pass would leave the second behind.
    let mut out = url.to_string();
    while let Some(m) = SCALED_WIDTH.find(&out) {
        out.replace_range(m.range(), FULL_SEGMENT);
    }

    debug_assert!(!is_scaled(&out));
    crate::debug!("image"; "enhanced image URL: {} -> {}", url, out);
    Cow::Owned(out)
}
