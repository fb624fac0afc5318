//! Responsive-candidate (`srcset`) rewriting.
//!
//! A srcset is a comma-separated list of `URL [descriptor]` candidates. Only
//! the URL token of each candidate is rewritten; commas, whitespace and
//! descriptors are copied through untouched, so candidate count and order
//! never change.

use std::borrow::Cow;

use super::enhance;

/// Apply [`enhance`] to the URL of every candidate.
///
/// Borrowed when no candidate URL changed.
pub fn enhance_srcset(srcset: &str) -> Cow<'_, str> {
    if !super::is_scaled(srcset) {
        return Cow::Borrowed(srcset);
    }

    let candidates: Vec<String> = srcset.split(',').map(enhance_candidate).collect();
    let rewritten = candidates.join(",");
    if rewritten == srcset {
        Cow::Borrowed(srcset)
    } else {
        Cow::Owned(rewritten)
    }
}

/// Rewrite the URL token of one candidate, keeping surrounding text.
fn enhance_candidate(candidate: &str) -> String {
    let url_start = candidate.len() - candidate.trim_start().len();
    let rest = &candidate[url_start..];
    let url_len = rest.find(char::is_whitespace).unwrap_or(rest.len());
    let (url, descriptor) = rest.split_at(url_len);

    let mut out = String::with_capacity(candidate.len() + 4);
    out.push_str(&candidate[..url_start]);
    out.push_str(&enhance(url));
    out.push_str(descriptor);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rewrites_each_candidate() {
        assert_eq!(
            enhance_srcset("u1/lw200/x.png 200w, u1/lw400/x.png 400w"),
            "u1/full/x.png 200w, u1/full/x.png 400w"
        );
    }

    #[test]
    fn test_candidate_without_descriptor() {
        assert_eq!(enhance_srcset("https://m.example.com/lw685/a.png"), "https://m.example.com/full/a.png");
        assert_eq!(
            enhance_srcset("/lw1/a.png, /lw2/b.png 2x"),
            "/full/a.png, /full/b.png 2x"
        );
    }

    #[test]
    fn test_preserves_delimiters_and_order() {
        let input = " /lw100/a.png   1x ,/b.png 2x,\n/lw300/c.png 3x";
        let out = enhance_srcset(input);
        assert_eq!(out, " /full/a.png   1x ,/b.png 2x,\n/full/c.png 3x");
        assert_eq!(out.split(',').count(), input.split(',').count());
    }

    #[test]
    fn test_unchanged_list_is_borrowed() {
        let input = "/full/a.png 1x, /b.png 2x";
        assert!(matches!(enhance_srcset(input), Cow::Borrowed(_)));
        assert!(matches!(enhance_srcset(""), Cow::Borrowed("")));
    }

    #[test]
    fn test_rewrite_is_idempotent() {
        let once = enhance_srcset("/lw200/x.png 200w, /lw400/x.png 400w").into_owned();
        assert!(matches!(enhance_srcset(&once), Cow::Borrowed(_)));
    }
}
