//! Error taxonomy.
//!
//! Every error here is contained at the element it concerns: it is logged
//! and that one operation stops. Nothing propagates into a sweep or the
//! watcher loop.

use thiserror::Error;

/// Failure of the network fetch service
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Request never produced a response (DNS, TLS, connection reset...)
    #[error("request failed: {0}")]
    Transport(String),

    /// Response arrived with a non-success status
    #[error("unexpected HTTP status {0}")]
    Status(u16),
}

/// Failure to inline one full-size table
#[derive(Debug, Error)]
pub enum InlineError {
    /// Link target carries no table identifier
    #[error("malformed table reference `{0}`")]
    MalformedReference(String),

    #[error("fetching `{url}` failed")]
    Network {
        url: String,
        #[source]
        source: FetchError,
    },

    /// Fetched page holds no table under either selector
    #[error("no table found in `{0}`")]
    MissingContent(String),

    /// Link sits outside every known container shape
    #[error("no table container around link to table {0}")]
    MissingContainer(String),

    /// Link node vanished or lost its `href` mid-flight
    #[error("table link is no longer an element with an href")]
    DetachedLink,
}

/// Failure while forcing the math rendering backend
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypesetError {
    /// Expected interception point of the typesetter is absent
    #[error("math renderer unavailable: {0}")]
    Unavailable(String),

    #[error("cookie storage refused `{0}`")]
    Cookie(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_network_error_keeps_source() {
        let err = InlineError::Network {
            url: "https://example.com/tables/1".into(),
            source: FetchError::Status(503),
        };
        assert_eq!(err.to_string(), "fetching `https://example.com/tables/1` failed");
        let source = err.source().map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("unexpected HTTP status 503"));
    }
}
