//! Renderer preference cookie.

use std::fmt;

use parking_lot::Mutex;
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};

use crate::core::TypesetError;

/// Cookie the typesetter's menu reads its saved settings from.
pub const PREFERENCE_COOKIE: &str = "mjx.menu";

/// A cookie write: `name=value; path=/; max-age=N`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    /// Already percent-encoded value.
    pub value: String,
    pub path: String,
    pub max_age_secs: u64,
}

impl Cookie {
    /// Preference cookie selecting `backend` as renderer.
    pub fn renderer_preference(backend: &str, max_age_secs: u64) -> Self {
        let raw = format!("renderer:{backend}");
        Self {
            name: PREFERENCE_COOKIE.to_string(),
            value: utf8_percent_encode(&raw, NON_ALPHANUMERIC).to_string(),
            path: "/".to_string(),
            max_age_secs,
        }
    }
}

impl fmt::Display for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}={}; path={}; max-age={}",
            self.name, self.value, self.path, self.max_age_secs
        )
    }
}

/// Write-only cookie storage of the page
pub trait CookieJar: Send + Sync {
    fn set(&self, cookie: &Cookie) -> Result<(), TypesetError>;
}

/// In-memory jar; keeps every write as its header string.
#[derive(Debug, Default)]
pub struct MemoryCookieJar {
    writes: Mutex<Vec<String>>,
}

impl MemoryCookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// All cookie strings written so far, oldest first.
    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().clone()
    }
}

impl CookieJar for MemoryCookieJar {
    fn set(&self, cookie: &Cookie) -> Result<(), TypesetError> {
        self.writes.lock().push(cookie.to_string());
        Ok(())
    }
}
