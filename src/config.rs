//! Enhancer settings.
//!
//! Nothing is read from disk: the defaults mirror the constants the page
//! script has always used, and an extension build may embed a TOML snippet
//! to override them.
//!
//! ```toml
//! renderer = "HTML-CSS"
//! renderer_delay_ms = 100
//! table_settle_ms = 1000
//! ```

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Default math rendering backend.
pub const DEFAULT_RENDERER: &str = "HTML-CSS";

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("settings parsing error")]
    Toml(#[from] toml::de::Error),

    #[error("settings validation error: {0}")]
    Validation(String),
}

/// Runtime settings for one page session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Rendering backend forced on the math typesetter.
    pub renderer: String,
    /// Delay before the live switch/re-render commands are queued.
    pub renderer_delay_ms: u64,
    /// Settle delay before the initial table-link sweep.
    pub table_settle_ms: u64,
    /// Max-age of the renderer preference cookie.
    pub cookie_max_age_secs: u64,
    /// Enable `debug!` output.
    pub verbose: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            renderer: DEFAULT_RENDERER.to_string(),
            renderer_delay_ms: 100,
            table_settle_ms: 1000,
            cookie_max_age_secs: 365 * 24 * 60 * 60,
            verbose: false,
        }
    }
}

impl Settings {
    /// Parse settings from an embedded TOML snippet; missing keys keep defaults.
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        let settings: Self = toml::from_str(source)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check field-level constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.renderer.trim().is_empty() {
            return Err(ConfigError::Validation(
                "`renderer` must name a rendering backend".into(),
            ));
        }
        if self.cookie_max_age_secs == 0 {
            return Err(ConfigError::Validation(
                "`cookie_max_age_secs` must be positive".into(),
            ));
        }
        Ok(())
    }

    #[inline]
    pub fn renderer_delay(&self) -> Duration {
        Duration::from_millis(self.renderer_delay_ms)
    }

    #[inline]
    pub fn table_settle(&self) -> Duration {
        Duration::from_millis(self.table_settle_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_page_constants() {
        let settings = Settings::default();
        assert_eq!(settings.renderer, "HTML-CSS");
        assert_eq!(settings.renderer_delay(), Duration::from_millis(100));
        assert_eq!(settings.table_settle(), Duration::from_millis(1000));
        assert_eq!(settings.cookie_max_age_secs, 31_536_000);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings = Settings::from_toml("table_settle_ms = 250\nverbose = true").unwrap();
        assert_eq!(settings.table_settle_ms, 250);
        assert!(settings.verbose);
        assert_eq!(settings.renderer, DEFAULT_RENDERER);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = Settings::from_toml("renderr = \"SVG\"").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn test_empty_renderer_rejected() {
        let err = Settings::from_toml("renderer = \"  \"").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }
}
