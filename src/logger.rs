//! Logging utilities with colored module prefixes.
//!
//! This module provides:
//! - `log!` macro for informational output with a colored prefix
//! - `warn!` macro for recoverable failures (stderr, yellow marker)
//! - `debug!` macro for chatty output gated by the verbose flag
//!
//! # Example
//!
//! ```ignore
//! log!("image"; "found {} images and {} source elements", imgs, sources);
//! warn!("table"; "fetch failed for {}", url);
//! debug!("image"; "enhanced {} -> {}", old, new);
//! ```

use owo_colors::{OwoColorize, Stream, Style};
use std::{
    io::{Write, stderr, stdout},
    sync::atomic::{AtomicBool, Ordering},
};

/// Global verbose flag (set from `Settings::verbose`)
static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Set verbose mode globally
pub fn set_verbose(v: bool) {
    VERBOSE.store(v, Ordering::SeqCst);
}

/// Check if verbose mode is enabled
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

// ============================================================================
// Log Macros
// ============================================================================

/// Log a message with a colored module prefix
///
/// # Usage
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Log a warning for a failure that was contained (stderr)
///
/// # Usage
/// ```ignore
/// warn!("table"; "no container for link {}", href);
/// ```
#[macro_export]
macro_rules! warn {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::warn($module, &format!($($arg)*))
    }};
}

/// Log a debug message (only shown when verbose is enabled)
///
/// # Usage
/// ```ignore
/// debug!("module"; "debug info: {}", value);
/// ```
#[macro_export]
macro_rules! debug {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::log($module, &format!($($arg)*))
        }
    }};
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Log a message with a colored module prefix
#[inline]
pub fn log(module: &str, message: &str) {
    let prefix = colorize_prefix(module, &module.to_ascii_lowercase(), Stream::Stdout);
    let mut stdout = stdout().lock();
    writeln!(stdout, "{prefix} {message}").ok();
    stdout.flush().ok();
}

/// Log a warning with a colored module prefix and a warning marker
#[inline]
pub fn warn(module: &str, message: &str) {
    let prefix = colorize_prefix(module, &module.to_ascii_lowercase(), Stream::Stderr);
    let marker = "⚠".if_supports_color(Stream::Stderr, |m| m.yellow());
    let mut stderr = stderr().lock();
    writeln!(stderr, "{prefix} {marker} {message}").ok();
    stderr.flush().ok();
}

/// Apply color to a module prefix based on module type
///
/// Plain text when `stream` is not a color terminal (or colors are overridden off).
#[inline]
fn colorize_prefix(module: &str, module_lower: &str, stream: Stream) -> String {
    let style = match module_lower {
        "image" => Style::new().bright_green(),
        "table" => Style::new().bright_blue(),
        "math" => Style::new().bright_magenta(),
        "error" => Style::new().bright_red(),
        _ => Style::new().bright_yellow(),
    }
    .bold();
    format!("[{module}]")
        .if_supports_color(stream, |p| p.style(style))
        .to_string()
}

// ============================================================================
// Tests
// ============================================================================
