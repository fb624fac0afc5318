//! Page session phases.

use std::fmt;

/// Bootstrap phase of one page session
///
/// Phases only move forward; later variants compare greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    /// Nothing has run yet
    NotStarted = 0,
    /// Renderer preference applied (runs at injection, before readiness)
    RendererConfigured = 1,
    /// Waiting for the document to leave the loading state
    DomReadyWait = 2,
    /// Initial image/source sweep finished
    ImagesSwept = 3,
    /// Insertion watcher armed
    Watching = 4,
    /// Settle delay elapsed and table links submitted
    TablesSwept = 5,
}

impl Phase {
    /// Short label for log lines.
    pub const fn label(self) -> &'static str {
        match self {
            Self::NotStarted => "not-started",
            Self::RendererConfigured => "renderer-configured",
            Self::DomReadyWait => "dom-ready-wait",
            Self::ImagesSwept => "images-swept",
            Self::Watching => "watching",
            Self::TablesSwept => "tables-swept",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
