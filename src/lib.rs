//! sn-enhancer - better reading on Springer Nature article pages.
//!
//! Three independent enhancements run against a page document:
//!
//! - images: scaled-width `src`/`srcset` URLs are rewritten to the full-resolution variant
//! - math: the typesetter is forced onto the HTML-CSS renderer
//! - tables: abbreviated tables are replaced by the full table fetched from its own page
//!
//! Content present at load time is handled by initial sweeps; content added
//! later is picked up by an insertion watcher. See [`page::Bootstrapper`].

// Logger must come first so its macros are textually in scope everywhere.
pub mod logger;

pub mod config;
pub mod core;
pub mod dom;
pub mod enhance;
pub mod inline;
pub mod page;
pub mod typeset;
pub mod watch;

#[cfg(test)]
mod testing;

pub use config::Settings;
pub use crate::core::{FetchError, InlineError, Phase, TypesetError};
pub use dom::{Document, NodeExt, NodeRef, SharedDocument};
pub use page::{Bootstrapper, Page, ReadyState, Services, Session};
