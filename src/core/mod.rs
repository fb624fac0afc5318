//! Core types - pure abstractions shared across the codebase.

mod error;
mod phase;

pub use error::{FetchError, InlineError, TypesetError};
pub use phase::Phase;
