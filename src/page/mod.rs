//! Page view: the document being enhanced, where it came from, and how far
//! it has loaded.
//!
//! A [`Bootstrapper`] attaches the enhancer to a [`Page`] and hands back a
//! [`Session`] that lives as long as the page view.

mod bootstrap;


use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::watch;
use url::Url;

use crate::dom::{Document, SharedDocument};
use crate::inline::{Fetcher, HttpFetcher};
use crate::typeset::{CookieJar, MathHost};

pub use bootstrap::{Bootstrapper, Session};

/// Document readiness, in the order a page moves through it
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReadyState {
    Loading,
    /// Markup parsed; the DOM may be queried and modified
    Interactive,
    /// Subresources finished loading too
    Complete,
}

/// One page view
pub struct Page {
    doc: SharedDocument,
    url: Option<Url>,
    ready: watch::Sender<ReadyState>,
}

impl Page {
    /// Wrap a document that is still loading.
    pub fn new(doc: Document, url: Option<Url>) -> Self {
        Self {
            doc: doc.into_shared(),
            url,
            ready: watch::Sender::new(ReadyState::Loading),
        }
    }

    /// Parse `html` served from `url`.
    pub fn from_html(html: &str, url: &str) -> Result<Self> {
        let url = Url::parse(url).with_context(|| format!("invalid page URL `{url}`"))?;
        Ok(Self::new(Document::parse(html), Some(url)))
    }

    pub fn document(&self) -> &SharedDocument {
        &self.doc
    }

    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    pub fn ready_state(&self) -> ReadyState {
        *self.ready.borrow()
    }

    /// Move the page to `state`. Readiness never goes backwards.
    pub fn set_ready_state(&self, state: ReadyState) {
        self.ready.send_if_modified(|current| {
            if state > *current {
                *current = state;
                true
            } else {
                false
            }
        });
    }

    /// Readiness updates, starting from the current state.
    pub fn subscribe(&self) -> watch::Receiver<ReadyState> {
        self.ready.subscribe()
    }
}

/// Collaborators the enhancer talks to outside the document
#[derive(Clone)]
pub struct Services {
    pub fetcher: Arc<dyn Fetcher>,
    pub math: Arc<dyn MathHost>,
    pub cookies: Arc<dyn CookieJar>,
}

impl Services {
    pub fn new(fetcher: Arc<dyn Fetcher>, math: Arc<dyn MathHost>, cookies: Arc<dyn CookieJar>) -> Self {
        Self {
            fetcher,
            math,
            cookies,
        }
    }

    /// Fetch table pages over HTTP.
    pub fn http(math: Arc<dyn MathHost>, cookies: Arc<dyn CookieJar>) -> Self {
        Self::new(Arc::new(HttpFetcher::new()), math, cookies)
    }
}
