//! Test doubles shared by the unit tests.

use std::future::Future;
use std::time::Duration;

use parking_lot::Mutex;
use rustc_hash::{FxHashMap, FxHashSet};
use tokio::task::LocalSet;

use crate::core::FetchError;
use crate::dom::{Document, NodeRef};
use crate::inline::{FetchFuture, Fetcher};

/// Run `test` inside a `LocalSet`, where page work gets spawned.
pub(crate) async fn local<F: Future>(test: F) -> F::Output {
    LocalSet::new().run_until(test).await
}

/// First element of `html`'s body, detached and ready to insert elsewhere.
pub(crate) fn fragment(html: &str) -> NodeRef {
    let node = Document::parse(html)
        .body()
        .first_child()
        .expect("fragment must have a body child");
    node.detach();
    node
}

/// Fetcher serving canned bodies; unknown URLs answer 404.
#[derive(Default)]
pub(crate) struct StaticFetcher {
    pages: FxHashMap<String, Result<String, FetchError>>,
    calls: Mutex<Vec<String>>,
    crashes: FxHashSet<String>,
    latency: Option<Duration>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, body: &str) -> Self {
        self.pages.insert(url.to_string(), Ok(body.to_string()));
        self
    }

    pub fn failing(mut self, url: &str, error: FetchError) -> Self {
        self.pages.insert(url.to_string(), Err(error));
        self
    }

    /// Panic instead of answering for `url`.
    pub fn crashing(mut self, url: &str) -> Self {
        self.crashes.insert(url.to_string());
        self
    }

    /// Sleep this long before answering.
    pub fn latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// URLs requested so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

impl Fetcher for StaticFetcher {
    fn fetch<'a>(&'a self, url: &'a str) -> FetchFuture<'a> {
        Box::pin(async move {
            self.calls.lock().push(url.to_string());
            if let Some(latency) = self.latency {
                tokio::time::sleep(latency).await;
            }
            if self.crashes.contains(url) {
                panic!("fetcher crashed on {url}");
            }
            self.pages
                .get(url)
                .cloned()
                .unwrap_or(Err(FetchError::Status(404)))
        })
    }
}

/// Body of a table page as served for `/tables/{n}` links.
pub(crate) fn table_page(marker: &str) -> String {
    format!(
        r#"<html><body><header><table id="layout"></table></header>
           <div class="c-article-table"><table id="{marker}"><tr><td>full</td></tr></table></div>
           </body></html>"#
    )
}
