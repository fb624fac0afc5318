//! Mutation watcher.
//!
//! Keeps late-inserted content enhanced: every batch of inserted subtrees is
//! classified and handed to a [`NodeHandler`].
//!
//! ```text
//! MutationObserver ──batch──▶ collect_targets ──▶ NodeHandler
//!                                                  ├─ on_media      → enhance::transform
//!                                                  └─ on_table_link → TableInliner::submit
//! ```
//!
//! Content present at load time is covered by the initial sweeps
//! ([`sweep_media`], [`sweep_table_links`]), not by the watcher.

mod dispatch;

#[cfg(test)]
mod tests;

use std::rc::Rc;

use crate::dom::{MutationObserver, NodeRef};
use crate::enhance;
use crate::inline::TableInliner;

pub use dispatch::{MediaSweep, Target, collect_targets, dispatch, sweep_media, sweep_table_links};

/// What to do with discovered nodes.
///
/// Called synchronously from a sweep or a batch; anything asynchronous is
/// spawned rather than awaited.
pub trait NodeHandler {
    /// An `img` or `source` element.
    fn on_media(&self, node: &NodeRef);
    /// A link to a full-size table page.
    fn on_table_link(&self, link: &NodeRef);
}

/// Production handler: enhance media in place, inline tables in the background.
pub struct Reconciler {
    inliner: Rc<TableInliner>,
}

impl Reconciler {
    pub fn new(inliner: Rc<TableInliner>) -> Self {
        Self { inliner }
    }
}

impl NodeHandler for Reconciler {
    fn on_media(&self, node: &NodeRef) {
        enhance::transform(node);
    }

    fn on_table_link(&self, link: &NodeRef) {
        self.inliner.submit(link.clone());
    }
}

/// Drives a [`MutationObserver`] into a [`NodeHandler`], one batch at a time.
pub struct Watcher {
    observer: MutationObserver,
    handler: Rc<dyn NodeHandler>,
}

impl Watcher {
    pub fn new(observer: MutationObserver, handler: Rc<dyn NodeHandler>) -> Self {
        Self { observer, handler }
    }

    /// Wait for the next batch and handle it. Returns the number of targets.
    pub async fn step(&self) -> usize {
        let batch = self.observer.next_batch().await;
        let handled = dispatch(self.observer.document(), self.handler.as_ref(), &batch);
        crate::debug!("watch"; "{} inserted roots, {} targets", batch.len(), handled);
        handled
    }

    /// Handle batches until the task is aborted.
    pub async fn run(self) {
        loop {
            self.step().await;
        }
    }
}
