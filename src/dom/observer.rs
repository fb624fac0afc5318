//! Insertion observer.
//!
//! Insertions under the observed root are recorded while they happen and
//! handed out as one batch per wake-up, the way a browser queues mutation
//! records until the current task finishes. Attribute changes and removals
//! are not recorded.

use std::rc::Rc;

use tokio::sync::Notify;

use super::{Document, NodeRef, SharedDocument};

pub(super) struct Recorder {
    root: NodeRef,
    pending: Vec<NodeRef>,
    notify: Rc<Notify>,
}

impl Document {
    /// Record `child` if it was inserted inside the observed subtree.
    pub(super) fn record_insertion(&self, parent: &NodeRef, child: NodeRef) {
        let mut slot = self.recorder.borrow_mut();
        let Some(recorder) = slot.as_mut() else {
            return;
        };
        if !parent.inclusive_ancestors().any(|n| n == recorder.root) {
            return;
        }
        recorder.pending.push(child);
        recorder.notify.notify_one();
    }

    /// Drain the insertion records accumulated since the last call.
    pub fn take_records(&self) -> Vec<NodeRef> {
        self.recorder
            .borrow_mut()
            .as_mut()
            .map(|r| std::mem::take(&mut r.pending))
            .unwrap_or_default()
    }

    /// Stop recording insertions; pending records are dropped.
    pub fn disconnect_observer(&self) {
        self.recorder.replace(None);
    }

    pub fn is_observed(&self) -> bool {
        self.recorder.borrow().is_some()
    }
}

/// Subscription to node insertions under one root
///
/// Only one observer is active per document; observing again replaces it.
pub struct MutationObserver {
    doc: SharedDocument,
    notify: Rc<Notify>,
}

impl MutationObserver {
    /// Start recording insertions under `root`.
    ///
    /// Arming is synchronous, so a caller that sweeps the document first and
    /// arms right after, without awaiting in between, misses nothing.
    pub fn observe(doc: &SharedDocument, root: NodeRef) -> Self {
        let notify = Rc::new(Notify::new());
        doc.recorder.replace(Some(Recorder {
            root,
            pending: Vec::new(),
            notify: notify.clone(),
        }));
        Self {
            doc: doc.clone(),
            notify,
        }
    }

    /// Wait for the next non-empty batch of inserted subtree roots.
    ///
    /// Roots are in insertion order.
    pub async fn next_batch(&self) -> Vec<NodeRef> {
        loop {
            self.notify.notified().await;
            let batch = self.doc.take_records();
            if !batch.is_empty() {
                return batch;
            }
        }
    }

    /// Shared document this observer watches.
    pub fn document(&self) -> &SharedDocument {
        &self.doc
    }
}
