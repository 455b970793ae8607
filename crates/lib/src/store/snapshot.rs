//! Snapshots delivered by store subscriptions.

use std::fmt;

use tokio::sync::mpsc;

use super::DocRef;
use crate::doc::Doc;

/// The state of one document at a point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSnapshot {
    pub reference: DocRef,
    /// `None` when the document does not exist.
    pub data: Option<Doc>,
}

impl DocumentSnapshot {
    pub fn exists(&self) -> bool {
        self.data.is_some()
    }
}

/// What happened to one document in a query's result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Modified,
    Removed,
}

/// One delta in a [`QuerySnapshot`].
///
/// Indices refer to the result list as it stands while the snapshot's
/// changes are applied in order: `old_index` before this change, `new_index`
/// after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub kind: ChangeKind,
    pub reference: DocRef,
    /// Document body. For removals, the last known body.
    pub data: Doc,
    /// Position before the change. `None` for `Added`.
    pub old_index: Option<usize>,
    /// Position after the change. `None` for `Removed`.
    pub new_index: Option<usize>,
}

impl Change {
    pub fn added(reference: DocRef, data: Doc, index: usize) -> Self {
        Self {
            kind: ChangeKind::Added,
            reference,
            data,
            old_index: None,
            new_index: Some(index),
        }
    }

    pub fn modified(reference: DocRef, data: Doc, old_index: usize, new_index: usize) -> Self {
        Self {
            kind: ChangeKind::Modified,
            reference,
            data,
            old_index: Some(old_index),
            new_index: Some(new_index),
        }
    }

    pub fn removed(reference: DocRef, data: Doc, index: usize) -> Self {
        Self {
            kind: ChangeKind::Removed,
            reference,
            data,
            old_index: Some(index),
            new_index: None,
        }
    }
}

/// An ordered batch of deltas against a query's result set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuerySnapshot {
    pub changes: Vec<Change>,
}

impl QuerySnapshot {
    pub fn new(changes: Vec<Change>) -> Self {
        Self { changes }
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

/// A live stream of snapshots. Dropping it unsubscribes.
pub struct Subscription<T> {
    target: String,
    rx: mpsc::UnboundedReceiver<T>,
}

impl<T> Subscription<T> {
    /// Wraps a receiver. `target` names what is being watched, for logs.
    pub fn new(target: impl Into<String>, rx: mpsc::UnboundedReceiver<T>) -> Self {
        let target = target.into();
        tracing::debug!(target = %target, "Subscription opened");
        Self { target, rx }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Waits for the next snapshot. Returns `None` once the store side has
    /// gone away.
    pub async fn next(&mut self) -> Option<T> {
        self.rx.recv().await
    }

    /// Returns the next snapshot if one is already queued.
    pub fn try_next(&mut self) -> Option<T> {
        self.rx.try_recv().ok()
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        tracing::debug!(target = %self.target, "Subscription closed");
    }
}

impl<T> fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}
