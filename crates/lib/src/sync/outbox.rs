//! Fire-and-forget handle for outbound writes.

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use super::WriteCommand;
use crate::{
    doc::{Doc, Patch},
    store::DocRef,
};

/// Queues writes for the [`BackgroundWriter`](super::BackgroundWriter).
///
/// Every method returns immediately. Writes are applied in the order they
/// were queued, across all clones of the outbox.
#[derive(Debug, Clone)]
pub struct Outbox {
    tx: mpsc::UnboundedSender<WriteCommand>,
}

impl Outbox {
    pub(super) fn new(tx: mpsc::UnboundedSender<WriteCommand>) -> Self {
        Self { tx }
    }

    /// An outbox with no writer behind it. Queued commands land on the
    /// returned receiver, so tests can assert on exactly what was written.
    #[cfg(any(test, feature = "testing"))]
    pub fn detached() -> (Self, mpsc::UnboundedReceiver<WriteCommand>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Queues a merge-patch of `doc`.
    pub fn update(&self, doc: &DocRef, patch: Patch) {
        if tracing::enabled!(tracing::Level::DEBUG) {
            let fields: Vec<&str> = patch.paths().map(|p| p.as_str()).collect();
            debug!(doc = %doc, ?fields, "Queueing update");
        }
        self.send(WriteCommand::Update {
            doc: doc.clone(),
            patch,
        });
    }

    /// Queues a full overwrite of `doc`.
    pub fn set(&self, doc: &DocRef, data: Doc) {
        debug!(doc = %doc, "Queueing set");
        self.send(WriteCommand::Set {
            doc: doc.clone(),
            data,
        });
    }

    /// Queues deletion of `doc`.
    pub fn delete(&self, doc: &DocRef) {
        debug!(doc = %doc, "Queueing delete");
        self.send(WriteCommand::Delete { doc: doc.clone() });
    }

    /// Waits until every write queued before this call has been applied (or
    /// has failed). Returns immediately if the writer is gone.
    pub async fn flush(&self) {
        let (done, wait) = oneshot::channel();
        if self.tx.send(WriteCommand::Flush { done }).is_ok() {
            let _ = wait.await;
        }
    }

    fn send(&self, command: WriteCommand) {
        if let Err(e) = self.tx.send(command) {
            warn!(doc = ?e.0.doc(), "Dropping write, background writer has stopped");
        }
    }
}
