//! Background writer implementation.
//!
//! This module provides the BackgroundWriter that applies every outbound
//! write in a single background task, so writes reach the store in the order
//! they were issued and callers never wait on the network.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{Instrument, debug, info, info_span, warn};

use super::Outbox;
use crate::{
    Result,
    doc::{Doc, Patch},
    store::{DocRef, DocumentStore},
};

/// Commands that can be sent to the background writer
#[derive(Debug)]
pub enum WriteCommand {
    /// Full overwrite of a document
    Set { doc: DocRef, data: Doc },
    /// Merge-patch of an existing document
    Update { doc: DocRef, patch: Patch },
    /// Delete a whole document
    Delete { doc: DocRef },
    /// Reply once every earlier command has been applied
    Flush { done: oneshot::Sender<()> },
}

impl WriteCommand {
    /// The document this command writes to, if any.
    pub fn doc(&self) -> Option<&DocRef> {
        match self {
            WriteCommand::Set { doc, .. }
            | WriteCommand::Update { doc, .. }
            | WriteCommand::Delete { doc } => Some(doc),
            WriteCommand::Flush { .. } => None,
        }
    }

    /// The patch carried by an `Update`.
    pub fn patch(&self) -> Option<&Patch> {
        match self {
            WriteCommand::Update { patch, .. } => Some(patch),
            _ => None,
        }
    }
}

/// Background writer that owns the store handle and drains the outbox
pub struct BackgroundWriter {
    store: Arc<dyn DocumentStore>,
    command_rx: mpsc::UnboundedReceiver<WriteCommand>,
}

impl BackgroundWriter {
    /// Start the background writer and return the outbox feeding it
    pub fn start(store: Arc<dyn DocumentStore>) -> Outbox {
        let (tx, rx) = mpsc::unbounded_channel();

        let writer = Self {
            store,
            command_rx: rx,
        };

        // Try to spawn in current runtime, or create one if needed
        if tokio::runtime::Handle::try_current().is_ok() {
            tokio::spawn(writer.run());
        } else {
            std::thread::spawn(|| match tokio::runtime::Runtime::new() {
                Ok(rt) => rt.block_on(writer.run()),
                Err(e) => tracing::error!("Failed to start background writer runtime: {e}"),
            });
        }
        Outbox::new(tx)
    }

    /// Main loop: apply commands one at a time until every outbox is dropped
    async fn run(mut self) {
        async move {
            debug!("Starting background writer");
            while let Some(command) = self.command_rx.recv().await {
                self.handle_command(command).await;
            }
            info!("Background writer shutting down");
        }
        .instrument(info_span!("background_writer"))
        .await
    }

    /// Apply a single command. Failures are logged and dropped: the caller
    /// already moved on and the in-memory state stays as it is.
    async fn handle_command(&self, command: WriteCommand) {
        let (doc, result) = match command {
            WriteCommand::Flush { done } => {
                let _ = done.send(());
                return;
            }
            WriteCommand::Set { doc, data } => {
                let result = self.store.set(&doc, data).await;
                (doc, result)
            }
            WriteCommand::Update { doc, patch } => {
                let result = self.apply_update(&doc, &patch).await;
                (doc, result)
            }
            WriteCommand::Delete { doc } => {
                let result = self.store.delete(&doc).await;
                (doc, result)
            }
        };
        match result {
            Ok(()) => debug!(doc = %doc, "Write applied"),
            Err(e) => warn!(doc = %doc, "Failed to write {doc}: {e}"),
        }
    }

    async fn apply_update(&self, doc: &DocRef, patch: &Patch) -> Result<()> {
        if patch.is_empty() {
            return Ok(());
        }
        self.store.update(doc, patch).await
    }
}
