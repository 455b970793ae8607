//! Queued user notifications with optional undo.

use std::collections::VecDeque;

use tracing::debug;

use crate::sync::Undo;

/// A message for the user, optionally offering to reverse what it reports.
#[derive(Debug)]
pub struct Notice {
    pub message: String,
    pub undo: Option<Undo>,
}

impl Notice {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            undo: None,
        }
    }

    /// A notice whose message is the undo's label.
    pub fn with_undo(undo: Undo) -> Self {
        Self {
            message: undo.label().to_string(),
            undo: Some(undo),
        }
    }
}

/// First-in, first-out queue of notices. Only the front one is shown.
#[derive(Debug, Default)]
pub struct NoticeQueue {
    notices: VecDeque<Notice>,
}

impl NoticeQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, notice: Notice) {
        debug!(message = %notice.message, undoable = notice.undo.is_some(), "Queued notice");
        self.notices.push_back(notice);
    }

    /// The notice currently shown.
    pub fn current(&self) -> Option<&Notice> {
        self.notices.front()
    }

    /// Drops the current notice; its undo, if any, is forgotten.
    pub fn dismiss(&mut self) -> Option<Notice> {
        self.notices.pop_front()
    }

    /// Runs the current notice's undo and drops the notice. Returns false if
    /// there was nothing to undo (the notice is still dismissed).
    pub fn undo_current(&mut self) -> bool {
        match self.notices.pop_front() {
            Some(Notice {
                undo: Some(undo), ..
            }) => {
                undo.run();
                true
            }
            _ => false,
        }
    }

    pub fn len(&self) -> usize {
        self.notices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }
}
