//! Compensating actions for destructive operations.

use std::fmt;

/// A one-shot action that reverses a destructive write.
///
/// The action captures everything it needs at the time of the destructive
/// operation (the outbox and the prior data), so it can be run later from
/// anywhere, or dropped to forget it.
pub struct Undo {
    label: String,
    action: Box<dyn FnOnce() + Send>,
}

impl Undo {
    pub fn new(label: impl Into<String>, action: impl FnOnce() + Send + 'static) -> Self {
        Self {
            label: label.into(),
            action: Box::new(action),
        }
    }

    /// Describes what will be restored.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn run(self) {
        tracing::debug!(label = %self.label, "Running undo");
        (self.action)()
    }
}

impl fmt::Debug for Undo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Undo")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}
