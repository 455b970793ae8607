//! Outbound write plumbing.
//!
//! Local mutations never await the store. They queue a [`WriteCommand`] on
//! an [`Outbox`]; a single [`BackgroundWriter`] task applies the queue in
//! order and logs failures instead of returning them. Destructive operations
//! hand back an [`Undo`] that queues the inverse writes.

mod background;
mod outbox;
mod undo;

pub use background::{BackgroundWriter, WriteCommand};
pub use outbox::Outbox;
pub use undo::Undo;
