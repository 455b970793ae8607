//!
//! Journo: personal journal and to-do tracking, kept in two-way sync with a
//! remote document store.
//!
//! ## Core Concepts
//!
//! * **Documents (`doc::Doc`)**: free-form nested maps addressed by dotted
//!   paths (`entries.3600.text`). Partial writes are expressed as a
//!   `doc::Patch`, which may carry the delete and server-timestamp sentinels.
//! * **Stores (`store::DocumentStore`)**: the remote side. `get`, `set`,
//!   `update`, `delete` and `add`, plus live subscriptions to a single
//!   document or to a query. `store::MemoryStore` is the bundled
//!   implementation.
//! * **Properties and model documents (`model::Property`, `model::Document`)**:
//!   in-memory mirrors of remote fields with live and draft values. A local
//!   change publishes a patch through the `sync::Outbox`; applying a remote
//!   read never does.
//! * **Collections (`model::Items`)**: a live query whose added, modified
//!   and removed deltas are applied to a list of `model::Item`s.
//! * **Journal days (`model::Journum`)**: a day document holding entries
//!   keyed by seconds since local midnight, plus an `order` array that is
//!   repaired on every inbound read.
//! * **Sessions (`session::Session`)**: everything scoped to one logged in
//!   user, torn down on logout.

pub mod clock;
pub mod doc;
pub mod journal;
pub mod model;
pub mod notice;
pub mod session;
pub mod stamp;
pub mod store;
pub mod sync;

pub use clock::{Clock, SystemClock};
#[cfg(any(test, feature = "testing"))]
pub use clock::{ClockHold, FixedClock};
pub use stamp::Stamp;

/// Result type used throughout the Journo library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Journo library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Structured document errors from the doc module
    #[error(transparent)]
    Doc(doc::DocError),

    /// Structured store errors from the store module
    #[error(transparent)]
    Store(store::StoreError),

    /// Structured model errors from the model module
    #[error(transparent)]
    Model(model::ModelError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Doc(_) => "doc",
            Error::Store(_) => "store",
            Error::Model(_) => "model",
            Error::Io(_) => "io",
            Error::Serialize(_) => "serialize",
        }
    }

    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Store(store_err) => store_err.is_not_found(),
            Error::Model(model_err) => model_err.is_not_found(),
            _ => false,
        }
    }

    /// Check if this error indicates a conflict (already exists).
    pub fn is_conflict(&self) -> bool {
        match self {
            Error::Store(store_err) => store_err.is_already_exists(),
            _ => false,
        }
    }

    /// Check if this error is I/O related.
    pub fn is_io_error(&self) -> bool {
        match self {
            Error::Io(_) => true,
            Error::Store(store_err) => store_err.is_io_error(),
            _ => false,
        }
    }

    /// Check if this error is type-related.
    pub fn is_type_error(&self) -> bool {
        match self {
            Error::Doc(doc_err) => doc_err.is_type_error(),
            _ => false,
        }
    }

    /// Check if this error is a remote write that the store refused.
    pub fn is_write_rejected(&self) -> bool {
        match self {
            Error::Store(store_err) => store_err.is_write_rejected(),
            _ => false,
        }
    }

    /// Check if this error comes from malformed remote data.
    pub fn is_malformed_data(&self) -> bool {
        match self {
            Error::Model(model_err) => model_err.is_malformed_data(),
            Error::Doc(doc_err) => doc_err.is_path_error(),
            _ => false,
        }
    }
}
