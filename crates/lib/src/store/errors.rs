//! Error types for remote document store operations.

use thiserror::Error;

/// Errors that can occur while talking to a document store.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StoreError {
    /// No document exists at the given path.
    #[error("Document not found: {path}")]
    NotFound { path: String },

    /// A create was attempted on a path that already holds a document.
    #[error("Document already exists: {path}")]
    AlreadyExists { path: String },

    /// The store refused a write.
    #[error("Write to {path} rejected: {reason}")]
    WriteRejected { path: String, reason: String },

    /// A document or collection path was malformed.
    #[error("Invalid store path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// A patch could not be applied to the stored document.
    #[error("Failed to apply patch to {path}: {source}")]
    PatchFailed {
        path: String,
        #[source]
        source: crate::doc::DocError,
    },

    /// The subscription's stream ended.
    #[error("Subscription to {target} closed")]
    SubscriptionClosed { target: String },

    /// File I/O failed while persisting the store.
    #[error("Store file I/O error: {source}")]
    FileIo {
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize the store for persistence.
    #[error("Store serialization failed: {source}")]
    SerializationFailed {
        #[source]
        source: serde_json::Error,
    },

    /// Failed to deserialize a persisted store.
    #[error("Store deserialization failed: {source}")]
    DeserializationFailed {
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    /// Check if this error indicates a resource was not found
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, StoreError::AlreadyExists { .. })
    }

    /// Check if the store refused the write
    pub fn is_write_rejected(&self) -> bool {
        matches!(self, StoreError::WriteRejected { .. })
    }

    /// Check if this error is related to persistence I/O or (de)serialization
    pub fn is_io_error(&self) -> bool {
        matches!(
            self,
            StoreError::FileIo { .. }
                | StoreError::SerializationFailed { .. }
                | StoreError::DeserializationFailed { .. }
        )
    }
}

impl From<StoreError> for crate::Error {
    fn from(err: StoreError) -> Self {
        crate::Error::Store(err)
    }
}
