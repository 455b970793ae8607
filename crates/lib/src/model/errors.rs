//! Error types for the synced object model.

use thiserror::Error;

/// Errors raised by model documents and collections.
#[non_exhaustive]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    /// A day stamp could not be parsed. Fatal for the document carrying it.
    #[error("Invalid date stamp: '{stamp}'")]
    InvalidStamp { stamp: String },

    /// A field the model cannot do without is absent from remote data.
    #[error("Document {doc} is missing required field '{field}'")]
    MissingField { doc: String, field: String },

    /// An item kind name that is not one of the known kinds.
    #[error("Unknown item kind: {kind}")]
    UnknownKind { kind: String },

    /// No property with this name is registered on the document.
    #[error("Unknown property '{name}' on {doc}")]
    UnknownProperty { doc: String, name: String },

    /// No journal entry with this key.
    #[error("Entry not found: {key}")]
    EntryNotFound { key: String },

    /// No item with this id in the collection.
    #[error("Item not found: {id}")]
    ItemNotFound { id: String },
}

impl ModelError {
    /// Check if this error indicates a resource was not found
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ModelError::UnknownProperty { .. }
                | ModelError::EntryNotFound { .. }
                | ModelError::ItemNotFound { .. }
        )
    }

    /// Check if this error comes from remote data the model cannot accept
    pub fn is_malformed_data(&self) -> bool {
        matches!(
            self,
            ModelError::InvalidStamp { .. } | ModelError::MissingField { .. }
        )
    }
}

impl From<ModelError> for crate::Error {
    fn from(err: ModelError) -> Self {
        crate::Error::Model(err)
    }
}
