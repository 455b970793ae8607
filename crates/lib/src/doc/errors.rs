//! Error types for document values and dotted-path access.

use thiserror::Error;

/// Structured errors for [`Doc`](super::Doc) and [`Value`](super::Value) operations.
#[non_exhaustive]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DocError {
    /// The root path cannot be read or written as a field.
    #[error("Invalid path: {path}")]
    InvalidPath { path: String },

    /// A single path component was empty or contained a dot.
    #[error("Invalid path component '{component}': components must be non-empty and dot-free")]
    InvalidComponent { component: String },

    /// A value had a different type than the caller required.
    #[error("Type mismatch: expected {expected}, found {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    /// A write sentinel (delete or server timestamp) appeared where only
    /// concrete stored data is allowed.
    #[error("Sentinel value '{sentinel}' is only valid inside a patch (at {path})")]
    SentinelInData { sentinel: &'static str, path: String },
}

impl DocError {
    /// Check if this error is related to path handling
    pub fn is_path_error(&self) -> bool {
        matches!(
            self,
            DocError::InvalidPath { .. } | DocError::InvalidComponent { .. }
        )
    }

    /// Check if this error is related to type mismatches
    pub fn is_type_error(&self) -> bool {
        matches!(self, DocError::TypeMismatch { .. })
    }
}

impl From<DocError> for crate::Error {
    fn from(err: DocError) -> Self {
        crate::Error::Doc(err)
    }
}
