//! The remote document store contract.
//!
//! A [`DocumentStore`] holds documents at slash-separated paths that
//! alternate collection and document ids (`users/u1/journal/2024-03-01`).
//! It supports full overwrites, merge-patches with dotted field paths, and
//! live subscriptions to a single document or to a query.
//!
//! Subscriptions are plain channels: the store pushes snapshots, the owner of
//! the [`Subscription`] pulls them when it is ready to apply them, and
//! dropping the subscription unsubscribes.

use std::fmt;

use async_trait::async_trait;

use crate::{
    Result,
    doc::{Doc, Patch},
};

mod errors;
pub use errors::StoreError;

pub mod memory;
pub use memory::MemoryStore;

mod query;
pub use query::{Filter, FilterOp, Query};

mod snapshot;
pub use snapshot::{Change, ChangeKind, DocumentSnapshot, QuerySnapshot, Subscription};

/// Handle to one document in the store.
///
/// Holding a reference says nothing about whether the document exists.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct DocRef {
    path: String,
}

impl DocRef {
    /// Parses a document path. Paths must have an even number of non-empty
    /// segments.
    pub fn new(path: impl Into<String>) -> Result<Self> {
        let path = path.into();
        let segments = validate_segments(&path)?;
        if segments % 2 != 0 {
            return Err(StoreError::InvalidPath {
                path,
                reason: "document paths have an even number of segments".to_string(),
            }
            .into());
        }
        Ok(Self { path })
    }

    /// The document id: the last path segment.
    pub fn id(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// The collection this document lives in.
    pub fn parent(&self) -> CollectionRef {
        let end = self.path.rfind('/').unwrap_or(0);
        CollectionRef {
            path: self.path[..end].to_string(),
        }
    }

    /// A sub-collection under this document.
    pub fn collection(&self, id: &str) -> CollectionRef {
        CollectionRef {
            path: format!("{}/{id}", self.path),
        }
    }
}

impl fmt::Display for DocRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

/// Handle to a collection of documents.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CollectionRef {
    path: String,
}

impl CollectionRef {
    /// Parses a collection path. Paths must have an odd number of non-empty
    /// segments.
    pub fn new(path: impl Into<String>) -> Result<Self> {
        let path = path.into();
        let segments = validate_segments(&path)?;
        if segments % 2 != 1 {
            return Err(StoreError::InvalidPath {
                path,
                reason: "collection paths have an odd number of segments".to_string(),
            }
            .into());
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// The document with `id` inside this collection.
    pub fn doc(&self, id: &str) -> DocRef {
        DocRef {
            path: format!("{}/{id}", self.path),
        }
    }

    /// Whether `doc` lives directly in this collection.
    pub fn contains(&self, doc: &DocRef) -> bool {
        doc.parent() == *self
    }
}

impl fmt::Display for CollectionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

fn validate_segments(path: &str) -> Result<usize> {
    let mut count = 0;
    for segment in path.split('/') {
        if segment.is_empty() {
            return Err(StoreError::InvalidPath {
                path: path.to_string(),
                reason: "empty segment".to_string(),
            }
            .into());
        }
        count += 1;
    }
    Ok(count)
}

/// A remote document database.
///
/// Write methods resolve once the store has accepted the write. Callers on
/// the reactive path never await them directly; they go through
/// [`Outbox`](crate::sync::Outbox) instead.
#[async_trait]
pub trait DocumentStore: Send + Sync + fmt::Debug {
    /// Fetches a document. A missing document is not an error: the snapshot
    /// simply has no data.
    async fn get(&self, doc: &DocRef) -> Result<DocumentSnapshot>;

    /// Overwrites a whole document, creating it if needed.
    ///
    /// `ServerTimestamp` sentinels are resolved; `Delete` sentinels nested in
    /// maps drop their key.
    async fn set(&self, doc: &DocRef, data: Doc) -> Result<()>;

    /// Merge-patches an existing document. Fails with `NotFound` if the
    /// document does not exist.
    async fn update(&self, doc: &DocRef, patch: &Patch) -> Result<()>;

    /// Deletes a document. Deleting a missing document succeeds.
    async fn delete(&self, doc: &DocRef) -> Result<()>;

    /// Creates a document with a store-assigned id.
    async fn add(&self, collection: &CollectionRef, data: Doc) -> Result<DocRef>;

    /// Subscribes to one document. The current state is delivered first,
    /// then the full document after every change.
    fn watch_document(&self, doc: &DocRef) -> Subscription<DocumentSnapshot>;

    /// Subscribes to a query. The first snapshot adds every matching
    /// document in query order; later snapshots carry deltas.
    fn watch_query(&self, query: &Query) -> Subscription<QuerySnapshot>;
}
