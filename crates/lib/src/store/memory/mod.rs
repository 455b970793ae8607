//! In-memory document store implementation
//!
//! This module provides an in-memory implementation of the
//! [`DocumentStore`] trait, suitable for testing, the command-line front end,
//! or any setup where the remote side is simulated locally. Snapshots and
//! query deltas are produced the same way a hosted document database would
//! produce them, including the initial snapshot on subscribe.

mod persistence;
mod watch;

use std::{
    collections::BTreeMap,
    path::Path,
    sync::{Arc, Mutex, MutexGuard},
};

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::debug;

use self::watch::{DocWatcher, QueryWatcher};
use super::{
    CollectionRef, DocRef, DocumentSnapshot, DocumentStore, Query, QuerySnapshot, StoreError,
    Subscription,
};
use crate::{
    Clock, Result, SystemClock,
    doc::{Doc, Patch},
};

/// A document store held entirely in memory.
///
/// Server timestamps resolve against the store's own [`Clock`]. The whole
/// state can be saved to and loaded from a JSON file.
#[derive(Debug)]
pub struct MemoryStore {
    state: Mutex<State>,
    clock: Arc<dyn Clock>,
}

#[derive(Debug, Default)]
struct State {
    documents: BTreeMap<DocRef, Doc>,
    doc_watchers: Vec<DocWatcher>,
    query_watchers: Vec<QueryWatcher>,
    /// Number of upcoming writes to reject.
    failures: usize,
}

impl MemoryStore {
    /// Creates a new, empty store using the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates a new, empty store that stamps server timestamps from `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self::from_documents(BTreeMap::new(), clock)
    }

    fn from_documents(documents: BTreeMap<DocRef, Doc>, clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(State {
                documents,
                ..State::default()
            }),
            clock,
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    /// Current body of a document, if it exists.
    pub fn peek(&self, doc: &DocRef) -> Option<Doc> {
        self.state().documents.get(doc).cloned()
    }

    /// Documents directly inside `collection`, in id order.
    pub fn list(&self, collection: &CollectionRef) -> Vec<(DocRef, Doc)> {
        self.state()
            .documents
            .iter()
            .filter(|(doc, _)| collection.contains(doc))
            .map(|(doc, data)| (doc.clone(), data.clone()))
            .collect()
    }

    /// Number of stored documents.
    pub fn len(&self) -> usize {
        self.state().documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of open subscriptions (document and query).
    pub fn watcher_count(&self) -> usize {
        let mut state = self.state();
        state.doc_watchers.retain(|w| !w.is_closed());
        state.query_watchers.retain(|w| !w.is_closed());
        state.doc_watchers.len() + state.query_watchers.len()
    }

    /// Rejects the next `count` writes with [`StoreError::WriteRejected`].
    #[cfg(any(test, feature = "testing"))]
    pub fn fail_next_writes(&self, count: usize) {
        self.state().failures = count;
    }

    /// Saves every document to `path` as JSON.
    pub async fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        persistence::save_to_file(self, path).await
    }

    /// Loads a store from `path`. A missing file yields an empty store.
    pub async fn load_from_file(path: impl AsRef<Path>, clock: Arc<dyn Clock>) -> Result<Self> {
        persistence::load_from_file(path, clock).await
    }

    fn check_write(state: &mut State, doc: &DocRef) -> Result<()> {
        if state.failures > 0 {
            state.failures -= 1;
            return Err(StoreError::WriteRejected {
                path: doc.to_string(),
                reason: "injected failure".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Stores (or removes) a document and notifies every affected watcher.
    fn commit(state: &mut State, doc: &DocRef, data: Option<Doc>) {
        match data {
            Some(data) => {
                state.documents.insert(doc.clone(), data);
            }
            None => {
                state.documents.remove(doc);
            }
        }
        let State {
            documents,
            doc_watchers,
            query_watchers,
            ..
        } = state;
        let current = documents.get(doc);
        doc_watchers.retain(|watcher| watcher.notify(doc, current));
        query_watchers.retain_mut(|watcher| watcher.notify(doc, current));
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, doc: &DocRef) -> Result<DocumentSnapshot> {
        Ok(DocumentSnapshot {
            reference: doc.clone(),
            data: self.peek(doc),
        })
    }

    async fn set(&self, doc: &DocRef, data: Doc) -> Result<()> {
        let now = self.clock.now_millis();
        let mut state = self.state();
        Self::check_write(&mut state, doc)?;
        let resolved = data.resolved(now).map_err(|source| StoreError::PatchFailed {
            path: doc.to_string(),
            source,
        })?;
        debug!(doc = %doc, "set");
        Self::commit(&mut state, doc, Some(resolved));
        Ok(())
    }

    async fn update(&self, doc: &DocRef, patch: &Patch) -> Result<()> {
        let now = self.clock.now_millis();
        let mut state = self.state();
        Self::check_write(&mut state, doc)?;
        let mut data = state
            .documents
            .get(doc)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                path: doc.to_string(),
            })?;
        data.apply_patch(patch, now)
            .map_err(|source| StoreError::PatchFailed {
                path: doc.to_string(),
                source,
            })?;
        debug!(doc = %doc, fields = patch.len(), "update");
        Self::commit(&mut state, doc, Some(data));
        Ok(())
    }

    async fn delete(&self, doc: &DocRef) -> Result<()> {
        let mut state = self.state();
        Self::check_write(&mut state, doc)?;
        if state.documents.contains_key(doc) {
            debug!(doc = %doc, "delete");
            Self::commit(&mut state, doc, None);
        }
        Ok(())
    }

    async fn add(&self, collection: &CollectionRef, data: Doc) -> Result<DocRef> {
        let doc = collection.doc(&uuid::Uuid::new_v4().simple().to_string());
        self.set(&doc, data).await?;
        Ok(doc)
    }

    fn watch_document(&self, doc: &DocRef) -> Subscription<DocumentSnapshot> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut state = self.state();
        let watcher = DocWatcher::new(doc.clone(), tx);
        if watcher.notify(doc, state.documents.get(doc)) {
            state.doc_watchers.push(watcher);
        }
        Subscription::new(doc.to_string(), rx)
    }

    fn watch_query(&self, query: &Query) -> Subscription<QuerySnapshot> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut state = self.state();
        let watcher = QueryWatcher::open(query.clone(), &state.documents, tx);
        if let Some(watcher) = watcher {
            state.query_watchers.push(watcher);
        }
        Subscription::new(query.collection().to_string(), rx)
    }
}
