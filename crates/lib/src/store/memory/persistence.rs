//! Persistence operations for MemoryStore
//!
//! This module handles serialization and file I/O for saving/loading the
//! in-memory store's documents to/from JSON files.

use std::{collections::BTreeMap, path::Path, sync::Arc};

use serde::{Deserialize, Deserializer, Serialize};

use super::MemoryStore;
use crate::{Clock, Error, Result, doc::Doc, store::DocRef, store::StoreError};

/// The current persistence file format version.
/// v0 indicates this is an unstable format subject to breaking changes.
const PERSISTENCE_VERSION: u8 = 0;

/// Helper to check if version is default (0) for serde skip_serializing_if
fn is_v0(v: &u8) -> bool {
    *v == 0
}

/// Validates the persistence version during deserialization.
fn validate_persistence_version<'de, D>(deserializer: D) -> std::result::Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let version = u8::deserialize(deserializer)?;
    if version != PERSISTENCE_VERSION {
        return Err(serde::de::Error::custom(format!(
            "unsupported persistence version {version}; only version {PERSISTENCE_VERSION} is supported"
        )));
    }
    Ok(version)
}

/// On-disk shape of a MemoryStore. Subscriptions are not persisted.
#[derive(Serialize, Deserialize)]
struct SerializableStore {
    /// File format version for compatibility checking
    #[serde(
        rename = "_v",
        default,
        skip_serializing_if = "is_v0",
        deserialize_with = "validate_persistence_version"
    )]
    version: u8,
    /// Document path to body
    documents: BTreeMap<String, Doc>,
}

/// Saves every document to `path` as pretty-printed JSON.
pub(super) async fn save_to_file(store: &MemoryStore, path: impl AsRef<Path>) -> Result<()> {
    // Copy out under the lock; the guard must not be held across the write
    let documents = store
        .state()
        .documents
        .iter()
        .map(|(doc, data)| (doc.path().to_string(), data.clone()))
        .collect();

    let serializable = SerializableStore {
        version: PERSISTENCE_VERSION,
        documents,
    };

    let json = serde_json::to_string_pretty(&serializable)
        .map_err(|e| -> Error { StoreError::SerializationFailed { source: e }.into() })?;
    tokio::fs::write(path, json)
        .await
        .map_err(|e| -> Error { StoreError::FileIo { source: e }.into() })
}

/// Loads a store from a JSON file.
///
/// If the file does not exist, a new, empty store is returned.
pub(super) async fn load_from_file(path: impl AsRef<Path>, clock: Arc<dyn Clock>) -> Result<MemoryStore> {
    let json = match tokio::fs::read_to_string(path).await {
        Ok(json) => json,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(MemoryStore::with_clock(clock));
        }
        Err(e) => return Err(StoreError::FileIo { source: e }.into()),
    };
    let serializable: SerializableStore = serde_json::from_str(&json)
        .map_err(|e| -> Error { StoreError::DeserializationFailed { source: e }.into() })?;

    let mut documents = BTreeMap::new();
    for (path, data) in serializable.documents {
        documents.insert(DocRef::new(path)?, data);
    }
    Ok(MemoryStore::from_documents(documents, clock))
}
