//! Document data: nested maps addressed by dotted paths.
//!
//! [`Doc`] is the in-memory shape of one remote document (a tree of
//! [`Value`]s). [`Patch`] is a partial update keyed by dotted paths, the unit
//! every outbound write is expressed in.
//!
//! ```
//! use journo::doc::{Doc, Patch, Value};
//!
//! let mut doc = Doc::new()
//!     .with("date", "2024-03-01")
//!     .with("order", Value::List(vec![]));
//! doc.set("entries.3600.text", "buy milk").unwrap();
//! assert_eq!(doc.get_as::<&str>("entries.3600.text"), Some("buy milk"));
//!
//! let mut patch = Patch::new();
//! patch.set("entries.3600", Value::Delete);
//! doc.apply_patch(&patch, 0).unwrap();
//! assert!(doc.get("entries.3600").is_none());
//! ```

use std::collections::BTreeMap;

mod errors;
mod patch;
pub mod path;
mod value;

pub use errors::DocError;
pub use patch::Patch;
pub use path::{Path, PathBuf};
pub use value::Value;

/// A nested map of values, the body of one remote document.
///
/// Keys are kept sorted so iteration (and therefore JSON output and
/// reconciliation passes) is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Doc {
    children: BTreeMap<String, Value>,
}

impl Doc {
    /// Creates a new empty document
    pub fn new() -> Self {
        Self {
            children: BTreeMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Returns the number of direct keys
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Gets a value by dotted path.
    ///
    /// Returns `None` if any component is missing or a non-map value sits in
    /// the middle of the path.
    pub fn get(&self, path: impl AsRef<str>) -> Option<&Value> {
        let path = PathBuf::normalize(path.as_ref());
        let mut components = path.components();
        let mut current = self.children.get(components.next()?)?;
        for component in components {
            current = current.as_doc()?.children.get(component)?;
        }
        Some(current)
    }

    /// Gets a mutable reference by dotted path.
    pub fn get_mut(&mut self, path: impl AsRef<str>) -> Option<&mut Value> {
        let path = PathBuf::normalize(path.as_ref());
        let mut components = path.components();
        let mut current = self.children.get_mut(components.next()?)?;
        for component in components {
            current = current.as_doc_mut()?.children.get_mut(component)?;
        }
        Some(current)
    }

    /// Gets a value by path and converts it, returning `None` on absence or
    /// type mismatch.
    pub fn get_as<'a, T>(&'a self, path: impl AsRef<str>) -> Option<T>
    where
        T: TryFrom<&'a Value, Error = DocError>,
    {
        T::try_from(self.get(path)?).ok()
    }

    /// Gets a nested map by path.
    pub fn get_doc(&self, path: impl AsRef<str>) -> Option<&Doc> {
        self.get(path)?.as_doc()
    }

    pub fn contains(&self, path: impl AsRef<str>) -> bool {
        self.get(path).is_some()
    }

    /// Sets a value at a dotted path, creating intermediate maps as needed.
    ///
    /// A non-map value in the middle of the path is replaced by a map, the
    /// same way a merge-patch treats it. Returns the previous value.
    pub fn set(
        &mut self,
        path: impl AsRef<str>,
        value: impl Into<Value>,
    ) -> Result<Option<Value>, DocError> {
        let path = PathBuf::normalize(path.as_ref());
        let (parent, last) = self.parent_mut(&path)?;
        Ok(parent.children.insert(last.to_string(), value.into()))
    }

    /// Removes the value at a dotted path. Missing intermediate maps are not
    /// created.
    pub fn remove(&mut self, path: impl AsRef<str>) -> Option<Value> {
        let path = PathBuf::normalize(path.as_ref());
        let last = path.last()?;
        let parent = match path.parent() {
            Some(parent) => self.get_mut(parent.as_str())?.as_doc_mut()?,
            None => self,
        };
        parent.children.remove(last)
    }

    /// Builder-style set for single-level or dotted keys.
    ///
    /// Invalid (empty) paths are ignored.
    pub fn with(mut self, path: impl AsRef<str>, value: impl Into<Value>) -> Self {
        if let Err(err) = self.set(path, value) {
            tracing::debug!("Ignoring invalid builder key: {err}");
        }
        self
    }

    /// Direct children in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.children.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.children.keys()
    }

    /// Applies a merge-patch in key order.
    ///
    /// `Value::Delete` removes the addressed field and `Value::ServerTimestamp`
    /// (anywhere inside a patched value) resolves to `now_millis`.
    pub fn apply_patch(&mut self, patch: &Patch, now_millis: i64) -> Result<(), DocError> {
        for (path, value) in patch.iter() {
            match value {
                Value::Delete => {
                    self.remove(path.as_str());
                }
                value => {
                    let resolved = resolve_sentinels(value, now_millis, path)?;
                    self.set(path.as_str(), resolved)?;
                }
            }
        }
        Ok(())
    }

    /// Builds a document from a full-overwrite body, resolving server
    /// timestamps and rejecting delete sentinels.
    pub fn resolved(&self, now_millis: i64) -> Result<Doc, DocError> {
        match resolve_sentinels(&Value::Doc(self.clone()), now_millis, &PathBuf::new())? {
            Value::Doc(doc) => Ok(doc),
            other => Err(DocError::TypeMismatch {
                expected: "doc",
                actual: other.type_name(),
            }),
        }
    }

    /// Plain JSON rendering for display.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.children
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }

    fn parent_mut<'a>(&mut self, path: &'a Path) -> Result<(&mut Doc, &'a str), DocError> {
        let last = path.last().ok_or_else(|| DocError::InvalidPath {
            path: "(root)".to_string(),
        })?;
        let mut current = self;
        let depth = path.len() - 1;
        for component in path.components().take(depth) {
            let slot = current
                .children
                .entry(component.to_string())
                .or_insert_with(|| Value::Doc(Doc::new()));
            if !matches!(slot, Value::Doc(_)) {
                *slot = Value::Doc(Doc::new());
            }
            current = match slot {
                Value::Doc(doc) => doc,
                _ => unreachable!("slot was just replaced with a map"),
            };
        }
        Ok((current, last))
    }
}

impl FromIterator<(String, Value)> for Doc {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            children: iter.into_iter().collect(),
        }
    }
}

fn resolve_sentinels(value: &Value, now_millis: i64, at: &Path) -> Result<Value, DocError> {
    match value {
        Value::ServerTimestamp => Ok(Value::Timestamp(now_millis)),
        Value::Delete => Err(DocError::SentinelInData {
            sentinel: "delete",
            path: at.to_string(),
        }),
        Value::List(items) => items
            .iter()
            .map(|item| resolve_sentinels(item, now_millis, at))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        Value::Doc(doc) => {
            let mut out = Doc::new();
            for (key, child) in doc.iter() {
                match child {
                    // nested deletes inside a written map simply drop the key
                    Value::Delete => continue,
                    child => {
                        let child_path = at.to_path_buf().push(key);
                        let resolved = resolve_sentinels(child, now_millis, &child_path)?;
                        out.children.insert(key.clone(), resolved);
                    }
                }
            }
            Ok(Value::Doc(out))
        }
        other => Ok(other.clone()),
    }
}
