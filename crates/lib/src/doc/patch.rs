//! Partial updates keyed by dotted paths.

use std::collections::BTreeMap;

use super::{Path, PathBuf, Value};

/// A merge-patch: dotted path to new value.
///
/// Paths apply in sorted order, so a parent key (`entries.12`) is always
/// written before any of its own fields (`entries.12.text`).
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Patch {
    fields: BTreeMap<PathBuf, Value>,
}

impl Patch {
    pub fn new() -> Self {
        Self::default()
    }

    /// A patch with a single field.
    pub fn single(path: impl Into<PathBuf>, value: impl Into<Value>) -> Self {
        let mut patch = Self::new();
        patch.set(path, value);
        patch
    }

    /// Sets (or replaces) the value written at `path`.
    pub fn set(&mut self, path: impl Into<PathBuf>, value: impl Into<Value>) -> &mut Self {
        self.fields.insert(path.into(), value.into());
        self
    }

    /// Folds `other` into this patch; later values win.
    pub fn merge(&mut self, other: Patch) {
        self.fields.extend(other.fields);
    }

    pub fn get(&self, path: impl AsRef<str>) -> Option<&Value> {
        let path = PathBuf::normalize(path.as_ref());
        let key: &Path = &path;
        self.fields.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PathBuf, &Value)> {
        self.fields.iter()
    }

    /// Paths written by this patch, in application order.
    pub fn paths(&self) -> impl Iterator<Item = &PathBuf> {
        self.fields.keys()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<P: Into<PathBuf>, V: Into<Value>> FromIterator<(P, V)> for Patch {
    fn from_iter<I: IntoIterator<Item = (P, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(p, v)| (p.into(), v.into()))
                .collect(),
        }
    }
}
