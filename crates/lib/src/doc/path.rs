//! Dotted paths addressing fields inside nested documents.
//!
//! Remote documents are free-form trees of maps, so a synced field is named by
//! a dotted path such as `entries.3600.text`. The same path value is used both
//! to read a field out of an inbound snapshot and to key the outbound patch,
//! so reads and writes can never disagree about where a field lives.
//!
//! [`Path`] and [`PathBuf`] follow the borrowed/owned split of
//! `std::path::Path`/`std::path::PathBuf`.
//!
//! ```rust
//! use journo::doc::PathBuf;
//! use std::str::FromStr;
//!
//! let path = PathBuf::from_str("entries..3600.text.").unwrap();
//! assert_eq!(path.as_str(), "entries.3600.text");
//!
//! let built = PathBuf::new().push("entries").push("3600").push("text");
//! assert_eq!(built, path);
//! ```

use std::{borrow::Borrow, fmt, ops::Deref, str::FromStr};

use super::DocError;

/// Normalizes a path string by dropping empty components.
///
/// - `""` stays empty (the document root)
/// - leading, trailing and doubled dots are removed
///
/// ```rust
/// # use journo::doc::path::normalize_path;
/// assert_eq!(normalize_path(".tags"), "tags");
/// assert_eq!(normalize_path("entries..12.text"), "entries.12.text");
/// assert_eq!(normalize_path("..."), "");
/// ```
pub fn normalize_path(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }

    input
        .split('.')
        .filter(|component| !component.is_empty())
        .collect::<Vec<_>>()
        .join(".")
}

/// Checks that a single path component is usable as a map key.
///
/// Components are joined with dots, so a component that contains a dot (or
/// is empty) would silently address a different field.
pub fn validate_component(component: &str) -> Result<(), DocError> {
    if component.is_empty() || component.contains('.') {
        return Err(DocError::InvalidComponent {
            component: component.to_string(),
        });
    }
    Ok(())
}

/// An owned, normalized dotted path.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(into = "String", from = "String")]
pub struct PathBuf {
    inner: String,
}

/// A borrowed, normalized dotted path.
///
/// This type is unsized and always used behind a reference.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Path {
    inner: str,
}

impl PathBuf {
    /// Creates the empty path (the document root).
    pub fn new() -> Self {
        Self {
            inner: String::new(),
        }
    }

    /// Normalizes `path` into a `PathBuf`. Never fails.
    pub fn normalize(path: &str) -> Self {
        Self {
            inner: normalize_path(path),
        }
    }

    /// Appends a path (or a single component) to the end of this one.
    pub fn push(mut self, path: impl AsRef<str>) -> Self {
        let normalized = normalize_path(path.as_ref());
        if normalized.is_empty() {
            return self;
        }

        if self.inner.is_empty() {
            self.inner = normalized;
        } else {
            self.inner.push('.');
            self.inner.push_str(&normalized);
        }
        self
    }

    /// Appends exactly one component, rejecting components with dots.
    pub fn child(self, component: impl AsRef<str>) -> Result<Self, DocError> {
        validate_component(component.as_ref())?;
        Ok(self.push(component))
    }

    /// Returns the parent path, or `None` for single-component and empty paths.
    pub fn parent(&self) -> Option<PathBuf> {
        self.inner.rfind('.').map(|last_dot| PathBuf {
            inner: self.inner[..last_dot].to_string(),
        })
    }
}

impl Path {
    /// Reinterprets an already-normalized string as a `Path`.
    ///
    /// # Safety
    /// The caller must ensure `s` is normalized (no empty components).
    unsafe fn from_normalized_unchecked(s: &str) -> &Path {
        // SAFETY: Path is a transparent wrapper around str
        unsafe { &*(s as *const str as *const Path) }
    }

    /// Returns an iterator over the components.
    pub fn components(&self) -> impl DoubleEndedIterator<Item = &str> {
        self.inner.split('.').filter(|s| !s.is_empty())
    }

    /// Returns the number of components.
    pub fn len(&self) -> usize {
        self.components().count()
    }

    /// Returns `true` for the root path.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the last component, or `None` for the root path.
    pub fn last(&self) -> Option<&str> {
        self.components().next_back()
    }

    /// Returns `true` if `self` equals `prefix` or lies underneath it.
    pub fn starts_with(&self, prefix: impl AsRef<Path>) -> bool {
        let prefix = &prefix.as_ref().inner;
        if prefix.is_empty() {
            return true;
        }
        self.inner == *prefix
            || (self.inner.starts_with(prefix) && self.inner[prefix.len()..].starts_with('.'))
    }

    pub fn as_str(&self) -> &str {
        &self.inner
    }

    pub fn to_path_buf(&self) -> PathBuf {
        PathBuf {
            inner: self.inner.to_string(),
        }
    }
}

impl Default for PathBuf {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for PathBuf {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        // PathBuf only ever holds normalized strings
        unsafe { Path::from_normalized_unchecked(self.inner.as_str()) }
    }
}

impl AsRef<Path> for PathBuf {
    fn as_ref(&self) -> &Path {
        self.deref()
    }
}

impl AsRef<Path> for Path {
    fn as_ref(&self) -> &Path {
        self
    }
}

impl AsRef<str> for Path {
    fn as_ref(&self) -> &str {
        &self.inner
    }
}

impl AsRef<str> for PathBuf {
    fn as_ref(&self) -> &str {
        &self.inner
    }
}

impl Borrow<Path> for PathBuf {
    fn borrow(&self) -> &Path {
        self.deref()
    }
}

impl ToOwned for Path {
    type Owned = PathBuf;

    fn to_owned(&self) -> PathBuf {
        self.to_path_buf()
    }
}

impl FromStr for PathBuf {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::normalize(s))
    }
}

impl From<&str> for PathBuf {
    fn from(s: &str) -> Self {
        Self::normalize(s)
    }
}

impl From<String> for PathBuf {
    fn from(s: String) -> Self {
        Self::normalize(&s)
    }
}

impl From<PathBuf> for String {
    fn from(path: PathBuf) -> Self {
        path.inner
    }
}

impl From<&Path> for PathBuf {
    fn from(path: &Path) -> Self {
        path.to_path_buf()
    }
}

impl fmt::Display for PathBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.deref(), f)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.inner.is_empty() {
            write!(f, "(root)")
        } else {
            write!(f, "{}", &self.inner)
        }
    }
}

/// Builds a [`PathBuf`] from one or more components.
///
/// Each argument is normalized and appended in order.
///
/// ```rust
/// # use journo::path;
/// let key = "3600";
/// assert_eq!(path!("entries", key, "text").as_str(), "entries.3600.text");
/// ```
#[macro_export]
macro_rules! path {
    () => {
        $crate::doc::PathBuf::new()
    };
    ($($part:expr),+ $(,)?) => {{
        let path = $crate::doc::PathBuf::new();
        $(let path = path.push(&$part);)+
        path
    }};
}
