//! A single synced field with live and draft values.

use crate::doc::{Doc, PathBuf, Value};

/// How a property's draft maps to its stored value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    /// Any single value, edited as is.
    Scalar,
    /// A list of tags, edited as one space separated string.
    Tags,
}

/// One field of a remote document, addressed by dotted path.
///
/// The live value only changes through [`read`](Property::read) (remote
/// data) or a local [`assign`](Property::assign) /
/// [`commit_edit`](Property::commit_edit). Local changes return the value to
/// publish; the owning [`Document`](super::Document) decides whether it is
/// written.
///
/// ```
/// use journo::{doc::Value, model::Property};
///
/// let mut tags = Property::tags("tags");
/// tags.start_edit();
/// tags.set_draft("errand  home ");
/// let published = tags.commit_edit().unwrap();
/// assert_eq!(published, Value::from(vec!["errand".to_string(), "home".to_string()]));
///
/// tags.start_edit();
/// tags.set_draft("");
/// assert_eq!(tags.commit_edit(), Some(Value::Delete));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    name: PathBuf,
    kind: PropertyKind,
    live: Option<Value>,
    draft: Option<Value>,
    default: Option<Value>,
}

impl Property {
    pub fn new(name: impl Into<PathBuf>, kind: PropertyKind, default: Option<Value>) -> Self {
        Self {
            name: name.into(),
            kind,
            live: default.clone(),
            draft: None,
            default,
        }
    }

    /// A scalar property with no default.
    pub fn scalar(name: impl Into<PathBuf>) -> Self {
        Self::new(name, PropertyKind::Scalar, None)
    }

    /// A tags property, defaulting to no tags.
    pub fn tags(name: impl Into<PathBuf>) -> Self {
        Self::new(name, PropertyKind::Tags, Some(Value::List(Vec::new())))
    }

    /// Replaces the default (and the live value, if it was still the old
    /// default).
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        let default = Some(default.into());
        if self.live == self.default {
            self.live = default.clone();
        }
        self.default = default;
        self
    }

    pub fn name(&self) -> &PathBuf {
        &self.name
    }

    pub fn kind(&self) -> PropertyKind {
        self.kind
    }

    /// The live value. `None` means the field is absent.
    pub fn value(&self) -> Option<&Value> {
        self.live.as_ref()
    }

    pub fn text(&self) -> Option<&str> {
        self.live.as_ref().and_then(Value::as_text)
    }

    /// Live value as a list of strings (empty if absent or not a list).
    pub fn tag_list(&self) -> Vec<String> {
        self.live
            .as_ref()
            .and_then(Value::as_text_list)
            .unwrap_or_default()
    }

    pub fn draft(&self) -> Option<&Value> {
        self.draft.as_ref()
    }

    pub fn is_editing(&self) -> bool {
        self.draft.is_some()
    }

    /// Sets the live value from freshly fetched remote data. Never publishes.
    ///
    /// An absent field (or one of the wrong shape, for tags) falls back to
    /// the default. Returns whether the live value changed.
    pub fn read(&mut self, raw: Option<&Value>) -> bool {
        let incoming = match (self.kind, raw) {
            (_, Some(value)) if value.is_sentinel() => None,
            (PropertyKind::Tags, Some(value)) if value.as_list().is_none() => None,
            (_, value) => value.cloned(),
        };
        let next = incoming.or_else(|| self.default.clone());
        if next == self.live {
            return false;
        }
        self.live = next;
        true
    }

    /// Reads this property's own field out of a whole document.
    pub fn read_from(&mut self, data: &Doc) -> bool {
        let raw = data.get(self.name.as_str());
        self.read(raw)
    }

    /// Copies the live value into the draft. Tags become one string.
    pub fn start_edit(&mut self) {
        self.draft = match self.kind {
            PropertyKind::Scalar => Some(self.live.clone().unwrap_or(Value::Null)),
            PropertyKind::Tags => Some(Value::Text(self.tag_list().join(" "))),
        };
    }

    /// Replaces the draft. Starts an edit session if none is open.
    pub fn set_draft(&mut self, value: impl Into<Value>) {
        self.draft = Some(value.into());
    }

    pub fn cancel_edit(&mut self) {
        self.draft = None;
    }

    /// Parses the draft into canonical form and assigns it.
    ///
    /// Returns the value to publish, or `None` if there was no open edit or
    /// the canonical value equals the live one. A null draft clears the
    /// field, except on fields that hold an explicit null when empty.
    pub fn commit_edit(&mut self) -> Option<Value> {
        let draft = self.draft.take()?;
        let value = match self.kind {
            PropertyKind::Scalar if draft.is_null() && !self.keeps_null() => None,
            PropertyKind::Scalar => Some(draft),
            PropertyKind::Tags => Some(canonical_tags(&draft)),
        };
        self.assign(value)
    }

    /// Sets the live value locally. Returns the value to publish if it
    /// changed.
    ///
    /// Absent and empty-list values are the same thing here: moving between
    /// them is not a change.
    pub fn assign(&mut self, value: Option<Value>) -> Option<Value> {
        if value == self.live || (is_blank(&value) && is_blank(&self.live)) {
            return None;
        }
        self.live = value;
        Some(self.outbound())
    }

    /// What a write of the live value looks like: absent fields and empty
    /// lists become a field delete.
    pub fn outbound(&self) -> Value {
        match &self.live {
            Some(value) if !value.is_empty_list() => value.clone(),
            _ => Value::Delete,
        }
    }

    fn keeps_null(&self) -> bool {
        [&self.live, &self.default]
            .into_iter()
            .any(|value| value.as_ref().is_some_and(Value::is_null))
    }
}

fn is_blank(value: &Option<Value>) -> bool {
    value.as_ref().is_none_or(Value::is_empty_list)
}

/// Splits a tags draft on whitespace, dropping empty tokens and repeats.
pub fn canonical_tags(draft: &Value) -> Value {
    let tokens: Vec<&str> = match draft {
        Value::Text(text) => text.split_whitespace().collect(),
        Value::List(items) => items
            .iter()
            .filter_map(Value::as_text)
            .flat_map(str::split_whitespace)
            .collect(),
        _ => Vec::new(),
    };
    let mut tags: Vec<String> = Vec::with_capacity(tokens.len());
    for token in tokens {
        if !tags.iter().any(|t| t == token) {
            tags.push(token.to_string());
        }
    }
    Value::from(tags)
}
