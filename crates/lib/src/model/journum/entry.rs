//! Journal entries: lines within a day, backed by their parent's document.

use crate::{
    Result,
    doc::{Doc, Path, PathBuf, Value},
    model::{Document, Property},
};

/// One entry of a [`Journum`](super::Journum).
///
/// The entry's `text` and `tags` are properties registered on the parent
/// document under `entries.<key>`; the entry itself only remembers where
/// they live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    key: String,
    prefix: PathBuf,
    item: Option<String>,
}

impl Entry {
    /// Registers a new entry's properties on `doc`.
    pub(super) fn attach(doc: &mut Document, key: &str) -> Result<Self> {
        let prefix = PathBuf::from("entries").child(key)?;
        doc.add_prop(Property::scalar(prefix.clone().push("text")).with_default(""));
        doc.add_prop(Property::tags(prefix.clone().push("tags")));
        Ok(Self {
            key: key.to_string(),
            prefix,
            item: None,
        })
    }

    /// Unregisters this entry's properties so they stop syncing.
    pub(super) fn detach(&self, doc: &mut Document) {
        doc.remove_props_under(&self.prefix);
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Path of the entry's map in the day document (`entries.<key>`).
    pub fn prefix(&self) -> &Path {
        &self.prefix
    }

    pub(super) fn text_path(&self) -> PathBuf {
        self.prefix.clone().push("text")
    }

    pub(super) fn tags_path(&self) -> PathBuf {
        self.prefix.clone().push("tags")
    }

    /// Picks up the read-only `item` link from the entry's remote data.
    pub(super) fn read_item(&mut self, data: Option<&Doc>) {
        self.item = data.and_then(|d| d.get_as::<String>("item"));
    }

    pub fn item(&self) -> Option<&str> {
        self.item.as_deref()
    }

    /// The entry's remote shape: `{text, tags?, item?}`.
    pub(super) fn to_doc(&self, doc: &Document) -> Doc {
        let view = EntryView { entry: self, doc };
        let mut data = Doc::new().with("text", view.text());
        let tags = view.tags();
        if !tags.is_empty() {
            data = data.with("tags", tags);
        }
        if let Some(item) = &self.item {
            data = data.with("item", item.as_str());
        }
        data
    }
}

/// Read access to an entry together with its parent document.
#[derive(Debug, Clone, Copy)]
pub struct EntryView<'a> {
    pub(super) entry: &'a Entry,
    pub(super) doc: &'a Document,
}

impl<'a> EntryView<'a> {
    pub fn key(&self) -> &'a str {
        self.entry.key()
    }

    pub fn text(&self) -> &'a str {
        self.doc
            .prop(self.entry.text_path().as_str())
            .and_then(Property::text)
            .unwrap_or_default()
    }

    pub fn tags(&self) -> Vec<String> {
        self.doc
            .prop(self.entry.tags_path().as_str())
            .map(Property::tag_list)
            .unwrap_or_default()
    }

    pub fn item(&self) -> Option<&'a str> {
        self.entry.item()
    }

    /// Whether the entry's text or tags are being edited.
    pub fn is_editing(&self) -> bool {
        self.doc
            .props()
            .any(|p| p.name().starts_with(self.entry.prefix()) && p.is_editing())
    }

    /// Current draft of the text, if editing.
    pub fn draft_text(&self) -> Option<&'a str> {
        self.doc
            .prop(self.entry.text_path().as_str())
            .and_then(Property::draft)
            .and_then(Value::as_text)
    }

    /// Case-insensitive: substring of the text, or an exact tag.
    pub fn matches(&self, seek: &str) -> bool {
        let seek = seek.to_lowercase();
        self.text().to_lowercase().contains(&seek)
            || self.tags().iter().any(|tag| tag.to_lowercase() == seek)
    }
}
