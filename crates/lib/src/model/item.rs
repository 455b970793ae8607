//! One tracked item: a book, a show, a game, a build task.

use uuid::Uuid;

use super::{Capability, Document, ItemKind, PropertyKind};
use crate::{
    Result, Stamp,
    doc::{Doc, Value},
    store::DocRef,
    sync::Outbox,
};

/// A [`Document`] whose properties come from its kind's descriptor.
///
/// Items are mutated in place by collection snapshots, so references held
/// by a consumer stay valid across updates. [`instance`](Item::instance)
/// identifies the in-memory object itself, distinct from the document id.
#[derive(Debug)]
pub struct Item {
    kind: ItemKind,
    doc: Document,
    /// Last inbound body, kept so a delete can be undone with every field.
    data: Doc,
    created: i64,
    instance: Uuid,
}

impl Item {
    /// Builds an item from its first snapshot.
    ///
    /// A missing or null `created` (a local write the store has not stamped
    /// yet) is taken to be `now_millis`.
    pub fn new(kind: ItemKind, reference: DocRef, data: &Doc, outbox: Outbox, now_millis: i64) -> Self {
        let mut doc = Document::new(reference, outbox);
        for field in kind.descriptor().all_fields() {
            doc.add_prop(field.property());
        }
        let mut item = Self {
            kind,
            doc,
            data: Doc::new(),
            created: now_millis,
            instance: Uuid::new_v4(),
        };
        item.read(data);
        item
    }

    /// Applies an inbound snapshot of this item's document.
    pub fn read(&mut self, data: &Doc) {
        if let Some(created) = data.get("created").and_then(Value::as_timestamp) {
            self.created = created;
        }
        self.data = data.clone();
        self.doc.read(data);
    }

    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    pub fn id(&self) -> &str {
        self.doc.reference().id()
    }

    pub fn reference(&self) -> &DocRef {
        self.doc.reference()
    }

    pub fn instance(&self) -> Uuid {
        self.instance
    }

    /// Creation time in milliseconds since the epoch.
    pub fn created(&self) -> i64 {
        self.created
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.doc.value(field)
    }

    pub fn text(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_text)
    }

    /// The kind's main text (title, name or task text).
    pub fn title(&self) -> &str {
        self.text(self.kind.descriptor().title_field).unwrap_or_default()
    }

    pub fn tags(&self) -> Vec<String> {
        self.doc
            .prop("tags")
            .map(|p| p.tag_list())
            .unwrap_or_default()
    }

    pub fn link(&self) -> Option<&str> {
        self.text("link")
    }

    /// The completion stamp, if completed.
    pub fn completed(&self) -> Option<&str> {
        self.text("completed")
    }

    pub fn is_completed(&self) -> bool {
        self.completed().is_some()
    }

    /// The start stamp, for startable kinds.
    pub fn started(&self) -> Option<&str> {
        self.text("started")
    }

    pub fn is_started(&self) -> bool {
        self.kind.has(Capability::Startable) && self.started().is_some()
    }

    /// Locally sets a field and publishes it.
    pub fn set(&mut self, field: &str, value: impl Into<Value>) -> Result<bool> {
        let value = value.into();
        let value = (!value.is_null() || field == "completed").then_some(value);
        self.doc.assign(field, value)
    }

    /// Clears a field (deletes it remotely).
    pub fn clear(&mut self, field: &str) -> Result<bool> {
        self.doc.assign(field, None)
    }

    pub fn complete(&mut self, on: Stamp) -> Result<bool> {
        self.set("completed", on.to_string())
    }

    /// Marks the item incomplete again, keeping the explicit null.
    pub fn uncomplete(&mut self) -> Result<bool> {
        self.set("completed", Value::Null)
    }

    /// Fails with a not-found error for kinds without `started`.
    pub fn start(&mut self, on: Stamp) -> Result<bool> {
        self.set("started", on.to_string())
    }

    pub fn start_edit(&mut self) {
        self.doc.start_edit();
    }

    pub fn set_draft(&mut self, field: &str, value: impl Into<Value>) -> Result<()> {
        self.doc.set_draft(field, value)
    }

    pub fn commit_edit(&mut self) {
        self.doc.commit_edit();
    }

    pub fn cancel_edit(&mut self) {
        self.doc.cancel_edit();
    }

    /// The full document as this item currently sees it: the last inbound
    /// body overlaid with live property values.
    pub fn to_doc(&self) -> Doc {
        let mut data = self.data.clone();
        for prop in self.doc.props() {
            let result = match prop.value() {
                Some(value) if !(prop.kind() == PropertyKind::Tags && value.is_empty_list()) => {
                    data.set(prop.name().as_str(), value.clone()).map(|_| ())
                }
                _ => {
                    data.remove(prop.name().as_str());
                    Ok(())
                }
            };
            if let Err(e) = result {
                tracing::debug!("Skipping field {} in item snapshot: {e}", prop.name());
            }
        }
        if !data.contains("created") {
            data = data.with("created", Value::Timestamp(self.created));
        }
        data
    }

    /// Case-insensitive search: exact tag match, or a substring of the link
    /// or any searchable text field. Games also match "finished" once the
    /// credits have rolled.
    pub fn matches(&self, seek: &str) -> bool {
        let seek = seek.to_lowercase();
        if self.tags().iter().any(|tag| tag.to_lowercase() == seek) {
            return true;
        }
        let contains = |text: Option<&str>| text.is_some_and(|t| t.to_lowercase().contains(&seek));
        let descriptor = self.kind.descriptor();
        if descriptor
            .all_fields()
            .filter(|field| field.searchable)
            .any(|field| contains(self.text(field.name)))
        {
            return true;
        }
        self.kind == ItemKind::Play
            && seek == "finished"
            && self.get("credits").and_then(Value::as_bool) == Some(true)
    }
}
