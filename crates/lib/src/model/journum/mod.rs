//! A journal day: entries in a map plus a synced order array.
//!
//! The day document looks like
//! `{date: "YYYY-MM-DD", entries: {<key>: {text, tags?, item?}}, order: [key, ...]}`.
//! Every inbound read reconciles the in-memory entries against `entries`,
//! then repairs `order` so it holds exactly the existing keys.

mod entry;
mod reconcile;

use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};

use tracing::{debug, warn};

pub use entry::{Entry, EntryView};
pub use reconcile::{compare_keys, entry_key, free_key, repair_order};

use super::{Document, ModelError};
use crate::{
    Clock, Result, Stamp,
    doc::{Doc, Patch, Value},
    store::{DocRef, DocumentSnapshot, Subscription},
    sync::{Outbox, Undo},
};

/// One calendar day's journal.
#[derive(Debug)]
pub struct Journum {
    doc: Document,
    date: Stamp,
    midnight: i64,
    entries: BTreeMap<String, Entry>,
    order: Vec<String>,
    subscription: Option<Subscription<DocumentSnapshot>>,
    clock: Arc<dyn Clock>,
}

impl Journum {
    /// Builds a day from its first read.
    ///
    /// Fails if `date` is missing or does not parse: a day without a valid
    /// date cannot place its entries.
    pub fn open(reference: DocRef, data: &Doc, outbox: Outbox, clock: Arc<dyn Clock>) -> Result<Self> {
        let raw = data
            .get_as::<&str>("date")
            .ok_or_else(|| ModelError::MissingField {
                doc: reference.to_string(),
                field: "date".to_string(),
            })?;
        let date = Stamp::parse(raw)?;
        let midnight = date.midnight_millis(clock.offset_on(date));
        let mut journum = Self {
            doc: Document::new(reference, outbox),
            date,
            midnight,
            entries: BTreeMap::new(),
            order: Vec::new(),
            subscription: None,
            clock,
        };
        journum.read(data)?;
        Ok(journum)
    }

    pub fn date(&self) -> Stamp {
        self.date
    }

    pub fn reference(&self) -> &DocRef {
        self.doc.reference()
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Entry keys in display order.
    pub fn order(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Entry keys in key order (not display order).
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    pub fn entry(&self, key: &str) -> Option<EntryView<'_>> {
        let entry = self.entries.get(key)?;
        Some(EntryView {
            entry,
            doc: &self.doc,
        })
    }

    /// Entries in display order.
    pub fn entries(&self) -> Vec<EntryView<'_>> {
        self.order.iter().filter_map(|key| self.entry(key)).collect()
    }

    /// Entries matching a search, in display order.
    pub fn search(&self, seek: &str) -> Vec<EntryView<'_>> {
        self.entries()
            .into_iter()
            .filter(|entry| entry.matches(seek))
            .collect()
    }

    /// Applies an inbound read of the day document. Never writes.
    pub fn read(&mut self, data: &Doc) -> Result<()> {
        let Self {
            doc,
            entries,
            order,
            ..
        } = self;
        doc.read_with(data, |doc, data| {
            reconcile(doc, entries, order, data);
            Ok(())
        })
    }

    /// Starts following remote changes to this day.
    pub fn attach(&mut self, subscription: Subscription<DocumentSnapshot>) {
        self.subscription = Some(subscription);
    }

    pub fn is_attached(&self) -> bool {
        self.subscription.is_some()
    }

    /// Applies one snapshot. A deleted day reads as having no entries.
    pub fn apply(&mut self, snapshot: DocumentSnapshot) -> Result<()> {
        if !self.is_attached() {
            return Ok(());
        }
        let data = snapshot.data.unwrap_or_default();
        self.read(&data)
    }

    /// Applies every snapshot that has already arrived. Returns how many
    /// were applied.
    pub fn sync(&mut self) -> Result<usize> {
        let mut applied = 0;
        while let Some(snapshot) = self.subscription.as_mut().and_then(Subscription::try_next) {
            self.apply(snapshot)?;
            applied += 1;
        }
        Ok(applied)
    }

    /// Waits for the next snapshot and applies it. Returns false once
    /// closed or the stream has ended.
    pub async fn next(&mut self) -> Result<bool> {
        let Some(subscription) = self.subscription.as_mut() else {
            return Ok(false);
        };
        match subscription.next().await {
            Some(snapshot) => {
                self.apply(snapshot)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Unsubscribes. Writes already queued still go out.
    pub fn close(&mut self) {
        if self.subscription.take().is_some() {
            debug!(day = %self.date, "Closed journal day");
        }
    }

    /// Adds an entry and returns its key.
    ///
    /// The key is the number of seconds since this day's local midnight,
    /// bumped forward past any key already in use. The entry and the new
    /// order go out as one update.
    pub fn add_entry(&mut self, text: &str, tags: &[String]) -> Result<String> {
        let base = entry_key(self.clock.now_millis(), self.midnight);
        let key = free_key(base, |k| self.entries.contains_key(k));
        if key != base.to_string() {
            debug!(day = %self.date, base, key, "Bumped colliding entry key");
        }

        let mut data = Doc::new().with("text", text);
        let tags = super::canonical_tags(&Value::from(tags.to_vec()));
        if !tags.is_empty_list() {
            data = data.with("tags", tags);
        }

        let entry = Entry::attach(&mut self.doc, &key)?;
        let prefix = entry.prefix().to_path_buf();
        self.doc.read_with(&data, |doc, data| {
            doc.read_prop(&entry.text_path(), data.get("text"))?;
            doc.read_prop(&entry.tags_path(), data.get("tags"))?;
            Ok(())
        })?;
        self.entries.insert(key.clone(), entry);
        self.order.push(key.clone());

        let order = self.order_value();
        self.doc.batch(|doc| {
            doc.stage(prefix, data);
            doc.stage("order", order);
        });
        Ok(key)
    }

    /// Deletes an entry. The returned undo rewrites the entry's data and
    /// the order as they were before the delete.
    pub fn delete_entry(&mut self, key: &str) -> Result<Undo> {
        let entry = self
            .entries
            .get(key)
            .ok_or_else(|| ModelError::EntryNotFound { key: key.to_string() })?;
        let prior_entry = entry.to_doc(&self.doc);
        let prior_order = self.order_value();
        let prefix = entry.prefix().to_path_buf();
        entry.detach(&mut self.doc);
        self.entries.remove(key);
        self.order.retain(|k| k != key);

        let order = self.order_value();
        self.doc.batch(|doc| {
            doc.stage(prefix.clone(), Value::Delete);
            doc.stage("order", order);
        });

        let mut restore = Patch::new();
        restore.set(prefix, prior_entry).set("order", prior_order);
        let outbox = self.doc.outbox().clone();
        let reference = self.doc.reference().clone();
        Ok(Undo::new(format!("Deleted entry {key}"), move || {
            outbox.update(&reference, restore)
        }))
    }

    /// Moves an entry by `delta` positions, clamped to the ends. Returns
    /// false (and writes nothing) if the position does not change.
    pub fn move_entry(&mut self, key: &str, delta: i64) -> Result<bool> {
        let Some(from) = self.order.iter().position(|k| k == key) else {
            return Err(ModelError::EntryNotFound { key: key.to_string() }.into());
        };
        let last = self.order.len() as i64 - 1;
        let to = (from as i64).saturating_add(delta).clamp(0, last) as usize;
        if to == from {
            return Ok(false);
        }
        let moved = self.order.remove(from);
        self.order.insert(to, moved);
        let order = self.order_value();
        self.doc.stage("order", order);
        Ok(true)
    }

    /// Replaces an entry's text.
    pub fn set_text(&mut self, key: &str, text: &str) -> Result<bool> {
        let path = self.entry_ref(key)?.text_path();
        self.doc.assign(path.as_str(), Some(Value::from(text)))
    }

    /// Opens an edit session on one entry.
    pub fn start_edit(&mut self, key: &str) -> Result<()> {
        let prefix = self.entry_ref(key)?.prefix().to_path_buf();
        self.doc.start_edit_under(&prefix);
        Ok(())
    }

    pub fn set_text_draft(&mut self, key: &str, text: &str) -> Result<()> {
        let path = self.entry_ref(key)?.text_path();
        self.doc.set_draft(path.as_str(), text)
    }

    /// Replaces the tags draft (space separated).
    pub fn set_tags_draft(&mut self, key: &str, tags: &str) -> Result<()> {
        let path = self.entry_ref(key)?.tags_path();
        self.doc.set_draft(path.as_str(), tags)
    }

    /// Commits an entry's drafts as one update. An emptied text draft is
    /// discarded rather than blanking the entry.
    pub fn commit_edit(&mut self, key: &str) -> Result<()> {
        let entry = self.entry_ref(key)?;
        let (prefix, text_path) = (entry.prefix().to_path_buf(), entry.text_path());
        let blank = self
            .doc
            .prop(text_path.as_str())
            .and_then(|p| p.draft())
            .is_some_and(|draft| draft.as_text().is_some_and(|t| t.trim().is_empty()));
        if blank {
            self.doc.cancel_edit_under(&text_path);
        }
        self.doc.commit_edit_under(&prefix);
        Ok(())
    }

    pub fn cancel_edit(&mut self, key: &str) -> Result<()> {
        let prefix = self.entry_ref(key)?.prefix().to_path_buf();
        self.doc.cancel_edit_under(&prefix);
        Ok(())
    }

    fn entry_ref(&self, key: &str) -> Result<&Entry> {
        self.entries
            .get(key)
            .ok_or_else(|| ModelError::EntryNotFound { key: key.to_string() }.into())
    }

    fn order_value(&self) -> Value {
        Value::from(self.order.clone())
    }
}

/// The inbound half of a day: add new entries, prune deleted ones, repair
/// the order, read properties, and only then publish the new order.
fn reconcile(doc: &mut Document, entries: &mut BTreeMap<String, Entry>, order: &mut Vec<String>, data: &Doc) {
    let incoming = data.get_doc("entries");
    let data_keys: BTreeSet<String> = incoming
        .map(|map| map.keys().cloned().collect())
        .unwrap_or_default();

    for key in &data_keys {
        if entries.contains_key(key) {
            continue;
        }
        match Entry::attach(doc, key) {
            Ok(entry) => {
                entries.insert(key.clone(), entry);
            }
            Err(e) => warn!(day = %doc.reference(), "Skipping entry '{key}': {e}"),
        }
    }

    entries.retain(|key, entry| {
        let keep = data_keys.contains(key);
        if !keep {
            debug!(day = %doc.reference(), key, "Entry removed remotely");
            entry.detach(doc);
        }
        keep
    });

    let remote_order = data
        .get("order")
        .and_then(Value::as_text_list)
        .unwrap_or_default();
    let live_keys: BTreeSet<String> = entries.keys().cloned().collect();
    let repaired = repair_order(&remote_order, &live_keys);
    if repaired != remote_order {
        debug!(day = %doc.reference(), remote = ?remote_order, repaired = ?repaired, "Repaired entry order");
    }

    doc.read_props(data);
    for (key, entry) in entries.iter_mut() {
        entry.read_item(incoming.and_then(|map| map.get_doc(key)));
    }

    *order = repaired;
}

impl Drop for Journum {
    fn drop(&mut self) {
        self.close();
    }
}
