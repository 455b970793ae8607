//! Live, query-backed collections of items.

use std::{cmp::Ordering, collections::BTreeMap, sync::Arc};

use tracing::{debug, warn};

use super::{Capability, Item, ItemKind, ModelError};
use crate::{
    Clock, Result, Stamp,
    doc::{Doc, Value},
    store::{
        ChangeKind, CollectionRef, DocRef, DocumentStore, Query, QuerySnapshot, Subscription,
    },
    sync::{Outbox, Undo},
};

/// Which items of a kind a collection shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemsQuery {
    /// `completed == null`, oldest first.
    Incomplete,
    /// Completed during the given year.
    CompletedIn(i32),
}

impl ItemsQuery {
    pub fn to_query(self, collection: &CollectionRef) -> Query {
        let query = Query::new(collection.clone());
        match self {
            ItemsQuery::Incomplete => query.filter_eq("completed", Value::Null).order_by("created"),
            ItemsQuery::CompletedIn(year) => {
                let bound = |y: i32| {
                    Stamp::year_start(y)
                        .map(|s| Value::from(s.to_string()))
                        .unwrap_or(Value::Null)
                };
                query
                    .filter_gte("completed", bound(year))
                    .filter_lt("completed", bound(year + 1))
                    .order_by("completed")
            }
        }
    }

    /// The display order that goes with this query.
    pub fn comparator(self) -> ItemComparator {
        match self {
            ItemsQuery::Incomplete => by_created,
            ItemsQuery::CompletedIn(_) => by_completed_desc,
        }
    }
}

/// Display order for [`Items::sorted_items`].
pub type ItemComparator = fn(&Item, &Item) -> Ordering;

/// Oldest first, then by id.
pub fn by_created(a: &Item, b: &Item) -> Ordering {
    a.created()
        .cmp(&b.created())
        .then_with(|| a.id().cmp(b.id()))
}

/// Most recently completed first, then oldest created.
pub fn by_completed_desc(a: &Item, b: &Item) -> Ordering {
    b.completed()
        .cmp(&a.completed())
        .then_with(|| by_created(a, b))
}

/// Handle to one kind's collection for a user.
#[derive(Debug, Clone)]
pub struct ItemCollection {
    kind: ItemKind,
    collection: CollectionRef,
    store: Arc<dyn DocumentStore>,
    outbox: Outbox,
    clock: Arc<dyn Clock>,
}

impl ItemCollection {
    pub fn new(
        kind: ItemKind,
        collection: CollectionRef,
        store: Arc<dyn DocumentStore>,
        outbox: Outbox,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            kind,
            collection,
            store,
            outbox,
            clock,
        }
    }

    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    pub fn collection(&self) -> &CollectionRef {
        &self.collection
    }

    /// Creates an item whose main text is `text`.
    ///
    /// The new document carries a server-stamped `created` and an explicit
    /// null `completed`, so it shows up in incomplete queries right away.
    pub async fn create(&self, text: &str) -> Result<DocRef> {
        let descriptor = self.kind.descriptor();
        let data = Doc::new()
            .with("created", Value::ServerTimestamp)
            .with("completed", Value::Null)
            .with(descriptor.title_field, text);
        let reference = self.store.add(&self.collection, data).await?;
        debug!(doc = %reference, kind = %self.kind, "Created item");
        Ok(reference)
    }

    /// Opens a live view of the items matching `query`.
    pub fn items(&self, query: ItemsQuery) -> Items {
        Items::open(self.clone(), query)
    }
}

/// Incomplete items split for display.
#[derive(Debug, Default)]
pub struct Partitions<'a> {
    /// Items with a `started` stamp (startable kinds only).
    pub started: Vec<&'a Item>,
    pub pending: Vec<&'a Item>,
}

/// A live, sorted view of the items matching one query.
///
/// Starts out pending. Each snapshot's added, modified and removed deltas
/// are applied at their indices, so `items()` is in store delivery order;
/// use [`sorted_items`](Items::sorted_items) for display.
#[derive(Debug)]
pub struct Items {
    source: ItemCollection,
    query: ItemsQuery,
    pending: bool,
    items: Vec<Item>,
    comparator: ItemComparator,
    subscription: Option<Subscription<QuerySnapshot>>,
}

impl Items {
    fn open(source: ItemCollection, query: ItemsQuery) -> Self {
        let subscription = source
            .store
            .watch_query(&query.to_query(&source.collection));
        Self {
            source,
            query,
            pending: true,
            items: Vec::new(),
            comparator: query.comparator(),
            subscription: Some(subscription),
        }
    }

    pub fn with_comparator(mut self, comparator: ItemComparator) -> Self {
        self.comparator = comparator;
        self
    }

    pub fn kind(&self) -> ItemKind {
        self.source.kind
    }

    pub fn query(&self) -> ItemsQuery {
        self.query
    }

    /// True until the first snapshot has been applied.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn is_closed(&self) -> bool {
        self.subscription.is_none()
    }

    /// Items in delivery order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn item_mut(&mut self, id: &str) -> Option<&mut Item> {
        self.items.iter_mut().find(|item| item.id() == id)
    }

    /// Items in display order.
    pub fn sorted_items(&self) -> Vec<&Item> {
        let mut sorted: Vec<&Item> = self.items.iter().collect();
        sorted.sort_by(|a, b| (self.comparator)(a, b));
        sorted
    }

    /// Items matching a search, in display order.
    pub fn search(&self, seek: &str) -> Vec<&Item> {
        self.sorted_items()
            .into_iter()
            .filter(|item| item.matches(seek))
            .collect()
    }

    /// Applies one snapshot. Does nothing once closed.
    pub fn apply(&mut self, snapshot: QuerySnapshot) {
        if self.is_closed() {
            return;
        }
        for change in snapshot.changes {
            match change.kind {
                ChangeKind::Added => {
                    let now = self.source.clock.now_millis();
                    let item = Item::new(
                        self.source.kind,
                        change.reference,
                        &change.data,
                        self.source.outbox.clone(),
                        now,
                    );
                    let index = change.new_index.unwrap_or(self.items.len()).min(self.items.len());
                    self.items.insert(index, item);
                }
                ChangeKind::Modified => {
                    let Some(old) = self.locate(change.old_index, &change.reference) else {
                        warn!(doc = %change.reference, "Modified item not in collection");
                        continue;
                    };
                    self.items[old].read(&change.data);
                    if let Some(new) = change.new_index
                        && new != old
                        && new < self.items.len()
                    {
                        let item = self.items.remove(old);
                        self.items.insert(new, item);
                    }
                }
                ChangeKind::Removed => match self.locate(change.old_index, &change.reference) {
                    Some(index) => {
                        self.items.remove(index);
                    }
                    None => warn!(doc = %change.reference, "Removed item not in collection"),
                },
            }
        }
        if self.pending {
            self.pending = false;
            debug!(kind = %self.source.kind, count = self.items.len(), "Items loaded");
        }
    }

    /// Position of `reference`, trusting `index` when it agrees.
    fn locate(&self, index: Option<usize>, reference: &DocRef) -> Option<usize> {
        match index {
            Some(i) if self.items.get(i).is_some_and(|item| item.reference() == reference) => {
                Some(i)
            }
            _ => self.items.iter().position(|item| item.reference() == reference),
        }
    }

    /// Applies every snapshot that has already arrived. Returns how many
    /// were applied.
    pub fn sync(&mut self) -> usize {
        let mut applied = 0;
        while let Some(snapshot) = self.subscription.as_mut().and_then(Subscription::try_next) {
            self.apply(snapshot);
            applied += 1;
        }
        applied
    }

    /// Waits for the next snapshot and applies it. Returns false once the
    /// collection is closed or the stream has ended.
    pub async fn next(&mut self) -> bool {
        let Some(subscription) = self.subscription.as_mut() else {
            return false;
        };
        match subscription.next().await {
            Some(snapshot) => {
                self.apply(snapshot);
                true
            }
            None => false,
        }
    }

    /// Switches to a different query. The old subscription is closed before
    /// the new one opens.
    pub fn set_query(&mut self, query: ItemsQuery) {
        self.close();
        self.query = query;
        self.comparator = query.comparator();
        self.pending = true;
        self.items.clear();
        self.subscription = Some(
            self.source
                .store
                .watch_query(&query.to_query(&self.source.collection)),
        );
    }

    /// Unsubscribes. Safe to call more than once.
    pub fn close(&mut self) {
        self.subscription.take();
    }

    /// Creates an item; failures are logged and yield `None`.
    pub async fn add_item(&self, text: &str) -> Option<DocRef> {
        match self.source.create(text).await {
            Ok(reference) => Some(reference),
            Err(e) => {
                warn!(kind = %self.source.kind, "Failed to create item (text: {text}): {e}");
                None
            }
        }
    }

    /// Deletes an item remotely. The returned undo re-creates the whole
    /// document as it was.
    pub fn delete_item(&self, id: &str) -> Result<Undo> {
        let item = self.item(id).ok_or_else(|| ModelError::ItemNotFound { id: id.to_string() })?;
        let reference = item.reference().clone();
        let prior = item.to_doc();
        let outbox = self.source.outbox.clone();
        outbox.delete(&reference);
        let label = format!("Deleted '{}'", item.title());
        Ok(Undo::new(label, move || outbox.set(&reference, prior)))
    }

    /// Splits items into started and pending. Kinds that cannot be started
    /// put everything in pending.
    pub fn partitions(&self) -> Partitions<'_> {
        let startable = self.source.kind.has(Capability::Startable);
        let mut parts = Partitions::default();
        for item in self.sorted_items() {
            if item.is_completed() {
                continue;
            }
            if startable && item.is_started() {
                parts.started.push(item);
            } else {
                parts.pending.push(item);
            }
        }
        parts
    }

    /// Completed items grouped by the year of their `completed` stamp,
    /// newest year first when iterated in reverse.
    pub fn history_by_year(&self) -> BTreeMap<i32, Vec<&Item>> {
        let mut years: BTreeMap<i32, Vec<&Item>> = BTreeMap::new();
        for item in self.sorted_items() {
            let Some(completed) = item.completed() else {
                continue;
            };
            match completed.split('-').next().and_then(|y| y.parse().ok()) {
                Some(year) => years.entry(year).or_default().push(item),
                None => debug!(item = item.id(), "Skipping unparsable completion stamp {completed}"),
            }
        }
        years
    }
}
