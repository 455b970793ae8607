//! The synced object model.
//!
//! [`Property`] holds one field's live and draft value. [`Document`] owns a
//! set of properties and publishes their local changes as merge-patches.
//! [`Item`] and [`Journum`] are documents with domain structure: items come
//! from per-kind descriptors and are gathered into live [`Items`] queries,
//! while a journum reconciles its map of entries against a synced order.

mod document;
mod errors;
mod item;
mod items;
mod journum;
mod kind;
mod property;

pub use document::Document;
pub use errors::ModelError;
pub use item::Item;
pub use items::{
    ItemCollection, ItemComparator, Items, ItemsQuery, Partitions, by_completed_desc, by_created,
};
pub use journum::{Entry, EntryView, Journum, compare_keys, entry_key, free_key, repair_order};
pub use kind::{
    Capability, FieldDefault, FieldSpec, HEAR_TYPES, ItemKind, KindDescriptor, PLATFORMS, RATINGS,
    READ_TYPES, WATCH_TYPES,
};
pub use property::{Property, PropertyKind, canonical_tags};
