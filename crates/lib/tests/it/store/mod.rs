//! Document store integration tests
//!
//! Covers the MemoryStore through the `DocumentStore` trait: merge-patch
//! writes, document and query subscriptions, and JSON persistence.

mod persistence;
mod subscriptions;
