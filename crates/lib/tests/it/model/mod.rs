//! Model integration tests
//!
//! Documents and properties, query-backed item collections, and journal
//! day reconciliation, each driven through real store snapshots.

mod document;
mod items;
mod journum;
