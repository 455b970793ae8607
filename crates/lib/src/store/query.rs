//! Collection queries: field filters plus an optional sort field.

use std::cmp::Ordering;

use super::{CollectionRef, DocRef};
use crate::doc::{Doc, PathBuf, Value};

/// Comparison applied by a [`Filter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Gte,
    Lt,
}

/// A single `field <op> value` condition.
///
/// A document missing the field never matches. Range operators only match
/// values of the same type as the bound, so `completed >= "2024-01-01"`
/// skips documents whose `completed` is null.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub field: PathBuf,
    pub op: FilterOp,
    pub value: Value,
}

impl Filter {
    pub fn matches(&self, doc: &Doc) -> bool {
        let Some(actual) = doc.get(self.field.as_str()) else {
            return false;
        };
        match self.op {
            FilterOp::Eq => *actual == self.value,
            FilterOp::Gte | FilterOp::Lt => {
                if actual.type_name() != self.value.type_name() {
                    return false;
                }
                let ord = actual.query_cmp(&self.value);
                match self.op {
                    FilterOp::Gte => ord != Ordering::Less,
                    _ => ord == Ordering::Less,
                }
            }
        }
    }
}

/// A query over the documents directly inside one collection.
///
/// ```
/// use journo::{doc::Value, store::{CollectionRef, Query}};
///
/// let builds = CollectionRef::new("users/u1/build").unwrap();
/// let query = Query::new(builds)
///     .filter_eq("completed", Value::Null)
///     .order_by("created");
/// assert_eq!(query.filters().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    collection: CollectionRef,
    filters: Vec<Filter>,
    order_by: Option<PathBuf>,
}

impl Query {
    pub fn new(collection: CollectionRef) -> Self {
        Self {
            collection,
            filters: Vec::new(),
            order_by: None,
        }
    }

    pub fn filter_eq(self, field: impl Into<PathBuf>, value: impl Into<Value>) -> Self {
        self.filter(field, FilterOp::Eq, value)
    }

    pub fn filter_gte(self, field: impl Into<PathBuf>, value: impl Into<Value>) -> Self {
        self.filter(field, FilterOp::Gte, value)
    }

    pub fn filter_lt(self, field: impl Into<PathBuf>, value: impl Into<Value>) -> Self {
        self.filter(field, FilterOp::Lt, value)
    }

    fn filter(mut self, field: impl Into<PathBuf>, op: FilterOp, value: impl Into<Value>) -> Self {
        self.filters.push(Filter {
            field: field.into(),
            op,
            value: value.into(),
        });
        self
    }

    /// Sorts results ascending by `field`. Documents without the field are
    /// excluded from the results.
    pub fn order_by(mut self, field: impl Into<PathBuf>) -> Self {
        self.order_by = Some(field.into());
        self
    }

    pub fn collection(&self) -> &CollectionRef {
        &self.collection
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// Whether the document at `doc` with body `data` belongs in the results.
    pub fn matches(&self, doc: &DocRef, data: &Doc) -> bool {
        if !self.collection.contains(doc) {
            return false;
        }
        if let Some(field) = &self.order_by
            && !data.contains(field.as_str())
        {
            return false;
        }
        self.filters.iter().all(|filter| filter.matches(data))
    }

    /// Result order: the `order_by` field, then document id.
    pub fn compare(&self, a: (&DocRef, &Doc), b: (&DocRef, &Doc)) -> Ordering {
        if let Some(field) = &self.order_by {
            let ord = match (a.1.get(field.as_str()), b.1.get(field.as_str())) {
                (Some(x), Some(y)) => x.query_cmp(y),
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        a.0.id().cmp(b.0.id())
    }
}
