//! Live watchers: turning stored changes into snapshots.

use std::{cmp::Ordering, collections::BTreeMap};

use tokio::sync::mpsc::UnboundedSender;
use tracing::trace;

use crate::{
    doc::Doc,
    store::{Change, DocRef, DocumentSnapshot, Query, QuerySnapshot},
};

/// A subscriber to a single document.
#[derive(Debug)]
pub(super) struct DocWatcher {
    doc: DocRef,
    tx: UnboundedSender<DocumentSnapshot>,
}

impl DocWatcher {
    pub(super) fn new(doc: DocRef, tx: UnboundedSender<DocumentSnapshot>) -> Self {
        Self { doc, tx }
    }

    pub(super) fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Sends the new state if `doc` is the watched document. Returns false
    /// once the subscriber has gone away.
    pub(super) fn notify(&self, doc: &DocRef, data: Option<&Doc>) -> bool {
        if *doc != self.doc {
            return !self.is_closed();
        }
        self.tx
            .send(DocumentSnapshot {
                reference: doc.clone(),
                data: data.cloned(),
            })
            .is_ok()
    }
}

/// A subscriber to a query, holding the result list as the subscriber last
/// saw it so every change can be expressed as an indexed delta.
#[derive(Debug)]
pub(super) struct QueryWatcher {
    query: Query,
    view: Vec<(DocRef, Doc)>,
    tx: UnboundedSender<QuerySnapshot>,
}

impl QueryWatcher {
    /// Builds the initial result list and sends it as one snapshot of
    /// additions. Returns `None` if the subscriber is already gone.
    pub(super) fn open(
        query: Query,
        documents: &BTreeMap<DocRef, Doc>,
        tx: UnboundedSender<QuerySnapshot>,
    ) -> Option<Self> {
        let mut view: Vec<(DocRef, Doc)> = documents
            .iter()
            .filter(|(doc, data)| query.matches(doc, data))
            .map(|(doc, data)| (doc.clone(), data.clone()))
            .collect();
        view.sort_by(|a, b| query.compare((&a.0, &a.1), (&b.0, &b.1)));
        let changes = view
            .iter()
            .enumerate()
            .map(|(index, (doc, data))| Change::added(doc.clone(), data.clone(), index))
            .collect();
        tx.send(QuerySnapshot::new(changes)).ok()?;
        Some(Self { query, view, tx })
    }

    pub(super) fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Folds one document change into the view and sends the resulting
    /// delta, if any. Returns false once the subscriber has gone away.
    pub(super) fn notify(&mut self, doc: &DocRef, data: Option<&Doc>) -> bool {
        match self.diff(doc, data) {
            Some(change) => {
                trace!(doc = %doc, kind = ?change.kind, "query delta");
                self.tx.send(QuerySnapshot::new(vec![change])).is_ok()
            }
            None => !self.is_closed(),
        }
    }

    fn diff(&mut self, doc: &DocRef, data: Option<&Doc>) -> Option<Change> {
        let old = self.view.iter().position(|(r, _)| r == doc);
        let matching = data.filter(|data| self.query.matches(doc, data));
        match (old, matching) {
            (None, None) => None,
            (Some(index), None) => {
                let (reference, last) = self.view.remove(index);
                Some(Change::removed(reference, last, index))
            }
            (None, Some(data)) => {
                let index = self.insertion_index(doc, data);
                self.view.insert(index, (doc.clone(), data.clone()));
                Some(Change::added(doc.clone(), data.clone(), index))
            }
            (Some(old_index), Some(data)) => {
                if self.view[old_index].1 == *data {
                    return None;
                }
                self.view.remove(old_index);
                let new_index = self.insertion_index(doc, data);
                self.view.insert(new_index, (doc.clone(), data.clone()));
                Some(Change::modified(doc.clone(), data.clone(), old_index, new_index))
            }
        }
    }

    fn insertion_index(&self, doc: &DocRef, data: &Doc) -> usize {
        self.view.partition_point(|(r, d)| {
            self.query.compare((r, d), (doc, data)) == Ordering::Less
        })
    }
}
