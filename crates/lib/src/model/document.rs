//! The base of every synced entity: one remote document, many properties.

use tracing::{debug, trace};

use super::{ModelError, Property, PropertyKind};
use crate::{
    Result,
    doc::{Doc, Patch, Path, PathBuf, Value},
    store::DocRef,
    sync::Outbox,
};

/// An in-memory mirror of one remote document.
///
/// Owns a set of [`Property`]s and is their single subscriber: whenever a
/// property's live value changes locally, the document queues a merge-patch
/// `{ <dotted name>: <value or delete> }` on its [`Outbox`]. While an
/// inbound read is being applied the outbound gate is closed, so nothing a
/// remote snapshot causes is ever echoed back.
#[derive(Debug)]
pub struct Document {
    reference: DocRef,
    props: Vec<Property>,
    suppress_outbound: bool,
    outbox: Outbox,
    batch: Option<Patch>,
}

impl Document {
    pub fn new(reference: DocRef, outbox: Outbox) -> Self {
        Self {
            reference,
            props: Vec::new(),
            suppress_outbound: false,
            outbox,
            batch: None,
        }
    }

    pub fn reference(&self) -> &DocRef {
        &self.reference
    }

    pub fn outbox(&self) -> &Outbox {
        &self.outbox
    }

    /// Whether outbound writes are currently suppressed.
    pub fn is_reading(&self) -> bool {
        self.suppress_outbound
    }

    /// Registers a new property.
    pub fn new_prop(&mut self, name: impl Into<PathBuf>, kind: PropertyKind, default: Option<Value>) {
        self.add_prop(Property::new(name, kind, default));
    }

    /// Registers a property, replacing any existing one with the same name.
    pub fn add_prop(&mut self, prop: Property) {
        match self.props.iter_mut().find(|p| p.name() == prop.name()) {
            Some(existing) => *existing = prop,
            None => self.props.push(prop),
        }
    }

    /// Unregisters a property so it no longer reads or publishes.
    pub fn remove_prop(&mut self, name: &Path) -> Option<Property> {
        let index = self.props.iter().position(|p| **p.name() == *name)?;
        Some(self.props.remove(index))
    }

    /// Unregisters every property at or below `prefix`. Returns how many
    /// were removed.
    pub fn remove_props_under(&mut self, prefix: &Path) -> usize {
        let before = self.props.len();
        self.props.retain(|p| !p.name().starts_with(prefix));
        before - self.props.len()
    }

    pub fn prop(&self, name: impl AsRef<str>) -> Option<&Property> {
        let name = PathBuf::normalize(name.as_ref());
        self.props.iter().find(|p| *p.name() == name)
    }

    fn prop_mut(&mut self, name: &str) -> Result<&mut Property> {
        let name = PathBuf::normalize(name);
        match self.props.iter_mut().find(|p| *p.name() == name) {
            Some(prop) => Ok(prop),
            None => Err(ModelError::UnknownProperty {
                doc: self.reference.to_string(),
                name: name.to_string(),
            }
            .into()),
        }
    }

    pub fn props(&self) -> impl Iterator<Item = &Property> {
        self.props.iter()
    }

    /// Live value of the named property.
    pub fn value(&self, name: impl AsRef<str>) -> Option<&Value> {
        self.prop(name)?.value()
    }

    /// Applies an inbound read: every property reads its own field.
    pub fn read(&mut self, data: &Doc) {
        self.suppress_outbound = true;
        self.read_props(data);
        self.suppress_outbound = false;
    }

    /// Applies an inbound read with entity-specific reconciliation.
    ///
    /// `reconcile` runs with outbound writes suppressed and is responsible
    /// for calling [`read_props`](Self::read_props) at the right point. The
    /// gate reopens even if `reconcile` fails.
    pub fn read_with<R>(
        &mut self,
        data: &Doc,
        reconcile: impl FnOnce(&mut Self, &Doc) -> Result<R>,
    ) -> Result<R> {
        self.suppress_outbound = true;
        let result = reconcile(self, data);
        self.suppress_outbound = false;
        result
    }

    /// Has each property read its own field from `data`.
    pub fn read_props(&mut self, data: &Doc) {
        for prop in &mut self.props {
            if prop.read_from(data) {
                trace!(prop = %prop.name(), "Read changed property");
            }
        }
    }

    /// Reads one property from a raw value without publishing.
    pub fn read_prop(&mut self, name: impl AsRef<str>, raw: Option<&Value>) -> Result<bool> {
        let prop = self.prop_mut(name.as_ref())?;
        Ok(prop.read(raw))
    }

    /// Locally assigns a property's live value and publishes the change.
    /// Returns whether the value changed.
    pub fn assign(&mut self, name: impl AsRef<str>, value: Option<Value>) -> Result<bool> {
        let prop = self.prop_mut(name.as_ref())?;
        let path = prop.name().clone();
        match prop.assign(value) {
            Some(outbound) => {
                self.publish(path, outbound);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Replaces the draft of one property.
    pub fn set_draft(&mut self, name: impl AsRef<str>, value: impl Into<Value>) -> Result<()> {
        self.prop_mut(name.as_ref())?.set_draft(value);
        Ok(())
    }

    /// Publishes a raw field write that has no property behind it.
    pub fn stage(&mut self, path: impl Into<PathBuf>, value: impl Into<Value>) {
        self.publish(path.into(), value.into());
    }

    pub fn start_edit(&mut self) {
        for prop in &mut self.props {
            prop.start_edit();
        }
    }

    pub fn cancel_edit(&mut self) {
        for prop in &mut self.props {
            prop.cancel_edit();
        }
    }

    /// Commits every open draft. All resulting writes go out as one patch.
    pub fn commit_edit(&mut self) {
        self.commit_where(|_| true);
    }

    /// Starts an edit on the properties whose name is under `prefix`.
    pub fn start_edit_under(&mut self, prefix: &Path) {
        for prop in self.props.iter_mut().filter(|p| p.name().starts_with(prefix)) {
            prop.start_edit();
        }
    }

    pub fn cancel_edit_under(&mut self, prefix: &Path) {
        for prop in self.props.iter_mut().filter(|p| p.name().starts_with(prefix)) {
            prop.cancel_edit();
        }
    }

    /// Commits the drafts of the properties under `prefix` as one patch.
    pub fn commit_edit_under(&mut self, prefix: &Path) {
        self.commit_where(|p| p.name().starts_with(prefix));
    }

    fn commit_where(&mut self, selected: impl Fn(&Property) -> bool) {
        let changes: Vec<(PathBuf, Value)> = self
            .props
            .iter_mut()
            .filter(|p| selected(p))
            .filter_map(|p| {
                let path = p.name().clone();
                p.commit_edit().map(|value| (path, value))
            })
            .collect();
        self.batch(|doc| {
            for (path, value) in changes {
                doc.publish(path, value);
            }
        });
    }

    /// Runs `f` collecting every publication into a single update.
    ///
    /// Nested batches fold into the outermost one.
    pub fn batch<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        if self.batch.is_some() {
            return f(self);
        }
        self.batch = Some(Patch::new());
        let result = f(self);
        if let Some(patch) = self.batch.take()
            && !patch.is_empty()
        {
            self.outbox.update(&self.reference, patch);
        }
        result
    }

    fn publish(&mut self, path: PathBuf, value: Value) {
        if self.suppress_outbound {
            trace!(doc = %self.reference, field = %path, "Suppressed write during read");
            return;
        }
        match &mut self.batch {
            Some(patch) => {
                patch.set(path, value);
            }
            None => {
                debug!(doc = %self.reference, field = %path, "Syncing field");
                self.outbox.update(&self.reference, Patch::single(path, value));
            }
        }
    }
}
