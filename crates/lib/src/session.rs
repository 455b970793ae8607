//! Everything scoped to one logged in user.
//!
//! A [`Session`] owns the outbound write path for the user and hands out the
//! journal and per-kind item collections. Logging out flushes pending writes
//! and drops every handle, which unsubscribes all live views built from it.

use std::sync::Arc;

use tracing::info;

use crate::{
    Clock, Result, Stamp,
    journal::JournalCursor,
    model::{ItemCollection, ItemKind, Items, ItemsQuery},
    notice::NoticeQueue,
    store::{CollectionRef, DocRef, DocumentStore},
    sync::{BackgroundWriter, Outbox},
};

/// Root collection that holds one document per user.
pub const DEFAULT_ROOT: &str = "users";

/// Collection id of a user's journal days.
pub const JOURNAL_COLLECTION: &str = "journal";

/// Who is logged in and where their data lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub user_id: String,
    pub root: String,
}

impl SessionConfig {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            root: DEFAULT_ROOT.to_string(),
        }
    }

    pub fn with_root(mut self, root: impl Into<String>) -> Self {
        self.root = root.into();
        self
    }
}

/// A logged in user.
#[derive(Debug)]
pub struct Session {
    user: DocRef,
    store: Arc<dyn DocumentStore>,
    outbox: Outbox,
    clock: Arc<dyn Clock>,
    notices: NoticeQueue,
}

impl Session {
    /// Starts a session and its background writer.
    ///
    /// Fails if the user id cannot name a document under the root (empty,
    /// or containing `/`).
    pub fn login(config: SessionConfig, store: Arc<dyn DocumentStore>, clock: Arc<dyn Clock>) -> Result<Self> {
        let user = DocRef::new(format!("{}/{}", config.root, config.user_id))?;
        let outbox = BackgroundWriter::start(store.clone());
        info!(user = %config.user_id, "Logged in");
        Ok(Self {
            user,
            store,
            outbox,
            clock,
            notices: NoticeQueue::new(),
        })
    }

    pub fn user_id(&self) -> &str {
        self.user.id()
    }

    /// The user's document (`<root>/<user id>`).
    pub fn user(&self) -> &DocRef {
        &self.user
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    pub fn outbox(&self) -> &Outbox {
        &self.outbox
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn notices(&self) -> &NoticeQueue {
        &self.notices
    }

    pub fn notices_mut(&mut self) -> &mut NoticeQueue {
        &mut self.notices
    }

    pub fn journal_collection(&self) -> CollectionRef {
        self.user.collection(JOURNAL_COLLECTION)
    }

    /// Handle to the user's collection of `kind` items.
    pub fn collection(&self, kind: ItemKind) -> ItemCollection {
        ItemCollection::new(
            kind,
            self.user.collection(kind.name()),
            self.store.clone(),
            self.outbox.clone(),
            self.clock.clone(),
        )
    }

    /// Opens a live view of `kind` items.
    pub fn items(&self, kind: ItemKind, query: ItemsQuery) -> Items {
        self.collection(kind).items(query)
    }

    /// Opens the journal on `date`, creating the day if needed.
    pub async fn journal(&self, date: Stamp) -> Result<JournalCursor> {
        JournalCursor::open(
            self.journal_collection(),
            self.store.clone(),
            self.outbox.clone(),
            self.clock.clone(),
            date,
        )
        .await
    }

    /// Opens the journal on the current local day.
    pub async fn today(&self) -> Result<JournalCursor> {
        self.journal(self.clock.today()).await
    }

    /// Waits for every queued write to be applied.
    pub async fn flush(&self) {
        self.outbox.flush().await;
    }

    /// Flushes pending writes and ends the session. Queued notices (and
    /// their undos) are discarded.
    pub async fn logout(self) {
        self.outbox.flush().await;
        info!(user = %self.user.id(), dropped_notices = self.notices.len(), "Logged out");
    }
}
