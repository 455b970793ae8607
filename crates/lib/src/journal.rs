//! Navigation over a user's journal days.

use std::sync::Arc;

use tracing::{debug, info};

use crate::{
    Clock, Result, Stamp,
    doc::{Doc, Value},
    model::Journum,
    store::{CollectionRef, DocRef, DocumentStore},
    sync::Outbox,
};

/// The day currently open in a user's journal.
///
/// Exactly one [`Journum`] is live at a time: moving to another date
/// closes the current day's subscription before the next day loads.
#[derive(Debug)]
pub struct JournalCursor {
    collection: CollectionRef,
    store: Arc<dyn DocumentStore>,
    outbox: Outbox,
    clock: Arc<dyn Clock>,
    current: Option<Journum>,
}

impl JournalCursor {
    /// Opens the cursor on `date`.
    pub async fn open(
        collection: CollectionRef,
        store: Arc<dyn DocumentStore>,
        outbox: Outbox,
        clock: Arc<dyn Clock>,
        date: Stamp,
    ) -> Result<Self> {
        let mut cursor = Self {
            collection,
            store,
            outbox,
            clock,
            current: None,
        };
        cursor.set_date(date).await?;
        Ok(cursor)
    }

    /// The open day's date.
    pub fn date(&self) -> Option<Stamp> {
        self.current.as_ref().map(Journum::date)
    }

    pub fn current(&self) -> Option<&Journum> {
        self.current.as_ref()
    }

    pub fn current_mut(&mut self) -> Option<&mut Journum> {
        self.current.as_mut()
    }

    /// Switches to `date`, creating the day document if it does not exist.
    pub async fn set_date(&mut self, date: Stamp) -> Result<()> {
        self.close();
        let journum = load_journum(
            &self.collection,
            &self.store,
            &self.outbox,
            &self.clock,
            date,
        )
        .await?;
        self.current = Some(journum);
        Ok(())
    }

    /// Moves `days` forward (or back, if negative) from the open day.
    pub async fn roll_date(&mut self, days: i64) -> Result<()> {
        let from = self.date().unwrap_or_else(|| self.clock.today());
        self.set_date(from.add_days(days)).await
    }

    pub async fn go_today(&mut self) -> Result<()> {
        let today = self.clock.today();
        self.set_date(today).await
    }

    /// Closes the open day, if any.
    pub fn close(&mut self) {
        if let Some(mut journum) = self.current.take() {
            journum.close();
        }
    }
}

/// Loads a day and subscribes to it. A missing day document is created
/// (and the creation awaited) before the day is opened.
pub async fn load_journum(
    collection: &CollectionRef,
    store: &Arc<dyn DocumentStore>,
    outbox: &Outbox,
    clock: &Arc<dyn Clock>,
    date: Stamp,
) -> Result<Journum> {
    let reference: DocRef = collection.doc(&date.to_string());
    let snapshot = store.get(&reference).await?;
    let data = match snapshot.data {
        Some(data) => data,
        None => {
            let data = Doc::new()
                .with("date", date.to_string())
                .with("entries", Doc::new())
                .with("order", Value::List(Vec::new()));
            store.set(&reference, data.clone()).await?;
            info!(day = %reference, "Created journal day");
            data
        }
    };
    let mut journum = Journum::open(reference.clone(), &data, outbox.clone(), clock.clone())?;
    journum.attach(store.watch_document(&reference));
    // the first snapshot repeats what was just read
    journum.sync()?;
    debug!(day = %reference, entries = journum.len(), "Opened journal day");
    Ok(journum)
}
