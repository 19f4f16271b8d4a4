//! Shared async handle to the one `PostStore`.
//!
//! The application builds a single `JournalClient` at startup and clones it
//! into every consumer. Store work runs on tokio's blocking pool behind a
//! mutex, so each read-modify-write cycle completes before the next starts.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::error::{JournalError, JournalResult};
use crate::form::MatchForm;
use crate::post_store::PostStore;
use crate::record::MatchRecord;
use crate::stats::ProfileStats;

#[derive(Clone)]
pub struct JournalClient {
    store: Arc<Mutex<PostStore>>,
}

impl JournalClient {
    pub fn new(store: PostStore) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
        }
    }

    async fn with_store<T, F>(&self, f: F) -> JournalResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PostStore) -> JournalResult<T> + Send + 'static,
    {
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || {
            let mut guard = store.lock();
            f(&mut guard)
        })
        .await
        .map_err(|e| JournalError::Other(anyhow::anyhow!("Journal task failed: {}", e)))?
    }

    /// All records in insertion order.
    pub async fn list(&self) -> JournalResult<Vec<MatchRecord>> {
        self.with_store(|store| Ok(store.records().to_vec())).await
    }

    pub async fn get(&self, id: Uuid) -> JournalResult<Option<MatchRecord>> {
        self.with_store(move |store| Ok(store.get(id).cloned())).await
    }

    /// Append an already built record.
    pub async fn add(&self, record: MatchRecord) -> JournalResult<()> {
        self.with_store(move |store| store.add(record)).await
    }

    /// Validate a create form and append the resulting record.
    ///
    /// # Errors
    /// `JournalError::Validation` leaves the journal untouched.
    pub async fn create(&self, form: MatchForm) -> JournalResult<MatchRecord> {
        let record = form.into_new_record(Utc::now())?;
        let added = record.clone();
        self.add(record).await?;
        tracing::info!("Recorded match against {}", added.opponent);
        Ok(added)
    }

    /// Validate an edit form and apply it to the record with `id`.
    ///
    /// Returns `None` when no record has that identifier.
    pub async fn edit(&self, id: Uuid, form: MatchForm) -> JournalResult<Option<MatchRecord>> {
        self.with_store(move |store| {
            let Some(existing) = store.get(id).cloned() else {
                return Ok(None);
            };
            let updated = form.apply_to(&existing)?;
            store.update(updated.clone())?;
            Ok(Some(updated))
        })
        .await
    }

    /// Replace the record sharing `record`'s identifier. `false` if none does.
    pub async fn update(&self, record: MatchRecord) -> JournalResult<bool> {
        self.with_store(move |store| store.update(record)).await
    }

    /// Remove the records at the given positions.
    pub async fn remove(&self, positions: BTreeSet<usize>) -> JournalResult<usize> {
        self.with_store(move |store| store.remove(&positions)).await
    }

    pub async fn stats(&self) -> JournalResult<ProfileStats> {
        self.with_store(|store| Ok(store.stats())).await
    }

    /// Why the stored journal was discarded at startup, if it was.
    pub async fn load_issue(&self) -> JournalResult<Option<String>> {
        self.with_store(|store| Ok(store.load_issue().map(str::to_string))).await
    }

    pub async fn len(&self) -> JournalResult<usize> {
        self.with_store(|store| Ok(store.len())).await
    }

    pub async fn is_empty(&self) -> JournalResult<bool> {
        self.with_store(|store| Ok(store.is_empty())).await
    }
}

impl std::fmt::Debug for JournalClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never wait on the store from a formatter
        match self.store.try_lock() {
            Some(store) => f.debug_tuple("JournalClient").field(&*store).finish(),
            None => f.debug_tuple("JournalClient").field(&"<busy>").finish(),
        }
    }
}
