//! The match collection and its durable mirror.
//!
//! Every mutation re-serializes the whole collection and writes it under a
//! single key. The new collection is only committed to memory once the write
//! has succeeded, so memory and storage never disagree.

use std::collections::BTreeSet;

use uuid::Uuid;

use crate::error::{JournalError, JournalResult};
use crate::kv_store::KeyValueStore;
use crate::record::MatchRecord;
use crate::stats::ProfileStats;

/// Key the journal blob is stored under unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "footballPosts";

/// Owner of the ordered match collection.
pub struct PostStore {
    kv: Box<dyn KeyValueStore>,
    key: String,
    records: Vec<MatchRecord>,
    load_issue: Option<String>,
}

impl PostStore {
    /// Open the store and hydrate it from `kv`.
    ///
    /// A blob that cannot be decoded is logged and replaced by an empty
    /// collection; the reason stays available through [`PostStore::load_issue`].
    ///
    /// # Errors
    /// Returns `JournalError::Storage` if the backend cannot be read.
    pub fn open(kv: Box<dyn KeyValueStore>, key: impl Into<String>) -> JournalResult<Self> {
        let mut store = Self {
            kv,
            key: key.into(),
            records: Vec::new(),
            load_issue: None,
        };

        match store.load() {
            Ok(records) => {
                tracing::info!("Loaded {} match records", records.len());
                store.records = records;
            }
            Err(JournalError::Decode(reason)) => {
                tracing::warn!(
                    "Stored journal under '{}' is unreadable, starting empty: {}",
                    store.key,
                    reason
                );
                store.load_issue = Some(reason);
            }
            Err(e) => return Err(e),
        }

        Ok(store)
    }

    /// Read and decode the stored collection.
    ///
    /// An absent blob is an empty journal.
    ///
    /// # Errors
    /// `JournalError::Decode` for a blob that isn't a JSON array of records,
    /// `JournalError::Storage` if the backend read fails.
    pub fn load(&self) -> JournalResult<Vec<MatchRecord>> {
        let Some(blob) = self.kv.get(&self.key)? else {
            return Ok(Vec::new());
        };

        serde_json::from_slice(&blob).map_err(|e| JournalError::decode(e.to_string()))
    }

    /// Serialize `records` and write them under the store key.
    ///
    /// # Errors
    /// `JournalError::Encode` or `JournalError::Storage`.
    pub fn save(&self, records: &[MatchRecord]) -> JournalResult<()> {
        let blob = serde_json::to_vec(records).map_err(|e| JournalError::Encode(e.to_string()))?;
        self.kv.set(&self.key, &blob)?;
        tracing::debug!("Saved {} match records", records.len());
        Ok(())
    }

    fn commit(&mut self, next: Vec<MatchRecord>) -> JournalResult<()> {
        self.save(&next)?;
        self.records = next;
        self.load_issue = None;
        Ok(())
    }

    /// Append a record and persist.
    ///
    /// # Errors
    /// Propagates save failures; the collection is left unchanged.
    pub fn add(&mut self, record: MatchRecord) -> JournalResult<()> {
        let mut next = self.records.clone();
        tracing::debug!("Adding match record {}", record.id());
        next.push(record);
        self.commit(next)
    }

    /// Remove the records at `positions` (indices in the current order) and persist.
    ///
    /// Returns the number of records removed. An empty set does nothing.
    ///
    /// # Errors
    /// `JournalError::InvalidPosition` if any position is out of range, in which
    /// case nothing is removed.
    pub fn remove(&mut self, positions: &BTreeSet<usize>) -> JournalResult<usize> {
        if positions.is_empty() {
            return Ok(0);
        }

        let len = self.records.len();
        if let Some(&position) = positions.iter().find(|&&p| p >= len) {
            return Err(JournalError::InvalidPosition { position, len });
        }

        let next: Vec<MatchRecord> = self
            .records
            .iter()
            .enumerate()
            .filter(|(i, _)| !positions.contains(i))
            .map(|(_, r)| r.clone())
            .collect();

        self.commit(next)?;
        tracing::debug!("Removed {} match records", positions.len());
        Ok(positions.len())
    }

    /// Replace the record with the same identifier, keeping its position.
    ///
    /// Returns `false` (and writes nothing) when no record has that identifier.
    ///
    /// # Errors
    /// Propagates save failures; the collection is left unchanged.
    pub fn update(&mut self, record: MatchRecord) -> JournalResult<bool> {
        let Some(index) = self.position_of(record.id()) else {
            tracing::debug!("Update ignored, no record with id {}", record.id());
            return Ok(false);
        };

        let mut next = self.records.clone();
        next[index] = record;
        self.commit(next)?;
        Ok(true)
    }

    /// All records in insertion order.
    pub fn records(&self) -> &[MatchRecord] {
        &self.records
    }

    pub fn get(&self, id: Uuid) -> Option<&MatchRecord> {
        self.records.iter().find(|r| r.id() == id)
    }

    pub fn position_of(&self, id: Uuid) -> Option<usize> {
        self.records.iter().position(|r| r.id() == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn stats(&self) -> ProfileStats {
        ProfileStats::from_records(&self.records)
    }

    /// Why the stored blob was discarded at open, if it was.
    pub fn load_issue(&self) -> Option<&str> {
        self.load_issue.as_deref()
    }

    pub fn storage_key(&self) -> &str {
        &self.key
    }
}

impl std::fmt::Debug for PostStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostStore")
            .field("key", &self.key)
            .field("records", &self.records.len())
            .field("load_issue", &self.load_issue)
            .finish()
    }
}
