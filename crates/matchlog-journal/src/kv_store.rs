//! Durable key-value storage.
//!
//! The journal keeps its whole collection under one key, so the backend only
//! needs whole-value get/set. `SqliteKvStore` is the on-disk implementation.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

use crate::error::JournalResult;

/// Whole-value key-value storage.
///
/// Implementations don't need to be Sync; `JournalClient` serializes access
/// through a mutex.
pub trait KeyValueStore: Send {
    /// Read the value stored under `key`, `None` if the key was never set.
    fn get(&self, key: &str) -> JournalResult<Option<Vec<u8>>>;

    /// Store `value` under `key`, replacing any prior value.
    fn set(&self, key: &str, value: &[u8]) -> JournalResult<()>;

    /// Delete `key`. Deleting a missing key is not an error.
    fn remove(&self, key: &str) -> JournalResult<()>;
}

/// SQLite-backed key-value table.
pub struct SqliteKvStore {
    conn: Connection,
}

impl SqliteKvStore {
    /// Open (or create) the store at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory store (for tests and throwaway sessions).
    pub fn in_memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> anyhow::Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value BLOB NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    /// Number of keys currently stored.
    pub fn count(&self) -> JournalResult<usize> {
        let count: i64 = self.conn.query_row("SELECT COUNT(*) FROM kv", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

impl KeyValueStore for SqliteKvStore {
    fn get(&self, key: &str) -> JournalResult<Option<Vec<u8>>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, Vec<u8>>(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &[u8]) -> JournalResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        tracing::debug!("Stored {} bytes under key {}", value.len(), key);
        Ok(())
    }

    fn remove(&self, key: &str) -> JournalResult<()> {
        self.conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;

    fn create_test_store() -> SqliteKvStore {
        SqliteKvStore::in_memory().expect("Failed to create in-memory store")
    }

    #[test]
    fn test_get_missing_key() {
        let store = create_test_store();
        assert_eq!(store.get("footballPosts").unwrap(), None);
    }

    #[test]
    fn test_set_then_get() {
        let store = create_test_store();
        store.set("footballPosts", b"[]").unwrap();
        assert_eq!(store.get("footballPosts").unwrap().as_deref(), Some(&b"[]"[..]));
    }

    #[test]
    fn test_set_replaces_prior_value() {
        let store = create_test_store();
        store.set("k", b"first").unwrap();
        store.set("k", b"second").unwrap();

        assert_eq!(store.get("k").unwrap().as_deref(), Some(&b"second"[..]));
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_remove() {
        let store = create_test_store();
        store.set("k", b"v").unwrap();
        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);

        // Removing again is fine
        store.remove("k").unwrap();
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("journal.db");

        {
            let store = SqliteKvStore::open(&path).unwrap();
            store.set("k", b"kept").unwrap();
        }

        let reopened = SqliteKvStore::open(&path).unwrap();
        assert_eq!(reopened.get("k").unwrap().as_deref(), Some(&b"kept"[..]));
    }
}
