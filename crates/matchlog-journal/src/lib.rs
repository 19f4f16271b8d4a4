//! Match journal storage for Matchlog.
//!
//! `PostStore` owns the ordered list of `MatchRecord`s and mirrors it, as a
//! single JSON blob, into a `KeyValueStore`. `JournalClient` is the shared
//! handle the rest of the application talks to.

pub mod client;
pub mod error;
pub mod form;
pub mod kv_store;
pub mod post_store;
pub mod record;
pub mod stats;

pub use client::JournalClient;
pub use error::{JournalError, JournalResult, ValidationError};
pub use form::{MatchForm, ValidatedForm};
pub use kv_store::{KeyValueStore, SqliteKvStore};
pub use post_store::{PostStore, DEFAULT_STORAGE_KEY};
pub use record::{Coordinate, MatchRecord};
pub use stats::ProfileStats;
