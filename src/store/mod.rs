//! Persistent record store for the file inventory.
//!
//! Split into two components:
//!
//! * [`database`]: SQLite persistence, schema management, batched writes,
//!   and the grouping/statistics queries.
//! * [`record`]: the [`FileRecord`] data model.
//!
//! # Staleness
//!
//! A record is trusted for content identity when its `(size, modified_at)`
//! pair matches the filesystem's current values; the comparison itself lives
//! in [`crate::policy`], which this module never calls.

pub mod database;
pub mod record;

pub use database::{DigestGroup, RecordStore, StoreError, StoreStats, DEFAULT_FLUSH_EVERY};
pub use record::{unix_time, FileRecord};
