//! SQLite-backed record store.
//!
//! # Overview
//!
//! [`RecordStore`] persists [`FileRecord`]s in a single SQLite database with
//! a unique index on `path` (the primary key) and a non-unique index on
//! `digest` for duplicate grouping.
//!
//! # Durability
//!
//! Writes are batched: `upsert` accumulates records in memory and commits
//! them in one transaction every `flush_every` records (and on an explicit
//! [`RecordStore::flush`]). A crash loses at most the unflushed batch; those
//! files are simply re-hashed on the next run because no record exists for
//! them yet. `get` consults the pending batch first, so a record is visible
//! to the writer immediately after `upsert`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension};

use super::record::FileRecord;

/// Default number of pending records before an automatic flush.
pub const DEFAULT_FLUSH_EVERY: usize = 512;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS files (
    path        TEXT PRIMARY KEY,
    digest      TEXT NOT NULL,
    size        INTEGER NOT NULL,
    modified_at REAL NOT NULL,
    recorded_at REAL NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_files_digest ON files(digest);
";

/// Errors raised by the record store.
///
/// These are fatal: every scan decision depends on the store, so callers
/// abort the run rather than recover locally.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    /// The database could not be opened or initialized.
    #[error("Failed to open record store at {path}: {source}")]
    Open {
        /// Location of the database file
        path: PathBuf,
        /// The underlying SQLite error
        #[source]
        source: rusqlite::Error,
    },

    /// A query or write against the open database failed.
    #[error("Record store operation failed: {0}")]
    Sql(#[from] rusqlite::Error),
}

/// A group of paths sharing one content digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestGroup {
    /// The shared digest (hex)
    pub digest: String,
    /// All paths recorded with this digest (at least two)
    pub paths: Vec<String>,
}

/// Aggregate statistics over the whole store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStats {
    /// Number of records (distinct paths)
    pub total_records: u64,
    /// Number of distinct digests
    pub distinct_digests: u64,
    /// Sum of recorded file sizes in bytes
    pub total_bytes: u64,
}

impl StoreStats {
    /// Number of records whose content also exists under another path.
    ///
    /// By construction `total_records == distinct_digests + duplicates()`.
    #[must_use]
    pub fn duplicates(&self) -> u64 {
        self.total_records - self.distinct_digests
    }
}

/// Persistent mapping from file path to its last known content identity.
pub struct RecordStore {
    conn: Connection,
    pending: HashMap<String, FileRecord>,
    flush_every: usize,
}

impl RecordStore {
    /// Open (or create) the store at the given database path.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        Self::open_with_flush_every(path, DEFAULT_FLUSH_EVERY)
    }

    /// Open the store with a custom flush batch size.
    ///
    /// `flush_every` is clamped to at least 1.
    pub fn open_with_flush_every(path: &Path, flush_every: usize) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|source| StoreError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        // WAL keeps readers out of the writer's way and batches fsyncs.
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.busy_timeout(std::time::Duration::from_secs(30))?;
        conn.execute_batch(SCHEMA)?;

        log::debug!("Opened record store at {}", path.display());

        Ok(Self {
            conn,
            pending: HashMap::new(),
            flush_every: flush_every.max(1),
        })
    }

    /// Look up the record for a path, if any.
    ///
    /// Pending (unflushed) writes shadow the on-disk row.
    pub fn get(&self, path: &str) -> Result<Option<FileRecord>, StoreError> {
        if let Some(record) = self.pending.get(path) {
            return Ok(Some(record.clone()));
        }

        let record = self
            .conn
            .query_row(
                "SELECT path, digest, size, modified_at, recorded_at
                 FROM files WHERE path = ?1",
                params![path],
                |row| {
                    Ok(FileRecord {
                        path: row.get(0)?,
                        digest: row.get(1)?,
                        size: row.get::<_, i64>(2)? as u64,
                        modified_at: row.get(3)?,
                        recorded_at: row.get(4)?,
                    })
                },
            )
            .optional()?;

        Ok(record)
    }

    /// Insert or replace the record for `record.path`.
    ///
    /// The write lands in the pending batch; the batch is committed once it
    /// reaches the configured size. Replacement is whole-record, never a
    /// partial field update.
    pub fn upsert(&mut self, record: FileRecord) -> Result<(), StoreError> {
        self.pending.insert(record.path.clone(), record);
        if self.pending.len() >= self.flush_every {
            self.flush()?;
        }
        Ok(())
    }

    /// Commit all pending records in a single transaction.
    ///
    /// On failure the batch is retained and the error escalates.
    pub fn flush(&mut self) -> Result<(), StoreError> {
        if self.pending.is_empty() {
            return Ok(());
        }

        let tx = self.conn.transaction()?;
        for record in self.pending.values() {
            tx.execute(
                "INSERT OR REPLACE INTO files (path, digest, size, modified_at, recorded_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    record.path,
                    record.digest,
                    record.size as i64,
                    record.modified_at,
                    record.recorded_at
                ],
            )?;
        }
        tx.commit()?;

        log::debug!("Flushed {} records to store", self.pending.len());
        self.pending.clear();
        Ok(())
    }

    /// Number of records waiting in the unflushed batch.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Group all records by digest, keeping groups with two or more members.
    ///
    /// Groups are ordered by descending member count; ties break on digest
    /// and then path, so ordering is stable within one invocation.
    pub fn group_by_digest(&mut self) -> Result<Vec<DigestGroup>, StoreError> {
        self.flush()?;

        let mut stmt = self.conn.prepare(
            "SELECT f.digest, f.path
             FROM files f
             JOIN (SELECT digest, COUNT(*) AS members
                   FROM files GROUP BY digest HAVING COUNT(*) >= 2) d
               ON d.digest = f.digest
             ORDER BY d.members DESC, f.digest ASC, f.path ASC",
        )?;

        let mut groups: Vec<DigestGroup> = Vec::new();
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        for row in rows {
            let (digest, path) = row?;
            match groups.last_mut() {
                Some(group) if group.digest == digest => group.paths.push(path),
                _ => groups.push(DigestGroup {
                    digest,
                    paths: vec![path],
                }),
            }
        }

        Ok(groups)
    }

    /// Aggregate statistics over the whole store.
    pub fn stats(&mut self) -> Result<StoreStats, StoreError> {
        self.flush()?;

        let stats = self.conn.query_row(
            "SELECT COUNT(*), COUNT(DISTINCT digest), COALESCE(SUM(size), 0) FROM files",
            [],
            |row| {
                Ok(StoreStats {
                    total_records: row.get::<_, i64>(0)? as u64,
                    distinct_digests: row.get::<_, i64>(1)? as u64,
                    total_bytes: row.get::<_, i64>(2)? as u64,
                })
            },
        )?;

        Ok(stats)
    }
}

impl Drop for RecordStore {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            log::error!("Failed to flush record store on close: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn record(path: &str, digest: &str, size: u64, mtime: f64) -> FileRecord {
        FileRecord::new(path.to_string(), digest.to_string(), size, mtime)
    }

    #[test]
    fn test_upsert_then_get_without_flush() {
        let dir = tempdir().unwrap();
        let mut store = RecordStore::open(&dir.path().join("r.db")).unwrap();

        let rec = record("/a", "d1", 10, 100.0);
        store.upsert(rec.clone()).unwrap();

        // Visible before any flush, all fields intact.
        let got = store.get("/a").unwrap().unwrap();
        assert_eq!(got, rec);
        assert_eq!(store.pending_len(), 1);
    }

    #[test]
    fn test_upsert_replaces_whole_record() {
        let dir = tempdir().unwrap();
        let mut store = RecordStore::open(&dir.path().join("r.db")).unwrap();

        store.upsert(record("/a", "old", 10, 100.0)).unwrap();
        store.flush().unwrap();
        store.upsert(record("/a", "new", 20, 200.0)).unwrap();
        store.flush().unwrap();

        let got = store.get("/a").unwrap().unwrap();
        assert_eq!(got.digest, "new");
        assert_eq!(got.size, 20);
        assert_eq!(got.modified_at, 200.0);

        assert_eq!(store.stats().unwrap().total_records, 1);
    }

    #[test]
    fn test_flush_persists_across_reopen() {
        let dir = tempdir().unwrap();
        let db = dir.path().join("r.db");

        let mut store = RecordStore::open(&db).unwrap();
        store.upsert(record("/a", "d1", 10, 100.0)).unwrap();
        store.flush().unwrap();
        drop(store);

        let store = RecordStore::open(&db).unwrap();
        assert_eq!(store.get("/a").unwrap().unwrap().digest, "d1");
    }

    #[test]
    fn test_auto_flush_at_batch_size() {
        let dir = tempdir().unwrap();
        let mut store = RecordStore::open_with_flush_every(&dir.path().join("r.db"), 2).unwrap();

        store.upsert(record("/a", "d1", 1, 1.0)).unwrap();
        assert_eq!(store.pending_len(), 1);
        store.upsert(record("/b", "d2", 1, 1.0)).unwrap();
        assert_eq!(store.pending_len(), 0);
    }

    #[test]
    fn test_group_by_digest_keeps_only_real_groups() {
        let dir = tempdir().unwrap();
        let mut store = RecordStore::open(&dir.path().join("r.db")).unwrap();

        store.upsert(record("/x", "aaa", 5, 1.0)).unwrap();
        store.upsert(record("/y", "aaa", 5, 2.0)).unwrap();
        store.upsert(record("/z", "bbb", 7, 3.0)).unwrap();

        let groups = store.group_by_digest().unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].digest, "aaa");
        assert_eq!(groups[0].paths, vec!["/x".to_string(), "/y".to_string()]);
    }

    #[test]
    fn test_group_by_digest_orders_by_group_size() {
        let dir = tempdir().unwrap();
        let mut store = RecordStore::open(&dir.path().join("r.db")).unwrap();

        store.upsert(record("/p1", "small", 1, 1.0)).unwrap();
        store.upsert(record("/p2", "small", 1, 1.0)).unwrap();
        store.upsert(record("/q1", "big", 1, 1.0)).unwrap();
        store.upsert(record("/q2", "big", 1, 1.0)).unwrap();
        store.upsert(record("/q3", "big", 1, 1.0)).unwrap();

        let groups = store.group_by_digest().unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].digest, "big");
        assert_eq!(groups[0].paths.len(), 3);
        assert_eq!(groups[1].digest, "small");
    }

    #[test]
    fn test_stats_consistency() {
        let dir = tempdir().unwrap();
        let mut store = RecordStore::open(&dir.path().join("r.db")).unwrap();

        store.upsert(record("/x", "aaa", 5, 1.0)).unwrap();
        store.upsert(record("/y", "aaa", 5, 2.0)).unwrap();
        store.upsert(record("/z", "bbb", 7, 3.0)).unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.total_records, 3);
        assert_eq!(stats.distinct_digests, 2);
        assert_eq!(stats.total_bytes, 17);
        assert_eq!(stats.total_records, stats.distinct_digests + stats.duplicates());
    }

    #[test]
    fn test_stats_empty_store() {
        let dir = tempdir().unwrap();
        let mut store = RecordStore::open(&dir.path().join("r.db")).unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.total_records, 0);
        assert_eq!(stats.distinct_digests, 0);
        assert_eq!(stats.total_bytes, 0);
        assert_eq!(stats.duplicates(), 0);
    }
}
