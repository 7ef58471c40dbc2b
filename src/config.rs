//! Scan configuration.
//!
//! All tunables travel in an explicit [`ScanSettings`] value handed to the
//! scanner at construction time; there is no process-wide mutable state.

use anyhow::Result;
use directories::ProjectDirs;
use std::path::PathBuf;

use crate::policy::DEFAULT_MTIME_TOLERANCE;
use crate::store::DEFAULT_FLUSH_EVERY;

/// Files at or above this size get a per-file log entry (100 MiB).
pub const LARGE_FILE_THRESHOLD: u64 = 100 * 1024 * 1024;

/// How many candidates between progress snapshots.
pub const DEFAULT_SNAPSHOT_EVERY: u64 = 200;

/// Settings for a single scan run.
#[derive(Debug, Clone)]
pub struct ScanSettings {
    /// Re-hash every file regardless of stored metadata.
    pub force: bool,
    /// Mtime comparison tolerance in seconds.
    pub mtime_tolerance: f64,
    /// Pending records per store flush.
    pub flush_every: usize,
    /// Per-file log threshold in bytes.
    pub large_file_threshold: u64,
    /// Candidates between progress snapshots.
    pub snapshot_every: u64,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            force: false,
            mtime_tolerance: DEFAULT_MTIME_TOLERANCE,
            flush_every: DEFAULT_FLUSH_EVERY,
            large_file_threshold: LARGE_FILE_THRESHOLD,
            snapshot_every: DEFAULT_SNAPSHOT_EVERY,
        }
    }
}

impl ScanSettings {
    /// Enable or disable forced re-hashing.
    #[must_use]
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Override the mtime tolerance (seconds, non-negative).
    #[must_use]
    pub fn with_mtime_tolerance(mut self, tolerance: f64) -> Self {
        self.mtime_tolerance = tolerance.max(0.0);
        self
    }

    /// Override the flush batch size (clamped to at least 1).
    #[must_use]
    pub fn with_flush_every(mut self, flush_every: usize) -> Self {
        self.flush_every = flush_every.max(1);
        self
    }
}

/// Default platform-specific location of the record database.
pub fn default_store_path() -> Result<PathBuf> {
    let project_dirs = ProjectDirs::from("com", "hashkeep", "hashkeep")
        .ok_or_else(|| anyhow::anyhow!("Failed to determine project directories"))?;
    Ok(project_dirs.data_dir().join("records.db"))
}
