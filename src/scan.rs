//! Scan orchestration.
//!
//! # Overview
//!
//! The [`Scanner`] drives one pass over a sequence of candidate file paths:
//! stat the file, run the change-detection policy, hash when needed, and
//! commit the record. Per-file failures (vanished files, permission errors,
//! short reads) are counted and logged but never abort the run; store
//! failures always do, since every downstream decision depends on the store.
//!
//! Processing is sequential with a single store writer. The shutdown flag is
//! checked between files; an interrupted run still flushes, so the store
//! only ever reflects fully committed batches.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytesize::ByteSize;

use crate::config::ScanSettings;
use crate::digest::digest_file;
use crate::policy::{decide, Decision};
use crate::progress::{ProgressCallback, ScanSnapshot};
use crate::store::{unix_time, FileRecord, RecordStore, StoreError};

/// Fatal scan errors.
///
/// Per-file stat/read failures are handled inside the loop and never appear
/// here; only store failures escalate.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// The record store failed mid-run. Progress from already flushed
    /// batches is retained.
    #[error("Record store failure after {processed} files processed: {source}")]
    Store {
        /// Files successfully processed before the failure
        processed: u64,
        /// The underlying store error
        #[source]
        source: StoreError,
    },
}

/// Final counters for one scan run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanSummary {
    /// Files hashed and committed
    pub processed: u64,
    /// Files skipped as unchanged
    pub skipped: u64,
    /// Files that failed to stat or hash
    pub errors: u64,
    /// Bytes hashed
    pub bytes: u64,
    /// Wall-clock duration of the run
    pub elapsed: Duration,
    /// Whether the run stopped early on a shutdown request
    pub interrupted: bool,
}

impl ScanSummary {
    /// Counters as a progress snapshot.
    #[must_use]
    pub fn snapshot(&self) -> ScanSnapshot {
        ScanSnapshot {
            processed: self.processed,
            skipped: self.skipped,
            errors: self.errors,
            bytes: self.bytes,
        }
    }
}

/// Drives a scan pass over candidate paths against a record store.
pub struct Scanner {
    store: RecordStore,
    settings: ScanSettings,
    shutdown_flag: Option<Arc<AtomicBool>>,
    progress: Option<Arc<dyn ProgressCallback>>,
}

impl Scanner {
    /// Create a scanner over an open store with the given settings.
    #[must_use]
    pub fn new(store: RecordStore, settings: ScanSettings) -> Self {
        Self {
            store,
            settings,
            shutdown_flag: None,
            progress: None,
        }
    }

    /// Set the shutdown flag for graceful interruption.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn ProgressCallback>) -> Self {
        self.progress = Some(progress);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Run one pass over `candidates`, returning the final counters.
    ///
    /// Every candidate is processed to completion or recorded error. The
    /// store is flushed before returning, including on interruption.
    pub fn run(
        &mut self,
        candidates: impl IntoIterator<Item = PathBuf>,
    ) -> Result<ScanSummary, ScanError> {
        let start = Instant::now();
        let mut summary = ScanSummary {
            processed: 0,
            skipped: 0,
            errors: 0,
            bytes: 0,
            elapsed: Duration::ZERO,
            interrupted: false,
        };

        if let Some(ref progress) = self.progress {
            progress.on_scan_start();
        }

        for path in candidates {
            if self.is_shutdown_requested() {
                log::info!("Shutdown requested, stopping scan");
                summary.interrupted = true;
                break;
            }

            self.process_candidate(&path, &mut summary)?;

            if summary.snapshot().total() % self.settings.snapshot_every.max(1) == 0 {
                if let Some(ref progress) = self.progress {
                    progress.on_snapshot(&summary.snapshot(), start.elapsed());
                }
            }
        }

        self.store.flush().map_err(|source| ScanError::Store {
            processed: summary.processed,
            source,
        })?;

        summary.elapsed = start.elapsed();
        if let Some(ref progress) = self.progress {
            progress.on_scan_end(&summary.snapshot(), summary.elapsed);
        }

        log::debug!(
            "Scan pass done: {} processed, {} skipped, {} errors, {} hashed",
            summary.processed,
            summary.skipped,
            summary.errors,
            ByteSize(summary.bytes)
        );

        Ok(summary)
    }

    /// Handle one candidate path. Only store failures escalate.
    fn process_candidate(
        &mut self,
        path: &Path,
        summary: &mut ScanSummary,
    ) -> Result<(), ScanError> {
        let metadata = match fs::metadata(path) {
            Ok(m) => m,
            Err(e) => {
                log::warn!("Failed to stat {}: {}", path.display(), e);
                summary.errors += 1;
                return Ok(());
            }
        };

        let mtime = match metadata.modified() {
            Ok(t) => unix_time(t),
            Err(e) => {
                log::warn!("Failed to read mtime of {}: {}", path.display(), e);
                summary.errors += 1;
                return Ok(());
            }
        };
        let size = metadata.len();

        let path_key = path.to_string_lossy().into_owned();
        let stored = self.store.get(&path_key).map_err(|source| ScanError::Store {
            processed: summary.processed,
            source,
        })?;

        match decide(
            size,
            mtime,
            stored.as_ref(),
            self.settings.force,
            self.settings.mtime_tolerance,
        ) {
            Decision::Unchanged => {
                log::trace!("Unchanged: {}", path.display());
                summary.skipped += 1;
            }
            Decision::New | Decision::Modified => {
                if size >= self.settings.large_file_threshold {
                    log::info!("Hashing large file ({}): {}", ByteSize(size), path.display());
                }

                match digest_file(path) {
                    Ok(digest) => {
                        let record = FileRecord::new(path_key, digest, size, mtime);
                        self.store.upsert(record).map_err(|source| ScanError::Store {
                            processed: summary.processed,
                            source,
                        })?;
                        summary.processed += 1;
                        summary.bytes += size;
                    }
                    Err(e) => {
                        log::warn!("Failed to hash {}: {}", path.display(), e);
                        summary.errors += 1;
                    }
                }
            }
        }

        Ok(())
    }

    /// Consume the scanner and return the store for follow-up queries.
    #[must_use]
    pub fn into_store(self) -> RecordStore {
        self.store
    }
}
