//! Progress reporting for scan runs.
//!
//! The [`ProgressCallback`] trait decouples the scan loop from presentation;
//! the bundled [`Progress`] implementation renders an indicatif spinner for
//! terminal use. The total number of candidates is unknown up front (the
//! traversal is lazy), so reporting is count-based rather than a percentage
//! bar.

use std::sync::Mutex;
use std::time::Duration;

use bytesize::ByteSize;
use indicatif::{ProgressBar, ProgressStyle};

/// Point-in-time counters for a running scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSnapshot {
    /// Files hashed and committed this run
    pub processed: u64,
    /// Files skipped as unchanged
    pub skipped: u64,
    /// Files that failed to stat or hash
    pub errors: u64,
    /// Bytes hashed this run
    pub bytes: u64,
}

impl ScanSnapshot {
    /// Total candidates seen so far.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.processed + self.skipped + self.errors
    }
}

/// Receiver for periodic scan progress snapshots.
pub trait ProgressCallback: Send + Sync {
    /// Called once when the scan starts.
    fn on_scan_start(&self);

    /// Called periodically with current counters and elapsed time.
    fn on_snapshot(&self, snapshot: &ScanSnapshot, elapsed: Duration);

    /// Called once when the scan finishes (normally or interrupted).
    fn on_scan_end(&self, snapshot: &ScanSnapshot, elapsed: Duration);
}

/// Terminal progress reporter using indicatif.
pub struct Progress {
    bar: Mutex<Option<ProgressBar>>,
    quiet: bool,
}

impl Progress {
    /// Create a new reporter. With `quiet` set, nothing is drawn.
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            bar: Mutex::new(None),
            quiet,
        }
    }

    fn style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn format_msg(snapshot: &ScanSnapshot) -> String {
        format!(
            "{} files ({} hashed, {} unchanged, {} errors, {})",
            snapshot.total(),
            snapshot.processed,
            snapshot.skipped,
            snapshot.errors,
            ByteSize(snapshot.bytes)
        )
    }
}

impl ProgressCallback for Progress {
    fn on_scan_start(&self) {
        if self.quiet {
            return;
        }
        let bar = ProgressBar::new_spinner();
        bar.set_style(Self::style());
        bar.enable_steady_tick(Duration::from_millis(100));
        bar.set_message("scanning...");
        *self.bar.lock().unwrap() = Some(bar);
    }

    fn on_snapshot(&self, snapshot: &ScanSnapshot, _elapsed: Duration) {
        if let Some(bar) = self.bar.lock().unwrap().as_ref() {
            bar.set_message(Self::format_msg(snapshot));
        }
    }

    fn on_scan_end(&self, snapshot: &ScanSnapshot, elapsed: Duration) {
        if let Some(bar) = self.bar.lock().unwrap().take() {
            bar.finish_and_clear();
        }
        if !self.quiet {
            log::info!(
                "Scan finished in {:.1}s: {}",
                elapsed.as_secs_f64(),
                Self::format_msg(snapshot)
            );
        }
    }
}
