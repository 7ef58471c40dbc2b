//! Change-detection policy.
//!
//! Pure decision logic: given a file's current metadata and its stored
//! record, decide whether the file must be re-hashed. No I/O happens here,
//! which is what makes the policy independently testable.
//!
//! # Trust boundary
//!
//! A matching `(size, mtime)` pair is taken as proof of unchanged content.
//! This is a deliberate approximation: a write that preserves size and lands
//! within the mtime tolerance goes undetected. The `force` flag exists to
//! bypass the shortcut and re-hash everything.

use crate::store::FileRecord;

/// Default mtime comparison tolerance in seconds.
///
/// Absorbs timestamp truncation/rounding across filesystems (FAT stores
/// 2-second resolution; some stores round to whole seconds). Changing the
/// default changes staleness semantics for every existing store.
pub const DEFAULT_MTIME_TOLERANCE: f64 = 1.0;

/// Outcome of the change-detection decision for one candidate file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// No record exists for this path; the file must be hashed.
    New,
    /// The stored record is trusted; skip hashing.
    Unchanged,
    /// The file changed (or `force` was set); re-hash and replace.
    Modified,
}

/// Decide whether a candidate file needs hashing.
///
/// `Unchanged` requires a stored record with equal size, an mtime within
/// `tolerance` seconds, and `force` unset. A missing record is always `New`,
/// even under `force`.
#[must_use]
pub fn decide(
    size: u64,
    mtime: f64,
    stored: Option<&FileRecord>,
    force: bool,
    tolerance: f64,
) -> Decision {
    let Some(record) = stored else {
        return Decision::New;
    };

    if force {
        return Decision::Modified;
    }

    if size == record.size && (mtime - record.modified_at).abs() <= tolerance {
        Decision::Unchanged
    } else {
        Decision::Modified
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored(size: u64, modified_at: f64) -> FileRecord {
        FileRecord::new("/f".to_string(), "d".to_string(), size, modified_at)
    }

    #[test]
    fn test_absent_record_is_new() {
        assert_eq!(decide(100, 50.0, None, false, 1.0), Decision::New);
        // force has nothing to re-hash against
        assert_eq!(decide(100, 50.0, None, true, 1.0), Decision::New);
    }

    #[test]
    fn test_matching_metadata_is_unchanged() {
        let rec = stored(100, 50.0);
        assert_eq!(decide(100, 50.0, Some(&rec), false, 1.0), Decision::Unchanged);
    }

    #[test]
    fn test_force_overrides_unchanged() {
        let rec = stored(100, 50.0);
        assert_eq!(decide(100, 50.0, Some(&rec), true, 1.0), Decision::Modified);
    }

    #[test]
    fn test_size_mismatch_is_modified() {
        let rec = stored(100, 50.0);
        assert_eq!(decide(101, 50.0, Some(&rec), false, 1.0), Decision::Modified);
    }

    #[test]
    fn test_mtime_within_tolerance_is_unchanged() {
        let rec = stored(100, 50.0);
        assert_eq!(decide(100, 50.9, Some(&rec), false, 1.0), Decision::Unchanged);
        assert_eq!(decide(100, 49.1, Some(&rec), false, 1.0), Decision::Unchanged);
        assert_eq!(decide(100, 51.0, Some(&rec), false, 1.0), Decision::Unchanged);
    }

    #[test]
    fn test_mtime_beyond_tolerance_is_modified() {
        let rec = stored(100, 50.0);
        assert_eq!(decide(100, 51.5, Some(&rec), false, 1.0), Decision::Modified);
        assert_eq!(decide(100, 48.0, Some(&rec), false, 1.0), Decision::Modified);
    }

    #[test]
    fn test_zero_tolerance() {
        let rec = stored(100, 50.0);
        assert_eq!(decide(100, 50.0, Some(&rec), false, 0.0), Decision::Unchanged);
        assert_eq!(decide(100, 50.1, Some(&rec), false, 0.0), Decision::Modified);
    }
}
