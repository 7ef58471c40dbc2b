//! Record definitions for the persistent file inventory.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// One inventory entry per distinct file path ever seen.
///
/// A record binds a content digest to the `(size, modified_at)` pair observed
/// when the digest was computed. The store never mixes a digest with metadata
/// from a different read of the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Absolute, normalized path. Primary key.
    pub path: String,
    /// Hex-encoded BLAKE3 digest of the file content.
    pub digest: String,
    /// File size in bytes at the time of hashing.
    pub size: u64,
    /// File mtime (Unix seconds, fractional) at the time of hashing.
    pub modified_at: f64,
    /// When this record was last written. Audit only, never used for
    /// staleness decisions.
    pub recorded_at: f64,
}

impl FileRecord {
    /// Create a record for a freshly hashed file, stamping `recorded_at`
    /// with the current time.
    #[must_use]
    pub fn new(path: String, digest: String, size: u64, modified_at: f64) -> Self {
        Self {
            path,
            digest,
            size,
            modified_at,
            recorded_at: unix_time(SystemTime::now()),
        }
    }
}

/// Convert a `SystemTime` to fractional Unix seconds.
///
/// Times before the epoch collapse to `0.0`; such mtimes are not meaningful
/// for staleness comparison anyway.
#[must_use]
pub fn unix_time(time: SystemTime) -> f64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_new_stamps_recorded_at() {
        let before = unix_time(SystemTime::now());
        let record = FileRecord::new("/a/b.txt".to_string(), "deadbeef".to_string(), 42, 1000.5);
        let after = unix_time(SystemTime::now());

        assert_eq!(record.path, "/a/b.txt");
        assert_eq!(record.digest, "deadbeef");
        assert_eq!(record.size, 42);
        assert_eq!(record.modified_at, 1000.5);
        assert!(record.recorded_at >= before && record.recorded_at <= after);
    }

    #[test]
    fn test_unix_time_fractional() {
        let t = UNIX_EPOCH + Duration::from_millis(1_500);
        assert!((unix_time(t) - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_unix_time_before_epoch() {
        let t = UNIX_EPOCH - Duration::from_secs(10);
        assert_eq!(unix_time(t), 0.0);
    }
}
