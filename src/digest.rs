//! Streaming BLAKE3 content digests.
//!
//! # Overview
//!
//! Files are read in fixed-size chunks and fed into an incremental hasher,
//! so memory use stays bounded regardless of file size. The chunk size only
//! affects the memory footprint; the resulting digest is identical for any
//! chunk size.
//!
//! # Algorithm
//!
//! The digest algorithm (BLAKE3, 256-bit, hex-encoded) is a crate-level
//! constant rather than a per-call parameter: digests from different
//! algorithms are never comparable and records carry no algorithm tag.
//! Switching algorithms means re-hashing every file in the store.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// Chunk size for streaming reads (64 KiB).
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Length of a hex-encoded digest.
pub const DIGEST_HEX_LEN: usize = 64;

/// Errors that can occur while reading a file for hashing.
///
/// Any of these means "this file was not hashed this pass"; no persistent
/// state is touched on failure.
#[derive(thiserror::Error, Debug)]
pub enum DigestError {
    /// The file vanished before or during the read.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

impl DigestError {
    fn from_io(path: &Path, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source,
            },
        }
    }
}

/// Compute the hex-encoded BLAKE3 digest of a file's content.
pub fn digest_file(path: &Path) -> Result<String, DigestError> {
    let file = File::open(path).map_err(|e| DigestError::from_io(path, e))?;
    hash_reader(file, CHUNK_SIZE).map_err(|e| DigestError::from_io(path, e))
}

/// Stream a reader through the hasher in `chunk_size` byte chunks.
///
/// Exposed so tests can verify chunk-size invariance; production callers go
/// through [`digest_file`] with the fixed [`CHUNK_SIZE`].
pub fn hash_reader<R: Read>(mut reader: R, chunk_size: usize) -> io::Result<String> {
    let mut hasher = blake3::Hasher::new();
    let mut buf = vec![0u8; chunk_size.max(1)];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize().to_hex().to_string())
}
