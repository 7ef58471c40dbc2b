//! Structured error reporting and exit codes.

use serde::Serialize;

/// Exit codes for the hashkeep application.
///
/// - 0: Success (run completed normally)
/// - 1: General error (store failure or other unexpected failure)
/// - 3: Partial success (run completed, some files failed to stat or hash)
/// - 130: Interrupted by user (Ctrl+C)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Success: run completed with no per-file errors.
    Success = 0,
    /// General error: an unexpected or fatal error occurred.
    GeneralError = 1,
    /// Partial success: run completed but some files failed.
    PartialSuccess = 3,
    /// Interrupted: run was interrupted by the user (Ctrl+C).
    Interrupted = 130,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "HK000",
            Self::GeneralError => "HK001",
            Self::PartialSuccess => "HK003",
            Self::Interrupted => "HK130",
        }
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "HK001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message
    pub message: String,
    /// Whether the operation was interrupted
    pub interrupted: bool,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: err.to_string(),
            interrupted: exit_code == ExitCode::Interrupted,
        }
    }
}
