//! Signal handling for graceful shutdown.
//!
//! A Ctrl+C sets a shared `AtomicBool`; the scan loop checks it between
//! files, flushes the store, and returns a summary marked interrupted. The
//! store therefore only ever reflects fully committed batches.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Exit code for SIGINT interruption (128 + signal number).
pub const EXIT_CODE_INTERRUPTED: i32 = 130;

/// Shared shutdown flag for coordinated termination.
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandler {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandler {
    /// Create a handler with shutdown not requested.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if shutdown has been requested.
    #[must_use]
    pub fn is_shutdown_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Get the flag to hand to the scan loop.
    #[must_use]
    pub fn get_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }

    /// Request shutdown manually (used by tests and the signal callback).
    pub fn request_shutdown(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }
}

/// Install the Ctrl+C handler and return the shared shutdown handler.
///
/// Fails if a handler is already installed for this process; callers may
/// continue without interruption support in that case.
pub fn install_handler() -> Result<ShutdownHandler, ctrlc::Error> {
    let handler = ShutdownHandler::new();
    let flag = handler.get_flag();

    ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
        eprintln!("Interrupted. Finishing current file and flushing...");
    })?;

    Ok(handler)
}
