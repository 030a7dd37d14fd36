//! Cooperative cancellation for in-flight traversals.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared flag the host sets when the enclosing request is aborted.
///
/// Walkers and collectors check it at every step and unwind promptly. Clones share
/// the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancellationFlag {
    /// Create a flag that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
