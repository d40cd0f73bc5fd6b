//! Liveness guard for frame-pump threads.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Keeps `pump_thread_exists` in sync with the pump's lifetime.
pub(super) struct PumpThreadGuard {
    exists: Arc<AtomicBool>,
}

impl PumpThreadGuard {
    pub(super) fn new(exists: Arc<AtomicBool>) -> Self {
        exists.store(true, Ordering::SeqCst);
        Self { exists }
    }
}

impl Drop for PumpThreadGuard {
    fn drop(&mut self) {
        self.exists.store(false, Ordering::SeqCst);
    }
}
