//! Rotation counters.
//!
//! Created alongside the registry, mutated by every dispatch call, zeroed only
//! by the explicit reset operation. Plain atomics; the aggregator derives the
//! read-only view.

use std::sync::atomic::{AtomicU64, Ordering};

/// Running totals for the rotation layer.
#[derive(Debug, Default)]
pub struct RotationStats {
    requests: AtomicU64,
    successes: AtomicU64,
    failures: AtomicU64,
    forced_rotations: AtomicU64,
}

impl RotationStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_request(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_success(&self) {
        self.successes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Advance the forced-rotation counter and return the new value.
    pub fn record_forced_rotation(&self) -> u64 {
        self.forced_rotations.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn requests(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    pub fn successes(&self) -> u64 {
        self.successes.load(Ordering::Relaxed)
    }

    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    pub fn forced_rotations(&self) -> u64 {
        self.forced_rotations.load(Ordering::Relaxed)
    }

    /// Zero every counter.
    pub fn reset(&self) {
        self.requests.store(0, Ordering::Relaxed);
        self.successes.store(0, Ordering::Relaxed);
        self.failures.store(0, Ordering::Relaxed);
        self.forced_rotations.store(0, Ordering::Relaxed);
    }
}
