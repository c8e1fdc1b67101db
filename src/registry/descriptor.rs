//! Backend descriptor.
//!
//! # Responsibilities
//! - Represent a single text-generation backend
//! - Track quota usage within the current rolling window
//! - Track selection eligibility (active flag toggled by the breaker)
//!
//! The identity fields are immutable after construction. All mutable usage
//! state sits behind one per-descriptor mutex, which serializes every
//! read-modify-write across concurrently running dispatch loops. There is no
//! cross-backend lock.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

use crate::config::BackendConfig;

/// Per-call generation parameters forwarded verbatim to the transport.
#[derive(Debug, Clone, Copy)]
pub struct GenerationParams {
    pub max_output_length: u32,
    pub sampling_temperature: f64,
}

/// Mutable usage state, guarded by the descriptor's mutex.
#[derive(Debug)]
struct UsageState {
    /// Calls made in the current window.
    used: u64,
    /// When `used` was last zeroed.
    window_start: Instant,
    /// False while the breaker has this backend suspended.
    active: bool,
}

/// Point-in-time copy of a descriptor's usage state.
#[derive(Debug, Clone, Copy)]
pub struct UsageSnapshot {
    pub used: u64,
    pub active: bool,
}

/// A single text-generation backend.
#[derive(Debug)]
pub struct Backend {
    name: String,
    priority: u32,
    daily_quota: u64,
    category: String,
    params: GenerationParams,
    state: Mutex<UsageState>,
}

impl Backend {
    /// Create a descriptor from its configuration.
    pub fn new(config: &BackendConfig) -> Self {
        Self {
            name: config.name.clone(),
            priority: config.priority,
            daily_quota: config.daily_quota,
            category: config.category.clone(),
            params: GenerationParams {
                max_output_length: config.max_output_length,
                sampling_temperature: config.sampling_temperature,
            },
            state: Mutex::new(UsageState {
                used: 0,
                window_start: Instant::now(),
                active: true,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn priority(&self) -> u32 {
        self.priority
    }

    pub fn daily_quota(&self) -> u64 {
        self.daily_quota
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn params(&self) -> GenerationParams {
        self.params
    }

    fn state(&self) -> MutexGuard<'_, UsageState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// True when selection may consider this backend.
    pub fn is_eligible(&self) -> bool {
        let state = self.state();
        state.active && state.used < self.daily_quota
    }

    /// Fraction of the quota consumed in the current window.
    pub fn usage_ratio(&self) -> f64 {
        self.state().used as f64 / self.daily_quota as f64
    }

    /// Count one successful dispatched call.
    pub fn record_success(&self) {
        self.state().used += 1;
    }

    /// Exclude this backend from selection. Returns the previous flag.
    pub fn suspend(&self) -> bool {
        let mut state = self.state();
        std::mem::replace(&mut state.active, false)
    }

    /// Make this backend eligible again. Returns the previous flag.
    pub fn reactivate(&self) -> bool {
        let mut state = self.state();
        std::mem::replace(&mut state.active, true)
    }

    /// Roll the quota window if it has been open at least `window`.
    ///
    /// Zeroes `used`, restarts the window, and reactivates the backend.
    /// Returns true if the roll happened.
    pub fn maybe_roll_window(&self, window: Duration) -> bool {
        let mut state = self.state();
        if state.window_start.elapsed() < window {
            return false;
        }
        state.used = 0;
        state.window_start = Instant::now();
        state.active = true;
        true
    }

    /// Zero the counter, restart the window, reactivate. Used by reset-all.
    pub fn reset(&self) {
        let mut state = self.state();
        state.used = 0;
        state.window_start = Instant::now();
        state.active = true;
    }

    /// Copy out the current usage state.
    pub fn usage(&self) -> UsageSnapshot {
        let state = self.state();
        UsageSnapshot {
            used: state.used,
            active: state.active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(quota: u64) -> Backend {
        Backend::new(&BackendConfig {
            name: "b".to_string(),
            priority: 1,
            daily_quota: quota,
            category: "general".to_string(),
            max_output_length: 256,
            sampling_temperature: 0.7,
        })
    }

    #[tokio::test]
    async fn eligibility_tracks_quota_and_active_flag() {
        let backend = descriptor(2);
        assert!(backend.is_eligible());

        backend.record_success();
        assert!(backend.is_eligible());
        backend.record_success();
        assert!(!backend.is_eligible(), "at quota");

        backend.reset();
        assert!(backend.is_eligible());

        backend.suspend();
        assert!(!backend.is_eligible());
        backend.reactivate();
        assert!(backend.is_eligible());
    }

    #[tokio::test(start_paused = true)]
    async fn window_rolls_only_after_it_has_been_open_long_enough() {
        let window = Duration::from_secs(86_400);
        let backend = descriptor(1);
        backend.record_success();
        backend.suspend();

        assert!(!backend.maybe_roll_window(window));
        assert_eq!(backend.usage().used, 1);

        tokio::time::advance(window).await;
        assert!(backend.maybe_roll_window(window));
        let usage = backend.usage();
        assert_eq!(usage.used, 0);
        assert!(usage.active);
    }
}
