//! Circuit breaker for backend suspension.
//!
//! # State Transitions
//! ```text
//! active → suspended: dispatcher reports a backend-unusable failure
//! suspended → active: cool-down elapses (unconditional, no probe)
//! ```
//!
//! # Design Decisions
//! - Per-backend suspension, not global
//! - Reactivation is blind: the next real call is the health probe, and the
//!   retry loop re-suspends on the next unusable failure
//! - One pending reactivation task per backend; a new suspension aborts and
//!   replaces the previous timer, so the backend reactivates one full
//!   cool-down after the latest suspension

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::task::JoinHandle;

use crate::observability::metrics;
use crate::registry::BackendRegistry;

/// Suspends unusable backends and schedules their reactivation.
#[derive(Debug)]
pub struct CircuitBreaker {
    registry: Arc<BackendRegistry>,
    cooldown: Duration,
    /// Latest reactivation timer per backend. Finished handles stay until the
    /// next suspension replaces them; aborting a finished task is a no-op.
    timers: DashMap<String, JoinHandle<()>>,
}

impl CircuitBreaker {
    pub fn new(registry: Arc<BackendRegistry>, cooldown: Duration) -> Self {
        Self {
            registry,
            cooldown,
            timers: DashMap::new(),
        }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Suspend a backend and arm its reactivation timer.
    pub fn suspend(&self, name: &str) {
        let Some(backend) = self.registry.get(name) else {
            return;
        };
        backend.suspend();
        metrics::record_backend_active(name, false);
        tracing::warn!(
            backend = %name,
            cooldown_secs = self.cooldown.as_secs(),
            "Backend suspended"
        );

        let registry = self.registry.clone();
        let cooldown = self.cooldown;
        let key = name.to_string();
        let task_key = key.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(cooldown).await;
            if let Some(backend) = registry.get(&task_key) {
                backend.reactivate();
                metrics::record_backend_active(&task_key, true);
                tracing::info!(backend = %task_key, "Cool-down elapsed, backend reactivated");
            }
        });

        if let Some(previous) = self.timers.insert(key, handle) {
            previous.abort();
        }
    }

    /// Abort every pending reactivation timer.
    ///
    /// Used by reset-all, which reactivates backends directly; a timer left
    /// running would only re-assert the flag.
    pub fn cancel_all(&self) {
        for entry in self.timers.iter() {
            entry.value().abort();
        }
        self.timers.clear();
    }
}

impl Drop for CircuitBreaker {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
