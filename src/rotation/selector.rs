//! Backend selection.
//!
//! # Responsibilities
//! - Filter descriptors down to eligible candidates
//! - Rank by usage ratio with a priority tie-break inside the fairness band
//! - Fold the lazy quota reset into the pool-exhausted branch
//! - Fall back to a degraded pick instead of refusing

use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::registry::{Backend, BackendRegistry};

/// Usage-ratio gap below which priority, not usage, decides selection.
///
/// Produces round-robin-like fairness under light load and strict priority
/// ordering once quotas diverge by more than this much.
pub const FAIRNESS_THRESHOLD: f64 = 0.1;

/// The registry holds no backends at all.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("backend pool is empty")]
pub struct PoolExhausted;

/// Picks the next backend to try.
#[derive(Debug, Clone, Copy)]
pub struct Selector {
    /// Rolling window after which a descriptor's counter may be reset.
    window: Duration,
}

impl Selector {
    pub fn new(window: Duration) -> Self {
        Self { window }
    }

    /// Select one backend.
    ///
    /// When every descriptor is ineligible, windows that have been open at
    /// least the quota window are rolled (counter zeroed, backend
    /// reactivated) and the filter re-runs. If the pool is still empty, the
    /// first registered descriptor is returned as a degraded pick: the layer
    /// prefers a likely-to-fail call over refusing outright.
    pub fn pick(&self, registry: &BackendRegistry) -> Result<Arc<Backend>, PoolExhausted> {
        let snapshot = registry.list();
        if snapshot.is_empty() {
            return Err(PoolExhausted);
        }

        let mut candidates = eligible(&snapshot);
        if candidates.is_empty() {
            let rolled = snapshot
                .iter()
                .filter(|b| b.maybe_roll_window(self.window))
                .count();
            if rolled > 0 {
                tracing::info!(rolled, "Rolled over elapsed quota windows");
            }

            candidates = eligible(&snapshot);
            if candidates.is_empty() {
                let first = snapshot[0].clone();
                tracing::warn!(backend = %first.name(), "No eligible backend, degraded pick");
                return Ok(first);
            }
        }

        Ok(rank(candidates))
    }
}

fn eligible(snapshot: &[Arc<Backend>]) -> Vec<Arc<Backend>> {
    snapshot
        .iter()
        .filter(|b| b.is_eligible())
        .cloned()
        .collect()
}

/// Rank candidates by usage ratio. When the two lowest ratios sit within the
/// fairness threshold of each other, the lower priority of the pair wins.
fn rank(candidates: Vec<Arc<Backend>>) -> Arc<Backend> {
    let mut ranked: Vec<(f64, Arc<Backend>)> = candidates
        .into_iter()
        .map(|b| (b.usage_ratio(), b))
        .collect();
    // Stable sort: registration order breaks exact ratio ties.
    ranked.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));

    if ranked.len() >= 2 && (ranked[1].0 - ranked[0].0) < FAIRNESS_THRESHOLD {
        let (first, second) = (&ranked[0].1, &ranked[1].1);
        if second.priority() < first.priority() {
            return second.clone();
        }
    }
    ranked[0].1.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendConfig;

    const DAY: Duration = Duration::from_secs(86_400);

    fn config(name: &str, priority: u32, quota: u64) -> BackendConfig {
        BackendConfig {
            name: name.to_string(),
            priority,
            daily_quota: quota,
            category: "general".to_string(),
            max_output_length: 256,
            sampling_temperature: 0.7,
        }
    }

    fn pool(specs: &[(&str, u32, u64, u64)]) -> BackendRegistry {
        let registry = BackendRegistry::new();
        for (name, priority, quota, used) in specs {
            let backend = registry.add(config(name, *priority, *quota)).unwrap();
            for _ in 0..*used {
                backend.record_success();
            }
        }
        registry
    }

    #[tokio::test]
    async fn empty_pool_is_exhausted() {
        let registry = BackendRegistry::new();
        assert!(matches!(
            Selector::new(DAY).pick(&registry),
            Err(PoolExhausted)
        ));
    }

    #[tokio::test]
    async fn backend_at_quota_is_never_selected() {
        let registry = pool(&[("full", 0, 5, 5), ("free", 1, 5, 0)]);
        let selector = Selector::new(DAY);
        for _ in 0..10 {
            assert_eq!(selector.pick(&registry).unwrap().name(), "free");
        }
    }

    #[tokio::test]
    async fn usage_gap_beyond_threshold_overrides_priority() {
        // A: priority 1, 9/10 used. B: priority 2, 0/10 used. Gap 0.9.
        let registry = pool(&[("a", 1, 10, 9), ("b", 2, 10, 0)]);
        assert_eq!(Selector::new(DAY).pick(&registry).unwrap().name(), "b");
    }

    #[tokio::test]
    async fn priority_breaks_ties_within_threshold() {
        // A: priority 1, 5/10. B: priority 2, 4/10. Gap within threshold.
        let registry = pool(&[("a", 1, 10, 5), ("b", 2, 10, 4)]);
        assert_eq!(Selector::new(DAY).pick(&registry).unwrap().name(), "a");
    }

    #[tokio::test]
    async fn degraded_pick_returns_first_registered() {
        let registry = pool(&[("first", 2, 3, 3), ("second", 1, 3, 3)]);
        let picked = Selector::new(DAY).pick(&registry).unwrap();
        assert_eq!(picked.name(), "first");
        assert_eq!(picked.usage().used, 3, "degraded pick does not reset quota");
    }

    #[tokio::test(start_paused = true)]
    async fn elapsed_windows_reset_lazily_on_exhaustion() {
        let registry = pool(&[("a", 0, 2, 2), ("b", 1, 2, 2)]);
        registry.get("b").unwrap().suspend();

        tokio::time::advance(DAY).await;

        let picked = Selector::new(DAY).pick(&registry).unwrap();
        assert_eq!(picked.usage().used, 0);
        for backend in registry.list() {
            let usage = backend.usage();
            assert_eq!(usage.used, 0);
            assert!(usage.active, "reset reactivates suspended backends");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn no_reset_while_pool_has_eligible_backends() {
        // Reset is reactive to scarcity, not time: an eligible backend keeps
        // elapsed windows from rolling.
        let registry = pool(&[("worn", 0, 4, 4), ("fresh", 1, 4, 0)]);
        tokio::time::advance(DAY + Duration::from_secs(60)).await;

        let picked = Selector::new(DAY).pick(&registry).unwrap();
        assert_eq!(picked.name(), "fresh");
        assert_eq!(
            registry.get("worn").unwrap().usage().used,
            4,
            "elapsed window must not roll while the pool still has capacity"
        );
    }
}
