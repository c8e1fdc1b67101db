//! Read-only stats view.
//!
//! Derives a serializable snapshot from the registry and the rotation
//! counters. Nothing here mutates state; two snapshots with no intervening
//! calls are identical.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::registry::{BackendRegistry, RotationStats};

/// Aggregated view of the rotation layer.
#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    pub total_backends: usize,
    pub active_backends: usize,
    pub total_quota: u64,
    pub total_used: u64,
    pub requests: u64,
    pub successes: u64,
    pub failures: u64,
    pub forced_rotations: u64,
    /// successes / requests; 0 when no requests yet.
    pub success_rate: f64,
    pub backends: Vec<BackendUsage>,
    pub categories: Vec<CategoryRollup>,
}

/// Per-backend usage line.
#[derive(Debug, Clone, Serialize)]
pub struct BackendUsage {
    pub name: String,
    pub category: String,
    pub priority: u32,
    pub daily_quota: u64,
    pub used: u64,
    pub usage_pct: f64,
    pub active: bool,
}

/// Per-category rollup.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryRollup {
    pub category: String,
    pub backends: usize,
    pub active: usize,
    pub total_quota: u64,
    pub total_used: u64,
}

/// Assemble a snapshot from live state.
pub fn collect(registry: &BackendRegistry, stats: &RotationStats) -> StatsSnapshot {
    let mut backends = Vec::new();
    let mut categories: BTreeMap<String, CategoryRollup> = BTreeMap::new();
    let mut active_backends = 0;
    let mut total_quota = 0;
    let mut total_used = 0;

    for backend in registry.list() {
        let usage = backend.usage();
        if usage.active {
            active_backends += 1;
        }
        total_quota += backend.daily_quota();
        total_used += usage.used;

        let rollup = categories
            .entry(backend.category().to_string())
            .or_insert_with(|| CategoryRollup {
                category: backend.category().to_string(),
                backends: 0,
                active: 0,
                total_quota: 0,
                total_used: 0,
            });
        rollup.backends += 1;
        if usage.active {
            rollup.active += 1;
        }
        rollup.total_quota += backend.daily_quota();
        rollup.total_used += usage.used;

        backends.push(BackendUsage {
            name: backend.name().to_string(),
            category: backend.category().to_string(),
            priority: backend.priority(),
            daily_quota: backend.daily_quota(),
            used: usage.used,
            usage_pct: usage.used as f64 / backend.daily_quota() as f64 * 100.0,
            active: usage.active,
        });
    }

    let requests = stats.requests();
    let successes = stats.successes();
    let success_rate = if requests == 0 {
        0.0
    } else {
        successes as f64 / requests as f64
    };

    StatsSnapshot {
        total_backends: backends.len(),
        active_backends,
        total_quota,
        total_used,
        requests,
        successes,
        failures: stats.failures(),
        forced_rotations: stats.forced_rotations(),
        success_rate,
        backends,
        categories: categories.into_values().collect(),
    }
}
