//! Backoff delay for rate-limited backends.

use std::time::Duration;

use rand::Rng;

/// Delay before retrying after an explicit too-many-requests signal.
///
/// Fixed base plus a small random jitter so concurrent dispatch loops do not
/// re-hit the backend in lockstep.
pub fn rate_limit_backoff(base_ms: u64, jitter_ms: u64) -> Duration {
    let jitter = if jitter_ms > 0 {
        rand::thread_rng().gen_range(0..jitter_ms)
    } else {
        0
    };

    Duration::from_millis(base_ms + jitter)
}
