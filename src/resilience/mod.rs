//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Failed attempt, classified:
//!     rate-limited → backoff.rs (jittered delay, backend stays eligible)
//!     unusable     → breaker.rs (suspend, timed blind reactivation)
//!     transient    → immediate retry in the dispatch loop
//! ```
//!
//! # Design Decisions
//! - No health probing anywhere: call outcomes are the only health signal
//! - Backoff delays suspend only the calling dispatch future
//! - Reactivation timers are independent spawned tasks, cancel-and-replace

pub mod backoff;
pub mod breaker;

pub use backoff::rate_limit_backoff;
pub use breaker::CircuitBreaker;
