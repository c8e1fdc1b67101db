//! Selection subsystem.
//!
//! # Data Flow
//! ```text
//! dispatch attempt
//!     → selector.rs (filter eligible → rank by usage ratio)
//!     → on empty pool: roll elapsed quota windows, re-filter
//!     → still empty: degraded pick (first registered descriptor)
//! ```
//!
//! # Design Decisions
//! - Selection never mutates usage counters except the lazy window roll
//! - Quota reset is reactive to scarcity, never driven by a background clock
//! - A degraded pick beats refusing: the retry loop absorbs the failure

pub mod selector;

pub use selector::{PoolExhausted, Selector, FAIRNESS_THRESHOLD};
