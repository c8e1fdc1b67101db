//! Backend registry subsystem.
//!
//! # Data Flow
//! ```text
//! config backends → registry.rs (owned set, name uniqueness)
//!     → descriptor.rs (per-backend quota/eligibility state)
//!     → stats.rs (global rotation counters)
//! ```
//!
//! # Design Decisions
//! - Registry is an explicitly constructed object, injected into consumers
//! - Per-descriptor mutex serializes all read-modify-write on usage state
//! - Snapshots preserve registration order (the degraded pick relies on it)

pub mod descriptor;
#[allow(clippy::module_inception)]
pub mod registry;
pub mod stats;

pub use descriptor::{Backend, GenerationParams, UsageSnapshot};
pub use registry::BackendRegistry;
pub use stats::RotationStats;
