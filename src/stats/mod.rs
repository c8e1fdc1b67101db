//! Stats subsystem: derived, read-only reporting.

pub mod aggregator;

pub use aggregator::{collect, BackendUsage, CategoryRollup, StatsSnapshot};
