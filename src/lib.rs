//! Rotation & resilience layer for pooled text-generation backends.
//!
//! Mediates every outbound call from an application to a pool of
//! interchangeable, quota-limited backends: fair selection under shifting
//! quota pressure, bounded retries with backoff, and breaker-driven
//! suspension of unusable backends with blind timed reactivation.

pub mod admin;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod observability;
pub mod registry;
pub mod resilience;
pub mod rotation;
pub mod service;
pub mod stats;
pub mod transport;

pub use config::RotorConfig;
pub use dispatch::{DispatchObserver, Generation, RequestMetadata};
pub use error::{CallError, DispatchError, RegistryError};
pub use http::HttpServer;
pub use service::RotorService;
