//! Dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! dispatch(prompt, metadata)
//!     → selector (pick next backend, or NoBackendAvailable)
//!     → transport call with the backend's parameters
//!     → success: counters + typed payload
//!     → failure: classify → backoff / breaker / immediate retry
//!     → after max_retries: ExhaustedRetries with the last error
//! ```

pub mod dispatcher;

pub use dispatcher::{DispatchObserver, Dispatcher, Generation, RequestMetadata};
