//! Error types for the rotation layer.
//!
//! # Taxonomy
//! - [`RegistryError`]: membership operations (add/remove).
//! - [`CallError`]: a single transport attempt; classified into a
//!   [`FailureKind`] that drives the dispatcher's recovery path.
//! - [`DispatchError`]: terminal outcome of a whole `dispatch()` call.
//!
//! Quota exhaustion is deliberately absent: it never surfaces as an error,
//! only as exclusion from the selector's candidate set.

use std::time::Duration;
use thiserror::Error;

/// Errors from registry membership operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// A backend with this name is already registered.
    #[error("backend '{0}' is already registered")]
    DuplicateName(String),

    /// No backend with this name exists.
    #[error("no backend named '{0}'")]
    NotFound(String),
}

/// How the dispatcher should recover from a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Back off, keep the backend eligible, retry.
    RateLimited,
    /// Suspend the backend, retry against a different one.
    Unusable,
    /// Retry immediately.
    Transient,
}

/// Failure of a single transport attempt against one backend.
#[derive(Debug, Error)]
pub enum CallError {
    /// Explicit too-many-requests signal from the backend.
    #[error("rate limited (retry after {retry_after:?})")]
    RateLimited { retry_after: Option<Duration> },

    /// The backend itself is unusable: model not found, removed, or a
    /// persistent 4xx unrelated to quota.
    #[error("backend unusable (status {status}): {message}")]
    Unusable { status: u16, message: String },

    /// Transient upstream error (5xx or unexpected status).
    #[error("upstream error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Connection-level failure.
    #[error("network error: {0}")]
    Network(reqwest::Error),

    /// The request exceeded the configured deadline.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The response parsed but carried no generated text.
    #[error("response contained no generated text")]
    EmptyCompletion,

    /// The response body was not a valid completion payload.
    #[error("malformed response: {0}")]
    Parse(String),
}

impl CallError {
    /// Classify this failure for the retry loop.
    pub fn kind(&self) -> FailureKind {
        match self {
            CallError::RateLimited { .. } => FailureKind::RateLimited,
            CallError::Unusable { .. } => FailureKind::Unusable,
            CallError::Api { .. }
            | CallError::Network(_)
            | CallError::Timeout(_)
            | CallError::EmptyCompletion
            | CallError::Parse(_) => FailureKind::Transient,
        }
    }
}

/// Terminal outcome of a `dispatch()` call.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The registry holds no backends at all; nothing left to retry against.
    #[error("no backend available")]
    NoBackendAvailable,

    /// Every attempt failed; carries the last underlying error.
    #[error("exhausted {attempts} attempts, last error: {last}")]
    ExhaustedRetries {
        attempts: u32,
        #[source]
        last: CallError,
    },
}
