//! Generation transport subsystem.
//!
//! The [`GenerationTransport`] trait is the seam between the dispatch loop
//! and the wire: production uses the reqwest-backed client, tests plug in
//! scripted implementations.

pub mod client;

use async_trait::async_trait;

use crate::error::CallError;
use crate::registry::Backend;

pub use client::HttpGenerationClient;

/// Result of one successful generation call.
#[derive(Debug, Clone)]
pub struct Completion {
    /// Generated text; never empty.
    pub text: String,
    /// Model id the upstream reports, when it differs from the request.
    pub model: Option<String>,
}

/// A single outbound call against one backend.
#[async_trait]
pub trait GenerationTransport: Send + Sync {
    async fn generate(&self, backend: &Backend, prompt: &str) -> Result<Completion, CallError>;
}
