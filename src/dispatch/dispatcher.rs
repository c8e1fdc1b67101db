//! Dispatch loop.
//!
//! # Responsibilities
//! - Drive one request through up to `max_retries` attempts
//! - Classify each failure and engage backoff or the breaker
//! - Keep usage and rotation counters consistent with call outcomes
//! - Surface a typed terminal result and notify registered observers
//!
//! One dispatch call is a single sequential unit of work; any number of them
//! run concurrently over the shared registry. A dispatch runs to completion
//! once started; there is no caller-driven cancellation path.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use uuid::Uuid;

use crate::config::DispatchConfig;
use crate::error::{CallError, DispatchError, FailureKind};
use crate::observability::metrics;
use crate::registry::{BackendRegistry, RotationStats};
use crate::resilience::{rate_limit_backoff, CircuitBreaker};
use crate::rotation::{PoolExhausted, Selector};
use crate::transport::GenerationTransport;

/// Caller-supplied context, used for logging and observer callbacks only.
#[derive(Debug, Clone, Default)]
pub struct RequestMetadata {
    pub request_id: Option<Uuid>,
    pub caller: Option<String>,
}

/// Successful dispatch payload.
#[derive(Debug, Clone)]
pub struct Generation {
    /// Generated text.
    pub text: String,
    /// Name of the backend that served the call.
    pub backend: String,
    /// Model id the upstream reports, when present.
    pub model: Option<String>,
    /// Wall time across all attempts.
    pub duration: Duration,
}

/// Callback interface for terminal dispatch outcomes.
///
/// Registered explicitly by a caller; there is no ambient event emitter.
pub trait DispatchObserver: Send + Sync {
    fn on_success(&self, _generation: &Generation, _meta: &RequestMetadata) {}
    fn on_failure(&self, _error: &DispatchError, _meta: &RequestMetadata) {}
}

/// Orchestrates the retry loop over selector, transport, and breaker.
pub struct Dispatcher {
    registry: Arc<BackendRegistry>,
    selector: Selector,
    breaker: Arc<CircuitBreaker>,
    transport: Arc<dyn GenerationTransport>,
    stats: Arc<RotationStats>,
    config: DispatchConfig,
    observers: RwLock<Vec<Arc<dyn DispatchObserver>>>,
}

impl Dispatcher {
    pub fn new(
        registry: Arc<BackendRegistry>,
        selector: Selector,
        breaker: Arc<CircuitBreaker>,
        transport: Arc<dyn GenerationTransport>,
        stats: Arc<RotationStats>,
        config: DispatchConfig,
    ) -> Self {
        Self {
            registry,
            selector,
            breaker,
            transport,
            stats,
            config,
            observers: RwLock::new(Vec::new()),
        }
    }

    /// Register an observer for terminal outcomes.
    pub fn register_observer(&self, observer: Arc<dyn DispatchObserver>) {
        self.observers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(observer);
    }

    /// Run one request to a terminal outcome.
    pub async fn dispatch(
        &self,
        prompt: &str,
        meta: &RequestMetadata,
    ) -> Result<Generation, DispatchError> {
        let started = tokio::time::Instant::now();
        self.stats.record_request();

        let mut last: Option<CallError> = None;
        for attempt in 1..=self.config.max_retries {
            let backend = match self.selector.pick(&self.registry) {
                Ok(backend) => backend,
                Err(PoolExhausted) => {
                    return self.fail(DispatchError::NoBackendAvailable, meta);
                }
            };

            tracing::debug!(
                backend = %backend.name(),
                attempt,
                max_retries = self.config.max_retries,
                request_id = ?meta.request_id,
                "Dispatching attempt"
            );

            match self.transport.generate(&backend, prompt).await {
                Ok(completion) => {
                    // Usage and success counters move together with the
                    // call's completion.
                    backend.record_success();
                    self.stats.record_success();
                    metrics::record_attempt(backend.name(), "success");
                    metrics::record_dispatch_outcome("success");

                    let generation = Generation {
                        text: completion.text,
                        backend: backend.name().to_string(),
                        model: completion.model,
                        duration: started.elapsed(),
                    };
                    self.notify(|o| o.on_success(&generation, meta));
                    return Ok(generation);
                }
                Err(error) => {
                    tracing::warn!(
                        backend = %backend.name(),
                        attempt,
                        error = %error,
                        "Attempt failed"
                    );
                    match error.kind() {
                        FailureKind::RateLimited => {
                            metrics::record_attempt(backend.name(), "rate_limited");
                            let delay = rate_limit_backoff(
                                self.config.rate_limit_backoff_ms,
                                self.config.rate_limit_jitter_ms,
                            );
                            tracing::debug!(
                                backend = %backend.name(),
                                delay_ms = delay.as_millis() as u64,
                                "Backing off after rate limit"
                            );
                            tokio::time::sleep(delay).await;
                        }
                        FailureKind::Unusable => {
                            metrics::record_attempt(backend.name(), "unusable");
                            metrics::record_suspension(backend.name());
                            self.breaker.suspend(backend.name());
                        }
                        FailureKind::Transient => {
                            metrics::record_attempt(backend.name(), "transient");
                        }
                    }
                    last = Some(error);
                }
            }
        }

        match last {
            Some(last) => self.fail(
                DispatchError::ExhaustedRetries {
                    attempts: self.config.max_retries,
                    last,
                },
                meta,
            ),
            // max_retries >= 1 is enforced by config validation.
            None => self.fail(DispatchError::NoBackendAvailable, meta),
        }
    }

    fn fail(
        &self,
        error: DispatchError,
        meta: &RequestMetadata,
    ) -> Result<Generation, DispatchError> {
        self.stats.record_failure();
        metrics::record_dispatch_outcome(match &error {
            DispatchError::NoBackendAvailable => "no_backend",
            DispatchError::ExhaustedRetries { .. } => "exhausted",
        });
        self.notify(|o| o.on_failure(&error, meta));
        Err(error)
    }

    fn notify(&self, f: impl Fn(&dyn DispatchObserver)) {
        let observers = self
            .observers
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        for observer in observers.iter() {
            f(observer.as_ref());
        }
    }
}
