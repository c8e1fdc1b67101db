//! Composition root for the rotation layer.
//!
//! Constructs the registry, selector, breaker, and dispatcher explicitly and
//! wires them together; nothing in this crate is a module-level singleton.
//! Calling layers (HTTP surface, embedding applications) hold one
//! [`RotorService`] and reach every operation through it.

use std::sync::Arc;
use std::time::Duration;

use crate::config::{BackendConfig, RotorConfig};
use crate::dispatch::{DispatchObserver, Dispatcher, Generation, RequestMetadata};
use crate::error::{DispatchError, RegistryError};
use crate::observability::metrics;
use crate::registry::{BackendRegistry, RotationStats};
use crate::resilience::CircuitBreaker;
use crate::rotation::Selector;
use crate::stats::{self, StatsSnapshot};
use crate::transport::GenerationTransport;

/// The rotation layer's full surface: dispatch plus administration.
pub struct RotorService {
    registry: Arc<BackendRegistry>,
    stats: Arc<RotationStats>,
    breaker: Arc<CircuitBreaker>,
    dispatcher: Dispatcher,
}

impl RotorService {
    /// Build the layer from configuration and a transport implementation.
    pub fn new(
        config: &RotorConfig,
        transport: Arc<dyn GenerationTransport>,
    ) -> Result<Self, RegistryError> {
        let registry = Arc::new(BackendRegistry::from_configs(&config.backends)?);
        let stats = Arc::new(RotationStats::new());
        let breaker = Arc::new(CircuitBreaker::new(
            registry.clone(),
            Duration::from_secs(config.breaker.cooldown_secs),
        ));
        let selector = Selector::new(Duration::from_secs(config.quota.window_secs));
        let dispatcher = Dispatcher::new(
            registry.clone(),
            selector,
            breaker.clone(),
            transport,
            stats.clone(),
            config.dispatch.clone(),
        );

        Ok(Self {
            registry,
            stats,
            breaker,
            dispatcher,
        })
    }

    /// Run one generation request to a terminal outcome.
    pub async fn dispatch(
        &self,
        prompt: &str,
        meta: &RequestMetadata,
    ) -> Result<Generation, DispatchError> {
        self.dispatcher.dispatch(prompt, meta).await
    }

    /// Register an observer for terminal dispatch outcomes.
    pub fn register_observer(&self, observer: Arc<dyn DispatchObserver>) {
        self.dispatcher.register_observer(observer);
    }

    /// Advance the rotation counter. Diagnostics only; selection is
    /// unaffected.
    pub fn force_rotation(&self) -> u64 {
        metrics::record_forced_rotation();
        let count = self.stats.record_forced_rotation();
        tracing::info!(count, "Forced rotation");
        count
    }

    /// Zero every counter and reactivate every backend.
    pub fn reset_stats(&self) {
        self.breaker.cancel_all();
        self.registry.reset_all();
        self.stats.reset();
        for backend in self.registry.list() {
            metrics::record_backend_active(backend.name(), true);
        }
        tracing::info!("Statistics reset, all backends reactivated");
    }

    /// Register a backend at runtime.
    pub fn add_backend(&self, config: BackendConfig) -> Result<(), RegistryError> {
        self.registry.add(config).map(|_| ())
    }

    /// Deregister a backend at runtime.
    pub fn remove_backend(&self, name: &str) -> Result<(), RegistryError> {
        self.registry.remove(name)
    }

    /// Read-only aggregate view.
    pub fn stats(&self) -> StatsSnapshot {
        stats::collect(&self.registry, &self.stats)
    }

    /// Shared registry handle, for callers composing their own tooling.
    pub fn registry(&self) -> &Arc<BackendRegistry> {
        &self.registry
    }
}
