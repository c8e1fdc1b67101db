//! Backend registry.
//!
//! # Responsibilities
//! - Own the mutable set of backend descriptors
//! - Enforce name uniqueness at registration time
//! - Hand out registration-ordered snapshots to the selector and stats
//!
//! Membership mutation is serialized through one RwLock; consumers never hold
//! a private copy of a descriptor, only `Arc`s into the registry's set. The
//! registry is constructed explicitly and injected into its consumers.

use std::sync::{Arc, PoisonError, RwLock};

use crate::config::BackendConfig;
use crate::error::RegistryError;
use crate::registry::descriptor::Backend;

/// Owns all backend descriptors.
#[derive(Debug, Default)]
pub struct BackendRegistry {
    backends: RwLock<Vec<Arc<Backend>>>,
}

impl BackendRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from configuration, preserving declaration order.
    pub fn from_configs(configs: &[BackendConfig]) -> Result<Self, RegistryError> {
        let registry = Self::new();
        for config in configs {
            registry.add(config.clone())?;
        }
        Ok(registry)
    }

    /// Register a backend. Fails if the name is already taken.
    pub fn add(&self, config: BackendConfig) -> Result<Arc<Backend>, RegistryError> {
        let mut backends = self
            .backends
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if backends.iter().any(|b| b.name() == config.name) {
            return Err(RegistryError::DuplicateName(config.name));
        }
        let backend = Arc::new(Backend::new(&config));
        backends.push(backend.clone());
        tracing::info!(backend = %backend.name(), quota = backend.daily_quota(), "Backend registered");
        Ok(backend)
    }

    /// Deregister a backend by name.
    pub fn remove(&self, name: &str) -> Result<(), RegistryError> {
        let mut backends = self
            .backends
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = backends.len();
        backends.retain(|b| b.name() != name);
        if backends.len() == before {
            return Err(RegistryError::NotFound(name.to_string()));
        }
        tracing::info!(backend = %name, "Backend removed");
        Ok(())
    }

    /// Look up a live descriptor by name.
    pub fn get(&self, name: &str) -> Option<Arc<Backend>> {
        self.backends
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|b| b.name() == name)
            .cloned()
    }

    /// Registration-ordered snapshot of all descriptors.
    pub fn list(&self) -> Vec<Arc<Backend>> {
        self.backends
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.backends
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Zero every counter and reactivate every backend.
    pub fn reset_all(&self) {
        for backend in self.list() {
            backend.reset();
        }
    }
}
