//! Semantic configuration checks.
//!
//! Serde handles the syntactic layer; everything here is about values that
//! parse fine but cannot work at runtime.

use std::collections::HashSet;
use thiserror::Error;

use crate::config::schema::RotorConfig;

/// A single semantic problem found in a parsed configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("backend name must not be empty")]
    EmptyBackendName,

    #[error("duplicate backend name '{0}'")]
    DuplicateBackendName(String),

    #[error("backend '{0}' has a zero daily_quota")]
    ZeroQuota(String),

    #[error("backend '{0}' has sampling_temperature {1} outside [0, 2]")]
    TemperatureOutOfRange(String, String),

    #[error("dispatch.max_retries must be at least 1")]
    ZeroRetries,

    #[error("invalid {field} address '{value}'")]
    InvalidAddress { field: &'static str, value: String },

    #[error("invalid transport.base_url '{0}'")]
    InvalidBaseUrl(String),
}

/// Validate a parsed configuration, collecting every problem found.
pub fn validate_config(config: &RotorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for backend in &config.backends {
        if backend.name.is_empty() {
            errors.push(ValidationError::EmptyBackendName);
        } else if !seen.insert(backend.name.clone()) {
            errors.push(ValidationError::DuplicateBackendName(backend.name.clone()));
        }
        if backend.daily_quota == 0 {
            errors.push(ValidationError::ZeroQuota(backend.name.clone()));
        }
        if !(0.0..=2.0).contains(&backend.sampling_temperature) {
            errors.push(ValidationError::TemperatureOutOfRange(
                backend.name.clone(),
                backend.sampling_temperature.to_string(),
            ));
        }
    }

    if config.dispatch.max_retries == 0 {
        errors.push(ValidationError::ZeroRetries);
    }

    if config.listener.bind_address.parse::<std::net::SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<std::net::SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if url::Url::parse(&config.transport.base_url).is_err() {
        errors.push(ValidationError::InvalidBaseUrl(
            config.transport.base_url.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::BackendConfig;

    fn backend(name: &str, quota: u64) -> BackendConfig {
        BackendConfig {
            name: name.to_string(),
            priority: 0,
            daily_quota: quota,
            category: "general".to_string(),
            max_output_length: 1024,
            sampling_temperature: 0.7,
        }
    }

    #[test]
    fn default_config_validates() {
        let mut config = RotorConfig::default();
        config.backends.push(backend("a", 10));
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn duplicate_names_and_zero_quota_rejected() {
        let mut config = RotorConfig::default();
        config.backends.push(backend("a", 10));
        config.backends.push(backend("a", 0));
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::DuplicateBackendName("a".into())));
        assert!(errors.contains(&ValidationError::ZeroQuota("a".into())));
    }

    #[test]
    fn zero_retries_rejected() {
        let mut config = RotorConfig::default();
        config.backends.push(backend("a", 10));
        config.dispatch.max_retries = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::ZeroRetries));
    }
}
