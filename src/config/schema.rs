//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the rotation
//! layer. All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the rotation layer.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RotorConfig {
    /// Listener configuration for the serving surface.
    pub listener: ListenerConfig,

    /// Admin API settings.
    pub admin: AdminConfig,

    /// Outbound transport settings shared by all backends.
    pub transport: TransportConfig,

    /// Backend descriptor definitions.
    pub backends: Vec<BackendConfig>,

    /// Dispatcher retry/backoff tuning.
    pub dispatch: DispatchConfig,

    /// Circuit breaker settings.
    pub breaker: BreakerConfig,

    /// Quota window settings.
    pub quota: QuotaConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Bearer key required on /admin routes.
    pub api_key: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            api_key: "rotor-admin-key".to_string(),
        }
    }
}

/// Outbound transport configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Base URL of the OpenAI-compatible endpoint (no trailing slash).
    pub base_url: String,

    /// Name of the environment variable holding the bearer credential.
    pub api_key_env: String,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000/v1".to_string(),
            api_key_env: "GEN_ROTOR_API_KEY".to_string(),
            timeout_secs: 120,
        }
    }
}

/// Backend descriptor configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    /// Unique backend identifier, sent as the model id on each call.
    pub name: String,

    /// Lower is preferred when usage ratios are within the fairness threshold.
    #[serde(default)]
    pub priority: u32,

    /// Ceiling on calls per rolling window.
    pub daily_quota: u64,

    /// Free-form label for reporting rollups; no behavioral effect.
    #[serde(default = "default_category")]
    pub category: String,

    /// Maximum output length forwarded to the transport.
    #[serde(default = "default_max_output_length")]
    pub max_output_length: u32,

    /// Sampling temperature forwarded to the transport.
    #[serde(default = "default_sampling_temperature")]
    pub sampling_temperature: f64,
}

fn default_category() -> String {
    "general".to_string()
}

fn default_max_output_length() -> u32 {
    1024
}

fn default_sampling_temperature() -> f64 {
    0.7
}

/// Dispatcher retry/backoff configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Maximum attempts per dispatch call.
    pub max_retries: u32,

    /// Fixed delay before retrying after a rate-limit signal, in milliseconds.
    pub rate_limit_backoff_ms: u64,

    /// Upper bound of the random jitter added to the backoff, in milliseconds.
    pub rate_limit_jitter_ms: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            rate_limit_backoff_ms: 5_000,
            rate_limit_jitter_ms: 2_000,
        }
    }
}

/// Circuit breaker configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BreakerConfig {
    /// Cool-down before a suspended backend becomes eligible again, in seconds.
    pub cooldown_secs: u64,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            cooldown_secs: 1_800,
        }
    }
}

/// Quota window configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct QuotaConfig {
    /// Rolling window after which a backend's counter may be reset, in seconds.
    pub window_secs: u64,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            window_secs: 86_400,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Enable the Prometheus metrics exporter.
    pub metrics_enabled: bool,

    /// Address the metrics endpoint binds to.
    pub metrics_address: String,

    /// Default tracing filter when RUST_LOG is unset.
    pub log_filter: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
            log_filter: "gen_rotor=info".to_string(),
        }
    }
}
