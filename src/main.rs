//! gen-rotor
//!
//! Rotation & resilience layer for pooled text-generation backends.
//!
//! # Architecture Overview
//!
//! ```text
//!   POST /generate ──▶ http ──▶ dispatch ──▶ rotation (selector)
//!                                   │              │
//!                                   │              ▼
//!                                   │         registry (descriptors,
//!                                   │          quota windows, counters)
//!                                   ▼
//!                              transport ──▶ backend pool
//!                                   │
//!                        failure classification
//!                         │          │         │
//!                   rate-limited  unusable  transient
//!                    (backoff)   (breaker)   (retry)
//!
//!   Cross-cutting: config, observability (tracing + metrics), admin surface
//! ```

use std::path::Path;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gen_rotor::config::{load_config, RotorConfig};
use gen_rotor::http::HttpServer;
use gen_rotor::observability::metrics;
use gen_rotor::service::RotorService;
use gen_rotor::transport::HttpGenerationClient;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match std::env::args().nth(1) {
        Some(path) => load_config(Path::new(&path))?,
        None => RotorConfig::default(),
    };

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.observability.log_filter.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        bind_address = %config.listener.bind_address,
        backends = config.backends.len(),
        max_retries = config.dispatch.max_retries,
        breaker_cooldown_secs = config.breaker.cooldown_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let transport = Arc::new(HttpGenerationClient::new(&config.transport)?);
    let service = Arc::new(RotorService::new(&config, transport)?);

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        "Listening for generation requests"
    );

    let server = HttpServer::new(&config, service);
    server.run(listener).await?;

    Ok(())
}
