//! Metrics collection and exposition.
//!
//! # Metrics
//! - `rotor_dispatch_total` (counter): terminal dispatch outcomes
//! - `rotor_attempts_total` (counter): per-backend attempt results
//! - `rotor_suspensions_total` (counter): breaker suspensions per backend
//! - `rotor_backend_active` (gauge): 1=eligible, 0=suspended
//! - `rotor_forced_rotations_total` (counter): admin-triggered rotations
//!
//! # Design Decisions
//! - The `metrics` facade keeps recording sites cheap; exposition is a
//!   separate Prometheus exporter installed at startup
//! - Labels carry backend name and outcome, never request content

use std::net::SocketAddr;

use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on its own listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => {
            tracing::info!(address = %addr, "Metrics exporter listening");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to install metrics exporter");
            return;
        }
    }

    describe_counter!(
        "rotor_dispatch_total",
        "Terminal dispatch outcomes by result"
    );
    describe_counter!(
        "rotor_attempts_total",
        "Transport attempts by backend and result"
    );
    describe_counter!(
        "rotor_suspensions_total",
        "Circuit breaker suspensions by backend"
    );
    describe_gauge!(
        "rotor_backend_active",
        "Backend eligibility (1=active, 0=suspended)"
    );
    describe_counter!(
        "rotor_forced_rotations_total",
        "Forced rotations requested via the admin surface"
    );
}

pub fn record_dispatch_outcome(outcome: &'static str) {
    counter!("rotor_dispatch_total", "outcome" => outcome).increment(1);
}

pub fn record_attempt(backend: &str, result: &'static str) {
    counter!(
        "rotor_attempts_total",
        "backend" => backend.to_string(),
        "result" => result
    )
    .increment(1);
}

pub fn record_suspension(backend: &str) {
    counter!("rotor_suspensions_total", "backend" => backend.to_string()).increment(1);
}

pub fn record_backend_active(backend: &str, active: bool) {
    gauge!("rotor_backend_active", "backend" => backend.to_string())
        .set(if active { 1.0 } else { 0.0 });
}

pub fn record_forced_rotation() {
    counter!("rotor_forced_rotations_total").increment(1);
}
