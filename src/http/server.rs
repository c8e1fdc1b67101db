//! HTTP serving surface.
//!
//! # Responsibilities
//! - Expose the generation endpoint to collaborating layers
//! - Mount the admin router
//! - Wire middleware (tracing, request IDs, timeout)
//! - Run with graceful shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use uuid::Uuid;

use crate::admin;
use crate::config::RotorConfig;
use crate::dispatch::RequestMetadata;
use crate::error::DispatchError;
use crate::service::RotorService;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<RotorService>,
    pub admin_key: Arc<String>,
}

/// HTTP server for the rotation layer.
pub struct HttpServer {
    router: Router,
}

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub prompt: String,
    #[serde(default)]
    pub caller: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub text: String,
    pub backend: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub duration_ms: u64,
    pub request_id: Uuid,
}

/// Dispatch errors mapped onto HTTP responses.
struct ApiError(DispatchError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            DispatchError::NoBackendAvailable => StatusCode::SERVICE_UNAVAILABLE,
            DispatchError::ExhaustedRetries { .. } => StatusCode::BAD_GATEWAY,
        };
        (status, Json(serde_json::json!({ "error": self.0.to_string() }))).into_response()
    }
}

async fn generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let request_id = Uuid::new_v4();
    let meta = RequestMetadata {
        request_id: Some(request_id),
        caller: request.caller,
    };

    let generation = state
        .service
        .dispatch(&request.prompt, &meta)
        .await
        .map_err(ApiError)?;

    Ok(Json(GenerateResponse {
        text: generation.text,
        backend: generation.backend,
        model: generation.model,
        duration_ms: generation.duration.as_millis() as u64,
        request_id,
    }))
}

impl HttpServer {
    /// Build the router over an already-constructed service.
    pub fn new(config: &RotorConfig, service: Arc<RotorService>) -> Self {
        let state = AppState {
            service,
            admin_key: Arc::new(config.admin.api_key.clone()),
        };

        // A dispatch may legitimately spend several transport timeouts plus
        // backoff before it resolves; the layer's deadline sits above that.
        let request_deadline = Duration::from_secs(
            config.transport.timeout_secs * u64::from(config.dispatch.max_retries) + 30,
        );

        let router = Router::new()
            .route("/generate", post(generate))
            .with_state(state.clone())
            .merge(admin::admin_router(state))
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::new(request_deadline));

        Self { router }
    }

    /// Serve until shutdown is signalled.
    pub async fn run(self, listener: TcpListener) -> std::io::Result<()> {
        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }

    /// Router handle for tests that serve on an ephemeral listener.
    pub fn into_router(self) -> Router {
        self.router
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        tracing::error!("Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received, draining connections");
}
