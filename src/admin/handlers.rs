use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::config::BackendConfig;
use crate::error::RegistryError;
use crate::http::server::AppState;
use crate::stats::StatsSnapshot;

/// Registry errors mapped onto admin responses.
pub struct AdminError(RegistryError);

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            RegistryError::DuplicateName(_) => StatusCode::CONFLICT,
            RegistryError::NotFound(_) => StatusCode::NOT_FOUND,
        };
        (status, Json(serde_json::json!({ "error": self.0.to_string() }))).into_response()
    }
}

#[derive(Serialize)]
pub struct RotationResponse {
    pub forced_rotations: u64,
}

pub async fn get_stats(State(state): State<AppState>) -> Json<StatsSnapshot> {
    Json(state.service.stats())
}

pub async fn force_rotation(State(state): State<AppState>) -> Json<RotationResponse> {
    Json(RotationResponse {
        forced_rotations: state.service.force_rotation(),
    })
}

pub async fn reset_stats(State(state): State<AppState>) -> Json<serde_json::Value> {
    state.service.reset_stats();
    Json(serde_json::json!({ "status": "reset" }))
}

pub async fn add_backend(
    State(state): State<AppState>,
    Json(config): Json<BackendConfig>,
) -> Result<StatusCode, Response> {
    if config.name.is_empty() || config.daily_quota == 0 {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({
                "error": "backend needs a non-empty name and a positive daily_quota"
            })),
        )
            .into_response());
    }
    state
        .service
        .add_backend(config)
        .map_err(|e| AdminError(e).into_response())?;
    Ok(StatusCode::CREATED)
}

pub async fn remove_backend(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<StatusCode, AdminError> {
    state.service.remove_backend(&name).map_err(AdminError)?;
    Ok(StatusCode::NO_CONTENT)
}
