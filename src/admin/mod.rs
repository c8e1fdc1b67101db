//! Administrative surface for calling layers.

pub mod auth;
pub mod handlers;

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};

use self::auth::admin_auth_middleware;
use self::handlers::*;
use crate::http::server::AppState;

pub fn admin_router(state: AppState) -> Router {
    Router::new()
        .route("/admin/stats", get(get_stats))
        .route("/admin/rotate", post(force_rotation))
        .route("/admin/reset", post(reset_stats))
        .route("/admin/backends", post(add_backend))
        .route("/admin/backends/{name}", delete(remove_backend))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            admin_auth_middleware,
        ))
        .with_state(state)
}
