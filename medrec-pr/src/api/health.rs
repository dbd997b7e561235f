//! Landing and health check endpoints

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
    /// Storage backend in use ("json" or "sqlite")
    pub backend: String,
}

#[derive(Debug, Serialize)]
pub struct LandingResponse {
    pub message: String,
}

/// GET /
pub async fn landing() -> Json<LandingResponse> {
    Json(LandingResponse {
        message: "Patient Management System API".to_string(),
    })
}

/// GET /health
///
/// Does not touch the store; reports liveness only.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        module: "medrec-pr".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        backend: state.service.store().backend().to_string(),
    })
}

/// Build landing and health routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(landing))
        .route("/health", get(health_check))
}
