//! Landing and health check endpoints

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
    pub model_loaded: bool,
    pub model_version: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LandingResponse {
    pub message: String,
}

/// GET /
pub async fn landing() -> Json<LandingResponse> {
    Json(LandingResponse {
        message: "Insurance Premium Category Predictor API".to_string(),
    })
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        module: "medrec-ip".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        model_loaded: state.model.is_some(),
        model_version: state.model.as_ref().map(|m| m.version().to_string()),
    })
}

pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(landing))
        .route("/health", get(health_check))
}
