//! medrec-ip library - Insurance premium prediction module
//!
//! Validates applicant input, derives the model features and asks the loaded
//! classifier for a premium category.

use axum::Router;
use medrec_common::config::Literals;
use medrec_common::prediction::PremiumClassifier;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;

pub use error::{ApiError, ApiResult};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// `None` when the model file could not be loaded at startup
    pub model: Option<Arc<dyn PremiumClassifier>>,
    /// Occupation list and city tiers used for validation and features
    pub literals: Arc<Literals>,
}

impl AppState {
    pub fn new(model: Option<Arc<dyn PremiumClassifier>>, literals: Literals) -> Self {
        Self {
            model,
            literals: Arc::new(literals),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::post;

    Router::new()
        .route("/predict", post(api::predict_premium))
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
