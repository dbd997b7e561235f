//! medrec-pr library - Patient registry module
//!
//! CRUD over patient records stored in a JSON file or a SQLite table.

use axum::Router;
use medrec_common::PatientService;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;
pub mod pagination;

pub use error::{ApiError, ApiResult};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// CRUD service; owns the store handle and serializes store access
    pub service: Arc<PatientService>,
}

impl AppState {
    pub fn new(service: Arc<PatientService>) -> Self {
        Self { service }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{delete, get, patch, post};

    Router::new()
        .route("/patients", get(api::list_patients))
        .route("/patients/:patient_id", get(api::get_patient))
        .route("/sort", get(api::sort_patients))
        .route("/create_patient", post(api::create_patient))
        .route("/update_patient/:patient_id", patch(api::update_patient))
        .route("/delete_patient/:patient_id", delete(api::delete_patient))
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
