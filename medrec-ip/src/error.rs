//! Error types for medrec-ip

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use medrec_common::{Error, ErrorKind, ValidationError};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Service(#[from] Error),

    /// No classifier loaded at startup
    #[error("Premium model is not loaded")]
    ModelUnavailable,

    #[error(transparent)]
    Body(#[from] JsonRejection),
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Service(Error::Validation(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Service(Error::Validation(err)) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({
                    "detail": err.violations(),
                    "kind": ErrorKind::Validation.as_str(),
                }),
            ),
            ApiError::Service(err) => {
                let kind = err.kind();
                let status = match kind {
                    ErrorKind::Model => StatusCode::SERVICE_UNAVAILABLE,
                    ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                error!("Prediction failed ({}): {}", kind, err);
                (
                    status,
                    json!({
                        "detail": err.to_string(),
                        "kind": kind.as_str(),
                    }),
                )
            }
            ApiError::ModelUnavailable => {
                warn!("Prediction requested but no model is loaded");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    json!({
                        "detail": "Premium model is not loaded",
                        "kind": ErrorKind::Model.as_str(),
                    }),
                )
            }
            ApiError::Body(rejection) => (
                rejection.status(),
                json!({
                    "detail": rejection.body_text(),
                    "kind": ErrorKind::InvalidInput.as_str(),
                }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
