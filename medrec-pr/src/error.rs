//! Error types for medrec-pr
//!
//! Every error body carries a human-readable `detail` and a machine-checkable
//! `kind`. Validation failures list every violation in `detail`.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use medrec_common::{Error, ErrorKind, ValidationError};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Error from the patient service or schema
    #[error(transparent)]
    Service(#[from] Error),

    /// Invalid request parameter (400)
    #[error("{0}")]
    BadRequest(String),

    /// Request body missing, not JSON, or wrong content type
    #[error(transparent)]
    Body(#[from] JsonRejection),

    /// Query string could not be parsed
    #[error(transparent)]
    Query(#[from] QueryRejection),
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Service(Error::Validation(err))
    }
}

/// Status code for a service error kind
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
        ErrorKind::Model => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::Corruption
        | ErrorKind::Io
        | ErrorKind::Database
        | ErrorKind::Domain
        | ErrorKind::Config => StatusCode::INTERNAL_SERVER_ERROR,
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
                let status = status_for(kind);
                if status.is_server_error() {
                    error!("Request failed ({}): {}", kind, err);
                }
                (
                    status,
                    json!({
                        "detail": err.to_string(),
                        "kind": kind.as_str(),
                    }),
                )
            }
            ApiError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                json!({
                    "detail": msg,
                    "kind": ErrorKind::InvalidInput.as_str(),
                }),
            ),
            ApiError::Body(rejection) => (
                rejection.status(),
                json!({
                    "detail": rejection.body_text(),
                    "kind": ErrorKind::InvalidInput.as_str(),
                }),
            ),
            ApiError::Query(rejection) => (
                StatusCode::BAD_REQUEST,
                json!({
                    "detail": rejection.body_text(),
                    "kind": ErrorKind::InvalidInput.as_str(),
                }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
