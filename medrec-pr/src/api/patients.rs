//! Patient CRUD endpoints

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use medrec_common::models::{Patient, PatientPatch, PatientView};
use medrec_common::service::{SortKey, SortOrder};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::pagination::{to_window, ListQuery};
use crate::AppState;

/// Create response (201)
#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub message: String,
    pub patient: PatientView,
}

/// GET /patients?skip=&limit=
pub async fn list_patients(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<PatientView>>> {
    let Query(query) = query?;
    let window = to_window(&query).map_err(ApiError::BadRequest)?;
    let patients = state.service.list(window).await?;
    Ok(Json(patients))
}

/// GET /patients/:patient_id
pub async fn get_patient(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
) -> ApiResult<Json<PatientView>> {
    debug!("Fetching patient {}", patient_id);
    Ok(Json(state.service.get(&patient_id).await?))
}

/// POST /create_patient
///
/// Body is a full record including `id`.
pub async fn create_patient(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CreatedResponse>)> {
    let Json(body) = payload?;
    let patient = Patient::from_json(&body)?;
    let view = state.service.create(patient).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            message: "Patient added successfully".to_string(),
            patient: view,
        }),
    ))
}

/// PATCH /update_patient/:patient_id
///
/// Body holds only the fields to change.
pub async fn update_patient(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<PatientView>> {
    let Json(body) = payload?;
    let patch = PatientPatch::from_json(&body)?;
    Ok(Json(state.service.update(&patient_id, &patch).await?))
}

/// DELETE /delete_patient/:patient_id
pub async fn delete_patient(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
) -> ApiResult<StatusCode> {
    state.service.delete(&patient_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Query parameters for `GET /sort`
#[derive(Debug, Deserialize)]
pub struct SortQuery {
    pub sort_by: String,
    pub order_by: Option<String>,
}

/// GET /sort?sort_by=height|weight|bmi&order_by=asc|desc
pub async fn sort_patients(
    State(state): State<AppState>,
    query: Result<Query<SortQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<PatientView>>> {
    let Query(query) = query?;

    let key = SortKey::parse(&query.sort_by).ok_or_else(|| {
        ApiError::BadRequest(format!(
            "Invalid sort field, select from {:?}",
            SortKey::ALLOWED
        ))
    })?;
    let order = match query.order_by.as_deref() {
        None => SortOrder::default(),
        Some(o) => SortOrder::parse(o).ok_or_else(|| {
            ApiError::BadRequest(format!(
                "Invalid order field, select from {:?}",
                SortOrder::ALLOWED
            ))
        })?,
    };

    Ok(Json(state.service.sorted(key, order).await?))
}
