//! Premium prediction endpoint

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use medrec_common::models::UserInput;
use medrec_common::prediction::PremiumPrediction;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub response: PremiumPrediction,
}

/// POST /predict
///
/// Input is validated before the model is consulted, so a bad body answers
/// 422 even while the model is unavailable.
pub async fn predict_premium(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<PredictResponse>> {
    let Json(body) = payload?;
    let input = UserInput::from_json(&body, &state.literals)?;
    let features = input
        .model_input(&state.literals)
        .map_err(medrec_common::Error::from)?;

    let model = state.model.as_ref().ok_or(ApiError::ModelUnavailable)?;
    let prediction = model.predict(&features)?;

    debug!(
        "Predicted {} ({}) for {} / tier {} / {}",
        prediction.predicted_category,
        prediction.confidence,
        features.occupation,
        features.city_tier,
        features.age_group.as_str()
    );
    Ok(Json(PredictResponse {
        response: prediction,
    }))
}
