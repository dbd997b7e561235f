//! Integration tests for medrec-ip API endpoints
//!
//! Tests cover:
//! - Health reporting with and without a loaded model
//! - Predictions driven by derived lifestyle risk
//! - Validation errors (422) including occupation outside the configured list
//! - 503 when no model is loaded

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use medrec_common::config::Literals;
use medrec_common::prediction::{LinearPremiumModel, PremiumClassifier};
use medrec_ip::{build_router, AppState};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot` method

const MODEL_JSON: &str = r#"{
    "model_name": "insurance-premium",
    "version": "2.1.0",
    "classes": [
        {"label": "Low", "intercept": 2.0, "weights": {"lifestyle_risk=low": 1.0}},
        {"label": "Medium", "intercept": 0.0},
        {"label": "High", "intercept": -2.0, "weights": {"lifestyle_risk=high": 6.0}}
    ]
}"#;

/// Test helper: App with the test model loaded from a file
fn setup_app() -> Router {
    let dir = TempDir::new().expect("Should create temp dir");
    let path = dir.path().join("model.json");
    std::fs::write(&path, MODEL_JSON).expect("Should write model");
    let model = LinearPremiumModel::load(&path).expect("Should load model");

    let model: Arc<dyn PremiumClassifier> = Arc::new(model);
    build_router(AppState::new(Some(model), Literals::default()))
}

fn setup_app_without_model() -> Router {
    build_router(AppState::new(None, Literals::default()))
}

fn test_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn predict_request(body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

fn applicant(smoker: bool, weight: f64) -> Value {
    json!({
        "age": 38,
        "height": 1.72,
        "weight": weight,
        "income_lpa": 12.5,
        "smoker": smoker,
        "city": "  mumbai ",
        "occupation": "private_job"
    })
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_reports_model() {
    let app = setup_app();

    let response = app.oneshot(test_request("GET", "/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "medrec-ip");
    assert_eq!(body["model_loaded"], true);
    assert_eq!(body["model_version"], "2.1.0");
}

#[tokio::test]
async fn test_health_without_model() {
    let app = setup_app_without_model();

    let response = app.oneshot(test_request("GET", "/health")).await.unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["model_loaded"], false);
    assert!(body["model_version"].is_null());
}

// =============================================================================
// Prediction
// =============================================================================

#[tokio::test]
async fn test_heavy_smoker_predicted_high() {
    let app = setup_app();

    // bmi 33.8, smoker -> high lifestyle risk
    let response = app
        .oneshot(predict_request(&applicant(true, 100.0)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    let prediction = &body["response"];
    assert_eq!(prediction["predicted_category"], "High");

    let probabilities = prediction["class_probabilities"].as_object().unwrap();
    assert_eq!(probabilities.len(), 3);
    let total: f64 = probabilities.values().map(|p| p.as_f64().unwrap()).sum();
    assert!((total - 1.0).abs() < 1e-3);
    assert_eq!(prediction["confidence"], probabilities["High"]);
}

#[tokio::test]
async fn test_non_smoker_predicted_low() {
    let app = setup_app();

    let response = app
        .oneshot(predict_request(&applicant(false, 100.0)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["response"]["predicted_category"], "Low");
}

#[tokio::test]
async fn test_invalid_input_lists_violations() {
    let app = setup_app();

    let body = json!({
        "age": 130,
        "height": 3.0,
        "weight": 70.0,
        "income_lpa": 5.0,
        "smoker": "no",
        "city": "Pune",
        "occupation": "astronaut"
    });
    let response = app.oneshot(predict_request(&body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["kind"], "validation");
    let fields: Vec<&str> = body["detail"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["field"].as_str().unwrap())
        .collect();
    for field in ["age", "height", "smoker", "occupation"] {
        assert!(fields.contains(&field), "missing violation for {}", field);
    }
}

#[tokio::test]
async fn test_predict_without_model_unavailable() {
    let app = setup_app_without_model();

    let response = app
        .oneshot(predict_request(&applicant(true, 80.0)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["kind"], "model");
}

#[tokio::test]
async fn test_validation_precedes_model_check() {
    let app = setup_app_without_model();

    let response = app
        .oneshot(predict_request(&json!({"age": 30})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
