//! REST surface for the predictor.
//!
//! Two endpoints mirror the two callers: `/predict` speaks the form page's
//! success/error envelope, `/api/predict` the programmatic one. All handler
//! state is an `Arc<Predictor>`, read-only after startup, so requests run
//! concurrently without coordination.

use crate::error::ValidationError;
use crate::predictor::{Prediction, Predictor, RawValue};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tower_http::services::ServeDir;

const INDEX_HTML: &str = include_str!("../static/index.html");

/// Shared application state.
pub type AppState = Arc<Predictor>;

/// Build the router over a loaded predictor.
pub fn create_router(predictor: AppState, static_dir: &Path) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/predict", post(predict_form))
        .route("/api/predict", post(predict_api))
        .nest_service("/static", ServeDir::new(static_dir))
        .with_state(predictor)
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Body accepted by both endpoints: income and score as number or string.
#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    #[serde(default)]
    pub income: Option<RawValue>,
    #[serde(default)]
    pub score: Option<RawValue>,
}

impl PredictRequest {
    fn run(&self, predictor: &Predictor) -> Result<Prediction, ValidationError> {
        match (&self.income, &self.score) {
            (Some(income), Some(score)) => predictor.predict(income, score),
            _ => Err(ValidationError::MissingField),
        }
    }
}

/// Form-style response envelope.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum FormResponse {
    Success {
        success: bool,
        label: &'static str,
        color: &'static str,
        description: &'static str,
        centroid_income: f64,
        centroid_score: f64,
    },
    Failure {
        success: bool,
        error: String,
    },
}

impl FormResponse {
    fn from_result(result: Result<Prediction, ValidationError>) -> (StatusCode, FormResponse) {
        match result {
            Ok(p) => (
                StatusCode::OK,
                FormResponse::Success {
                    success: true,
                    label: p.label,
                    color: p.color,
                    description: p.description,
                    centroid_income: round2(p.centroid_income),
                    centroid_score: round2(p.centroid_score),
                },
            ),
            Err(e) => (
                StatusCode::BAD_REQUEST,
                FormResponse::Failure {
                    success: false,
                    error: e.to_string(),
                },
            ),
        }
    }
}

async fn predict_form(
    State(predictor): State<AppState>,
    Json(req): Json<PredictRequest>,
) -> (StatusCode, Json<FormResponse>) {
    let (status, body) = FormResponse::from_result(req.run(&predictor));
    (status, Json(body))
}

/// Programmatic response envelope.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ApiResponse {
    Success {
        segment: &'static str,
        centroid_income: f64,
        centroid_score: f64,
        color: &'static str,
        description: &'static str,
    },
    Failure {
        error: String,
    },
}

impl ApiResponse {
    fn from_result(result: Result<Prediction, ValidationError>) -> (StatusCode, ApiResponse) {
        match result {
            Ok(p) => (
                StatusCode::OK,
                ApiResponse::Success {
                    segment: p.label,
                    centroid_income: round2(p.centroid_income),
                    centroid_score: round2(p.centroid_score),
                    color: p.color,
                    description: p.description,
                },
            ),
            Err(e) => (
                StatusCode::BAD_REQUEST,
                ApiResponse::Failure {
                    error: e.to_string(),
                },
            ),
        }
    }
}

async fn predict_api(
    State(predictor): State<AppState>,
    Json(req): Json<PredictRequest>,
) -> (StatusCode, Json<ApiResponse>) {
    let (status, body) = ApiResponse::from_result(req.run(&predictor));
    (status, Json(body))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_prediction() -> Prediction {
        Prediction {
            segment_id: 1,
            label: "High Income – High Spending",
            color: "Green",
            description: "Target Customers",
            centroid_income: 86.5384,
            centroid_score: 82.1287,
        }
    }

    #[test]
    fn form_success_envelope_shape() {
        let (status, body) = FormResponse::from_result(Ok(sample_prediction()));
        assert_eq!(status, StatusCode::OK);

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["label"], "High Income – High Spending");
        assert_eq!(json["centroid_income"], 86.54);
        assert_eq!(json["centroid_score"], 82.13);
    }

    #[test]
    fn form_failure_envelope_shape() {
        let (status, body) = FormResponse::from_result(Err(ValidationError::ScoreOutOfRange));
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Spending Score must be between 1 and 100.");
    }

    #[test]
    fn api_envelopes() {
        let (status, body) = ApiResponse::from_result(Ok(sample_prediction()));
        assert_eq!(status, StatusCode::OK);
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["segment"], "High Income – High Spending");
        assert_eq!(json["color"], "Green");

        let (status, body) = ApiResponse::from_result(Err(ValidationError::MissingField));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["error"], "Missing 'income' or 'score' in request body");
    }

    #[test]
    fn request_body_accepts_numbers_and_strings() {
        let req: PredictRequest =
            serde_json::from_str(r#"{"income": 70, "score": "80"}"#).unwrap();
        assert!(req.income.is_some());
        assert!(req.score.is_some());

        let req: PredictRequest = serde_json::from_str(r#"{"income": 70}"#).unwrap();
        assert!(req.score.is_none());
    }
}
