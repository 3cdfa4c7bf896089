//! HTTP API: request/response DTOs, handlers, and error mapping.
//!
//! Upstream failures surface as explicit error responses with stable
//! status codes; only genuinely insufficient history resolves to a
//! zero-confidence prediction body.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::application::prediction_service::{PredictionError, PredictionService};
use crate::domain::errors::MarketDataError;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    service: Arc<PredictionService>,
}

impl AppState {
    pub fn new(service: Arc<PredictionService>) -> Self {
        Self { service }
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/predict", post(predict))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

// ===== DTOs =====

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    pub symbol: String,
    pub date: NaiveDate,
    pub lookback_days: Option<u32>,
    pub horizon_days: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub symbol: String,
    pub date: NaiveDate,
    pub prediction: bool,
    pub confidence: f64,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

// ===== Handlers =====

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn predict(
    State(state): State<AppState>,
    Json(req): Json<PredictRequest>,
) -> Result<Json<PredictResponse>, ApiError> {
    let symbol = req.symbol.trim().to_uppercase();
    if symbol.is_empty() {
        return Err(ApiError::bad_request("symbol must not be empty"));
    }
    if req.lookback_days == Some(0) {
        return Err(ApiError::bad_request("lookback_days must be >= 1"));
    }
    if req.horizon_days == Some(0) {
        return Err(ApiError::bad_request("horizon_days must be >= 1"));
    }

    let result = state
        .service
        .predict_for_symbol(
            &symbol,
            req.date,
            req.lookback_days.map(|v| v as usize),
            req.horizon_days.map(|v| v as usize),
        )
        .await?;

    Ok(Json(PredictResponse {
        symbol,
        date: req.date,
        prediction: result.prediction,
        confidence: result.confidence,
    }))
}

// ===== Error mapping =====

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.to_string(),
        }
    }
}

impl From<PredictionError> for ApiError {
    fn from(err: PredictionError) -> Self {
        let status = match &err {
            PredictionError::Market(MarketDataError::TickerNotFound { .. }) => {
                warn!("Prediction failed: {}", err);
                StatusCode::NOT_FOUND
            }
            PredictionError::Market(_) => {
                error!("Market data failure: {}", err);
                StatusCode::BAD_GATEWAY
            }
            PredictionError::Forecast(_) => {
                error!("Forecast contract violation: {}", err);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}
