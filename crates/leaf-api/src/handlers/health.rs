//! Health check handlers.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use leaf_inference::ModelInfo;
use serde::Serialize;

use crate::state::AppState;

/// Health response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}

/// Health check endpoint (liveness probe).
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Readiness check response.
#[derive(Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub model: ModelInfo,
}

/// Readiness check endpoint (readiness probe).
///
/// State only exists once the model has loaded, so reaching this handler
/// means the service can serve predictions.
pub async fn ready(State(state): State<AppState>) -> Json<ReadinessResponse> {
    Json(ReadinessResponse {
        status: "ready".to_string(),
        model: state.classifier.model_info(),
    })
}
