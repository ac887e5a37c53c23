//! Prediction handlers.
//!
//! Both endpoints take a multipart form with the image in field `file`.
//! Inference is synchronous, so it runs on the blocking pool.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::multipart::{Multipart, MultipartError, MultipartRejection};
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use leaf_inference::{InferenceResult, LeafClassifier};
use leaf_models::{LabelledPrediction, RawPrediction};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::state::AppState;

/// Multipart field carrying the image.
pub const FILE_FIELD: &str = "file";

/// An uploaded image.
#[derive(Debug)]
pub struct Upload {
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}

/// Classify an uploaded image: `{"predicted_class": ..., "confidence": ...}`.
pub async fn predict(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<LabelledPrediction>> {
    let upload = read_upload(multipart).await?;
    let file_name = upload.file_name.clone().unwrap_or_default();

    let start = Instant::now();
    let prediction = run_classifier(&state, move |c| c.classify_bytes(&upload.bytes)).await?;
    metrics::record_inference_duration("labelled", start.elapsed().as_secs_f64());
    metrics::record_prediction("labelled", prediction.is_unknown());

    info!(
        file_name = %file_name,
        index = prediction.index,
        label = %prediction.label,
        confidence = prediction.confidence,
        duration_ms = start.elapsed().as_millis() as u64,
        "Prediction served"
    );

    Ok(Json(prediction.into()))
}

/// Score an uploaded image: `{"prediction": [[...]]}`.
pub async fn predict_raw(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<RawPrediction>> {
    let upload = read_upload(multipart).await?;

    let start = Instant::now();
    let scores = run_classifier(&state, move |c| c.raw_scores(&upload.bytes)).await?;
    metrics::record_inference_duration("raw", start.elapsed().as_secs_f64());
    metrics::record_prediction("raw", false);

    info!(
        outputs = scores.len(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Raw prediction served"
    );

    Ok(Json(RawPrediction::single(scores)))
}

/// Pull the `file` field out of the form.
async fn read_upload(multipart: Result<Multipart, MultipartRejection>) -> ApiResult<Upload> {
    let mut multipart = multipart.map_err(|rejection| {
        ApiError::unprocessable(format!("Expected multipart form data: {}", rejection.body_text()))
    })?;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let bytes = field.bytes().await.map_err(multipart_error)?;
        return Ok(Upload {
            file_name,
            bytes: bytes.to_vec(),
        });
    }

    Err(ApiError::unprocessable(format!(
        "Missing form field '{}'",
        FILE_FIELD
    )))
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge
    } else {
        ApiError::unprocessable(format!("Malformed multipart body: {}", err.body_text()))
    }
}

/// Run a classifier call on the blocking pool.
async fn run_classifier<T, F>(state: &AppState, f: F) -> ApiResult<T>
where
    T: Send + 'static,
    F: FnOnce(&LeafClassifier) -> InferenceResult<T> + Send + 'static,
{
    let classifier = Arc::clone(&state.classifier);
    tokio::task::spawn_blocking(move || f(&classifier))
        .await
        .map_err(|e| ApiError::internal(format!("inference task failed: {}", e)))?
        .map_err(ApiError::from)
}
