//! API error types.
//!
//! Pipeline errors stay typed until here. The response body carries a fixed,
//! client-safe `detail`; the underlying error text is only logged.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use leaf_inference::InferenceError;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use crate::metrics;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unprocessable request: {0}")]
    Unprocessable(String),

    #[error("Payload too large")]
    PayloadTooLarge,

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Inference error: {0}")]
    Inference(#[from] InferenceError),
}

impl ApiError {
    pub fn unprocessable(msg: impl Into<String>) -> Self {
        Self::Unprocessable(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            // Undecodable uploads keep the 500 the service has always returned.
            ApiError::Internal(_) | ApiError::Inference(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Unprocessable(_) => "invalid_upload",
            ApiError::PayloadTooLarge => "payload_too_large",
            ApiError::Internal(_) => "internal",
            ApiError::Inference(e) => match e {
                InferenceError::Decode(_) => "decode_error",
                InferenceError::ShapeMismatch { .. } => "shape_mismatch",
                InferenceError::EmptyOutput | InferenceError::OutputMismatch { .. } => {
                    "invalid_model_output"
                }
                _ => "inference_error",
            },
        }
    }

    fn detail(&self) -> String {
        match self {
            ApiError::Unprocessable(msg) => msg.clone(),
            ApiError::PayloadTooLarge => "Uploaded file is too large".to_string(),
            ApiError::Inference(InferenceError::Decode(_)) => {
                "Error processing image: the uploaded file is not a readable image".to_string()
            }
            ApiError::Inference(_) => "Error processing image".to_string(),
            ApiError::Internal(_) => "An internal error occurred".to_string(),
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        if status.is_server_error() {
            error!(code, error = %self, "Request failed");
        } else {
            warn!(code, error = %self, "Request rejected");
        }
        metrics::record_request_error(code);

        let body = ErrorResponse {
            detail: self.detail(),
            code: Some(code.to_string()),
        };

        (status, Json(body)).into_response()
    }
}
