//! Error types for the inference pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for inference operations.
pub type InferenceResult<T> = Result<T, InferenceError>;

/// Errors that can occur while loading models or classifying images.
///
/// A predicted index outside the label table is not an error: it resolves
/// to the "Unknown" label.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Input shape mismatch: model expects {expected:?}, tensor is {actual:?}")]
    ShapeMismatch { expected: Vec<i64>, actual: Vec<usize> },

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Failed to load model {path}: {message}")]
    ModelLoad { path: PathBuf, message: String },

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Model returned an empty output")]
    EmptyOutput,

    #[error("Ensemble output length mismatch: expected {expected}, got {actual}")]
    OutputMismatch { expected: usize, actual: usize },

    #[error("Invalid label table: {0}")]
    Labels(String),

    #[error("Invalid plant catalog: {0}")]
    Catalog(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl InferenceError {
    /// Create a decode error.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    /// Create a model load error.
    pub fn model_load(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ModelLoad {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a model not found error.
    pub fn model_not_found(source: impl Into<String>) -> Self {
        Self::ModelNotFound(source.into())
    }

    /// Create a runtime inference error.
    pub fn inference(message: impl Into<String>) -> Self {
        Self::Inference(message.into())
    }
}

impl From<image::ImageError> for InferenceError {
    fn from(err: image::ImageError) -> Self {
        Self::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helpers() {
        assert!(matches!(InferenceError::decode("bad header"), InferenceError::Decode(_)));
        let err = InferenceError::model_load("m.onnx", "bad proto");
        assert_eq!(err.to_string(), "Failed to load model m.onnx: bad proto");
    }

    #[test]
    fn test_shape_mismatch_message() {
        let err = InferenceError::ShapeMismatch {
            expected: vec![1, 224, 224, 3],
            actual: vec![1, 128, 128, 3],
        };
        assert!(err.to_string().contains("[1, 224, 224, 3]"));
    }
}
