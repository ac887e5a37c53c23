//! Prediction results and their wire schemas.
//!
//! Two response contracts are served over HTTP:
//!
//! - labelled: `{"predicted_class": "Neem", "confidence": 0.93}`
//! - raw: `{"prediction": [[0.01, 0.93, ...]]}` (batch-major, one row per image)

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Label reported when the arg-max index has no entry in the label table.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Result of classifying one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Prediction {
    /// Arg-max index into the model output.
    pub index: usize,
    /// Class name for `index`, or [`UNKNOWN_LABEL`].
    pub label: String,
    /// Raw output value at `index`. Not softmax-normalized.
    pub confidence: f32,
}

impl Prediction {
    pub fn new(index: usize, label: impl Into<String>, confidence: f32) -> Self {
        Self {
            index,
            label: label.into(),
            confidence,
        }
    }

    /// True when the index fell outside the label table.
    pub fn is_unknown(&self) -> bool {
        self.label == UNKNOWN_LABEL
    }
}

/// Labelled response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LabelledPrediction {
    pub predicted_class: String,
    pub confidence: f32,
}

impl From<Prediction> for LabelledPrediction {
    fn from(prediction: Prediction) -> Self {
        Self {
            predicted_class: prediction.label,
            confidence: prediction.confidence,
        }
    }
}

/// Raw response body: the full output vector, batch dimension kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RawPrediction {
    pub prediction: Vec<Vec<f32>>,
}

impl RawPrediction {
    /// Wrap a single image's score vector as a batch of one.
    pub fn single(scores: Vec<f32>) -> Self {
        Self {
            prediction: vec![scores],
        }
    }
}
