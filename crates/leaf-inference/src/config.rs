//! Classifier configuration.

use std::path::PathBuf;

use leaf_models::{LabelSet, Normalization};
use tracing::warn;

use crate::error::InferenceResult;
use crate::labels::ClassLabelTable;

/// Where the class label table comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelSource {
    Builtin(LabelSet),
    File(PathBuf),
}

impl LabelSource {
    pub fn load(&self) -> InferenceResult<ClassLabelTable> {
        match self {
            LabelSource::Builtin(set) => Ok(ClassLabelTable::builtin(*set)),
            LabelSource::File(path) => ClassLabelTable::from_file(path),
        }
    }
}

/// Classifier configuration.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Model file path, or file-name glob for an ensemble
    pub model_path: String,
    /// Label table
    pub labels: LabelSource,
    /// Pixel normalization
    pub normalization: Normalization,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            model_path: "model.onnx".to_string(),
            labels: LabelSource::Builtin(LabelSet::Server),
            normalization: Normalization::None,
        }
    }
}

impl ClassifierConfig {
    /// Defaults for the Swin transformer ensemble.
    pub fn ensemble() -> Self {
        Self {
            model_path: "best_swin_fold*.onnx".to_string(),
            labels: LabelSource::Builtin(LabelSet::Ensemble),
            normalization: Normalization::ImageNet,
        }
    }

    /// Create config for the HTTP service from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            model_path: std::env::var("MODEL_PATH").unwrap_or(defaults.model_path),
            labels: labels_from_env("CLASS_LABELS_PATH", "CLASS_LABELS", LabelSet::Server),
            normalization: parse_env("NORMALIZATION").unwrap_or(defaults.normalization),
        }
    }

    /// Create config for the local ensemble from environment variables.
    pub fn ensemble_from_env() -> Self {
        let defaults = Self::ensemble();
        Self {
            model_path: std::env::var("ENSEMBLE_MODEL_GLOB").unwrap_or(defaults.model_path),
            labels: labels_from_env(
                "ENSEMBLE_LABELS_PATH",
                "ENSEMBLE_LABELS",
                LabelSet::Ensemble,
            ),
            normalization: parse_env("ENSEMBLE_NORMALIZATION").unwrap_or(defaults.normalization),
        }
    }
}

fn labels_from_env(path_var: &str, set_var: &str, default: LabelSet) -> LabelSource {
    match std::env::var(path_var) {
        Ok(path) if !path.trim().is_empty() => LabelSource::File(PathBuf::from(path)),
        _ => LabelSource::Builtin(parse_env(set_var).unwrap_or(default)),
    }
}

fn parse_env<T>(var: &str) -> Option<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = std::env::var(var).ok()?;
    match raw.parse() {
        Ok(v) => Some(v),
        Err(e) => {
            warn!(var, value = %raw, "Ignoring invalid setting: {}", e);
            None
        }
    }
}
