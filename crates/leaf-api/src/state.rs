//! Application state.

use std::sync::Arc;

use leaf_inference::{InferenceResult, LeafClassifier};

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub classifier: Arc<LeafClassifier>,
}

impl AppState {
    /// Create new application state, loading the model named in `config`.
    pub fn new(config: ApiConfig) -> InferenceResult<Self> {
        let classifier = LeafClassifier::from_config(&config.classifier)?;
        Ok(Self::with_classifier(config, classifier))
    }

    /// Create state around an already constructed classifier.
    pub fn with_classifier(config: ApiConfig, classifier: LeafClassifier) -> Self {
        Self {
            config,
            classifier: Arc::new(classifier),
        }
    }
}
