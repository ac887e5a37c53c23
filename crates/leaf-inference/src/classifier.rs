//! The classification service object.
//!
//! `LeafClassifier` owns everything a request needs: the model handle, the
//! label table and the normalization policy. It is built once at start-up
//! and shared read-only (wrap it in an `Arc`).

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use image::DynamicImage;
use leaf_models::{Normalization, Prediction};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::ClassifierConfig;
use crate::error::InferenceResult;
use crate::labels::ClassLabelTable;
use crate::model::{load_classifier, ClassifierModel};
use crate::preprocess::{preprocess_bytes, preprocess_image, preprocess_path, ImageTensor, TargetSize};
use crate::resolver::resolve;

/// Model metadata reported by readiness checks.
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub name: String,
    pub input_name: String,
    pub input_shape: Vec<i64>,
    pub layout: String,
    pub output_name: Option<String>,
    pub members: usize,
    pub output_len: Option<usize>,
    pub labels: usize,
    pub normalization: Normalization,
}

/// Image-to-label pipeline.
pub struct LeafClassifier {
    model: Arc<dyn ClassifierModel>,
    labels: ClassLabelTable,
    normalization: Normalization,
    target: TargetSize,
}

impl LeafClassifier {
    pub fn new(
        model: Arc<dyn ClassifierModel>,
        labels: ClassLabelTable,
        normalization: Normalization,
    ) -> Self {
        let target = model.input().target_size();

        if let Some(outputs) = model.output_len() {
            if outputs > labels.len() {
                warn!(
                    outputs,
                    labels = labels.len(),
                    "Model has more outputs than labels; extra indices resolve to Unknown"
                );
            }
        }

        Self {
            model,
            labels,
            normalization,
            target,
        }
    }

    /// Load models and labels described by `config`.
    pub fn from_config(config: &ClassifierConfig) -> InferenceResult<Self> {
        let model = load_classifier(&config.model_path)?;
        let labels = config.labels.load()?;
        let classifier = Self::new(model, labels, config.normalization);

        info!(
            model = %classifier.model.name(),
            members = classifier.model.member_count(),
            labels = classifier.labels.len(),
            height = classifier.target.height,
            width = classifier.target.width,
            normalization = %classifier.normalization,
            "Classifier ready"
        );
        Ok(classifier)
    }

    /// Classify encoded image bytes.
    pub fn classify_bytes(&self, bytes: &[u8]) -> InferenceResult<Prediction> {
        let scores = self.raw_scores(bytes)?;
        resolve(&scores, &self.labels)
    }

    /// Score vector for encoded image bytes, without label resolution.
    pub fn raw_scores(&self, bytes: &[u8]) -> InferenceResult<Vec<f32>> {
        let tensor = preprocess_bytes(bytes, self.target, self.normalization)?;
        self.run(&tensor)
    }

    /// Classify an image file.
    pub fn classify_path(&self, path: &Path) -> InferenceResult<Prediction> {
        let tensor = preprocess_path(path, self.target, self.normalization)?;
        let scores = self.run(&tensor)?;
        resolve(&scores, &self.labels)
    }

    /// Classify an already decoded image.
    pub fn classify_image(&self, img: &DynamicImage) -> InferenceResult<Prediction> {
        let tensor = preprocess_image(img, self.target, self.normalization)?;
        let scores = self.run(&tensor)?;
        resolve(&scores, &self.labels)
    }

    fn run(&self, tensor: &ImageTensor) -> InferenceResult<Vec<f32>> {
        let start = Instant::now();
        let scores = self.model.forward(tensor)?;
        debug!(
            model = %self.model.name(),
            outputs = scores.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Inference complete"
        );
        Ok(scores)
    }

    pub fn labels(&self) -> &ClassLabelTable {
        &self.labels
    }

    pub fn target_size(&self) -> TargetSize {
        self.target
    }

    pub fn model_info(&self) -> ModelInfo {
        let input = self.model.input();
        ModelInfo {
            name: self.model.name().to_string(),
            input_name: input.name.clone(),
            input_shape: input.shape.clone(),
            layout: input.layout.as_str().to_string(),
            output_name: self.model.output_name().map(str::to_string),
            members: self.model.member_count(),
            output_len: self.model.output_len(),
            labels: self.labels.len(),
            normalization: self.normalization,
        }
    }
}
