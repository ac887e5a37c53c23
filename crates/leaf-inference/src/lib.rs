//! Image-to-label inference pipeline.
//!
//! This crate provides:
//! - Model discovery and ONNX Runtime session loading (single model or glob)
//! - Image decoding, RGB conversion, resizing and normalization
//! - Ensemble averaging over several classifiers
//! - Arg-max label resolution with an "Unknown" fallback
//! - Parallel plant reference tables for the local front end

pub mod catalog;
pub mod classifier;
pub mod config;
pub mod ensemble;
pub mod error;
pub mod labels;
pub mod model;
pub mod preprocess;
pub mod resolver;

pub use catalog::PlantCatalog;
pub use classifier::{LeafClassifier, ModelInfo};
pub use config::{ClassifierConfig, LabelSource};
pub use ensemble::{average_outputs, Ensemble};
pub use error::{InferenceError, InferenceResult};
pub use labels::ClassLabelTable;
pub use model::{
    discover_model_paths, load_classifier, load_models, ClassifierModel, InputSpec, OrtClassifier,
    TensorLayout,
};
pub use preprocess::{preprocess_bytes, preprocess_image, preprocess_path, ImageTensor, TargetSize};
pub use resolver::{argmax, resolve};
