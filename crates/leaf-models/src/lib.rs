//! Shared data models for the LeafNet classifier.
//!
//! This crate provides Serde-serializable types for:
//! - Prediction responses (labelled and raw contracts)
//! - Preprocessing normalization policies
//! - Built-in class label set selection
//! - Plant reports shown by the local front end

pub mod label_set;
pub mod normalization;
pub mod plant;
pub mod prediction;

// Re-export common types
pub use label_set::{LabelSet, LabelSetParseError};
pub use normalization::{Normalization, NormalizationParseError};
pub use plant::{PlantProfile, PlantReport};
pub use prediction::{LabelledPrediction, Prediction, RawPrediction, UNKNOWN_LABEL};
