//! Local identification: ensemble prediction plus plant catalog lookup.

use std::path::{Path, PathBuf};

use leaf_inference::{ClassifierConfig, InferenceResult, LeafClassifier, PlantCatalog};
use leaf_models::PlantReport;
use tracing::info;

/// Printed when no image was given.
pub const NO_IMAGE_MESSAGE: &str = "Please upload an image first.";

/// Settings for the local identifier.
#[derive(Debug, Clone)]
pub struct SnapConfig {
    /// Ensemble models, labels and normalization
    pub classifier: ClassifierConfig,
    /// Plant catalog JSON
    pub catalog_path: PathBuf,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            classifier: ClassifierConfig::ensemble(),
            catalog_path: PathBuf::from("plant_catalog.json"),
        }
    }
}

impl SnapConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            classifier: ClassifierConfig::ensemble_from_env(),
            catalog_path: std::env::var("PLANT_CATALOG_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("plant_catalog.json")),
        }
    }

    /// Load the classifier and the catalog.
    pub fn load(&self) -> InferenceResult<(LeafClassifier, PlantCatalog)> {
        let classifier = LeafClassifier::from_config(&self.classifier)?;
        let catalog = PlantCatalog::load(&self.catalog_path)?;
        Ok((classifier, catalog))
    }
}

/// Classify `image` and attach its catalog entry.
pub fn identify(
    classifier: &LeafClassifier,
    catalog: &PlantCatalog,
    image: &Path,
) -> InferenceResult<PlantReport> {
    let prediction = classifier.classify_path(image)?;
    info!(
        image = %image.display(),
        index = prediction.index,
        label = %prediction.label,
        confidence = prediction.confidence,
        "Leaf identified"
    );
    Ok(catalog.report(prediction))
}
