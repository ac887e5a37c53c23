//! Plant reference tables indexed by class.
//!
//! Three parallel lists (scientific names, descriptions, reference links)
//! aligned with the ensemble label table. Stored as JSON:
//!
//! ```json
//! { "scientific_names": ["..."], "plants_info": ["..."], "links": ["..."] }
//! ```

use std::path::Path;

use leaf_models::{PlantProfile, PlantReport, Prediction, UNKNOWN_LABEL};
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{InferenceError, InferenceResult};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PlantCatalog {
    #[serde(default)]
    scientific_names: Vec<String>,
    #[serde(default)]
    plants_info: Vec<String>,
    #[serde(default, alias = "link")]
    links: Vec<String>,
}

impl PlantCatalog {
    pub fn new(scientific_names: Vec<String>, plants_info: Vec<String>, links: Vec<String>) -> Self {
        Self {
            scientific_names,
            plants_info,
            links,
        }
    }

    /// Load from a JSON file. A missing file gives an empty catalog.
    pub fn load(path: &Path) -> InferenceResult<Self> {
        if !path.exists() {
            warn!(path = %path.display(), "Plant catalog not found, reference fields will be Unknown");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let catalog: Self = serde_json::from_str(&content)
            .map_err(|e| InferenceError::Catalog(format!("{}: {}", path.display(), e)))?;

        if catalog.scientific_names.len() != catalog.plants_info.len()
            || catalog.plants_info.len() != catalog.links.len()
        {
            warn!(
                scientific_names = catalog.scientific_names.len(),
                plants_info = catalog.plants_info.len(),
                links = catalog.links.len(),
                "Plant catalog tables have different lengths"
            );
        }

        info!(path = %path.display(), entries = catalog.len(), "Plant catalog loaded");
        Ok(catalog)
    }

    /// Number of fully populated entries.
    pub fn len(&self) -> usize {
        self.scientific_names
            .len()
            .min(self.plants_info.len())
            .min(self.links.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reference entry for `index`. Missing fields read "Unknown".
    pub fn profile(&self, index: usize) -> PlantProfile {
        let field = |table: &[String]| {
            table
                .get(index)
                .cloned()
                .unwrap_or_else(|| UNKNOWN_LABEL.to_string())
        };

        PlantProfile {
            scientific_name: field(&self.scientific_names),
            info: field(&self.plants_info),
            link: field(&self.links),
        }
    }

    pub fn report(&self, prediction: Prediction) -> PlantReport {
        let profile = self.profile(prediction.index);
        PlantReport {
            prediction,
            profile,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> PlantCatalog {
        PlantCatalog::new(
            vec!["Aloe vera".into(), "Phyllanthus emblica".into()],
            vec!["Succulent".into(), "Indian gooseberry".into()],
            vec!["https://example.org/aloe".into(), "https://example.org/amla".into()],
        )
    }

    #[test]
    fn test_profile_lookup() {
        let profile = catalog().profile(1);
        assert_eq!(profile.scientific_name, "Phyllanthus emblica");
        assert_eq!(profile.info, "Indian gooseberry");
        assert_eq!(profile.link, "https://example.org/amla");
    }

    #[test]
    fn test_profile_out_of_range() {
        assert_eq!(catalog().profile(5), PlantProfile::unknown());
        assert_eq!(PlantCatalog::default().profile(0), PlantProfile::unknown());
    }

    #[test]
    fn test_report_uses_prediction_index() {
        let report = catalog().report(Prediction::new(0, "Aloevera", 4.0));
        assert_eq!(report.profile.scientific_name, "Aloe vera");
        assert_eq!(report.prediction.label, "Aloevera");
    }

    #[test]
    fn test_load_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(
            &path,
            r#"{"scientific_names": ["A"], "plants_info": ["B"], "link": ["C"]}"#,
        )
        .unwrap();

        let catalog = PlantCatalog::load(&path).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.profile(0).link, "C");
    }

    #[test]
    fn test_load_missing_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = PlantCatalog::load(&dir.path().join("none.json")).unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_load_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(PlantCatalog::load(&path), Err(InferenceError::Catalog(_))));
    }
}
