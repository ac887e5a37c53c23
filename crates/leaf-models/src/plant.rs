//! Plant reference data shown next to a prediction.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::prediction::{Prediction, UNKNOWN_LABEL};

/// Reference entry for one class index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PlantProfile {
    pub scientific_name: String,
    pub info: String,
    pub link: String,
}

impl PlantProfile {
    /// Profile used when the catalog has no entry for an index.
    pub fn unknown() -> Self {
        Self {
            scientific_name: UNKNOWN_LABEL.to_string(),
            info: UNKNOWN_LABEL.to_string(),
            link: UNKNOWN_LABEL.to_string(),
        }
    }
}

/// The four fields reported for a classified image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PlantReport {
    pub prediction: Prediction,
    pub profile: PlantProfile,
}

impl fmt::Display for PlantReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Prediction: {}", self.prediction.label)?;
        writeln!(f, "Scientific Name: {}", self.profile.scientific_name)?;
        writeln!(f, "Information: {}", self.profile.info)?;
        write!(f, "Link: {}", self.profile.link)
    }
}
