//! Built-in class label sets.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Which built-in label table a model was trained against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum LabelSet {
    /// 80 classes used by the single-model HTTP service.
    #[default]
    Server,

    /// 97 classes used by the Swin transformer ensemble.
    Ensemble,
}

impl LabelSet {
    pub fn as_str(&self) -> &'static str {
        match self {
            LabelSet::Server => "server",
            LabelSet::Ensemble => "ensemble",
        }
    }
}

impl fmt::Display for LabelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LabelSet {
    type Err = LabelSetParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "server" | "tflite" => Ok(LabelSet::Server),
            "ensemble" | "swin" => Ok(LabelSet::Ensemble),
            _ => Err(LabelSetParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown label set: {0}")]
pub struct LabelSetParseError(String);
