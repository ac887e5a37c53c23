//! Pixel normalization policies applied after resizing.
//!
//! - `None`: unscaled float pixels, 0-255
//! - `ImageNet`: scaled to [0, 1], then per-channel `(x - mean) / std`

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// ImageNet per-channel mean (RGB).
pub const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];

/// ImageNet per-channel standard deviation (RGB).
pub const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Normalization applied to each RGB pixel before inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    /// Keep raw 0-255 values.
    #[default]
    None,

    /// Scale to [0, 1] and standardize with ImageNet statistics.
    ImageNet,
}

impl Normalization {
    pub fn as_str(&self) -> &'static str {
        match self {
            Normalization::None => "none",
            Normalization::ImageNet => "imagenet",
        }
    }

    /// Normalize one 8-bit channel value.
    #[inline]
    pub fn apply(&self, value: u8, channel: usize) -> f32 {
        match self {
            Normalization::None => value as f32,
            Normalization::ImageNet => {
                (value as f32 / 255.0 - IMAGENET_MEAN[channel]) / IMAGENET_STD[channel]
            }
        }
    }
}

impl fmt::Display for Normalization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Normalization {
    type Err = NormalizationParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" | "raw" => Ok(Normalization::None),
            "imagenet" | "image_net" => Ok(Normalization::ImageNet),
            _ => Err(NormalizationParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown normalization: {0}")]
pub struct NormalizationParseError(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!("none".parse::<Normalization>().unwrap(), Normalization::None);
        assert_eq!("ImageNet".parse::<Normalization>().unwrap(), Normalization::ImageNet);
        assert!("zscore".parse::<Normalization>().is_err());
    }

    #[test]
    fn test_none_keeps_pixel_range() {
        assert_eq!(Normalization::None.apply(0, 0), 0.0);
        assert_eq!(Normalization::None.apply(255, 2), 255.0);
    }

    #[test]
    fn test_imagenet_standardizes() {
        // A pixel equal to the channel mean maps to zero.
        let red_mean = (0.485f32 * 255.0).round() as u8;
        assert!(Normalization::ImageNet.apply(red_mean, 0).abs() < 0.01);

        let white = Normalization::ImageNet.apply(255, 1);
        assert!((white - (1.0 - 0.456) / 0.224).abs() < 1e-5);
    }
}
