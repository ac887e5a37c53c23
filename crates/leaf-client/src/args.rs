//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

use crate::client::DEFAULT_PREDICT_URL;

/// Upload an image to a running server and print its JSON reply.
#[derive(Debug, Parser)]
#[command(name = "leaf-predict", version)]
pub struct PredictArgs {
    /// Image file to classify
    pub image: PathBuf,
    /// Prediction endpoint
    #[arg(env = "LEAF_API_URL", default_value = DEFAULT_PREDICT_URL)]
    pub url: String,
}

/// Identify a leaf locally with the model ensemble.
#[derive(Debug, Parser)]
#[command(name = "leafsnap", version)]
pub struct SnapArgs {
    /// Image file to identify
    pub image: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predict_args() {
        let args = PredictArgs::try_parse_from(["leaf-predict", "neem.jpg", "http://10.0.0.5:8000/predict/"])
            .unwrap();
        assert_eq!(args.image, PathBuf::from("neem.jpg"));
        assert_eq!(args.url, "http://10.0.0.5:8000/predict/");

        assert!(PredictArgs::try_parse_from(["leaf-predict"]).is_err());
    }

    #[test]
    fn test_snap_args_image_optional() {
        let args = SnapArgs::try_parse_from(["leafsnap"]).unwrap();
        assert!(args.image.is_none());

        let args = SnapArgs::try_parse_from(["leafsnap", "leaf.png"]).unwrap();
        assert_eq!(args.image, Some(PathBuf::from("leaf.png")));
    }
}
