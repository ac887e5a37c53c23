//! Identify a leaf locally with the model ensemble.

use anyhow::Context;
use clap::Parser;
use leaf_client::{identify, init_tracing, SnapArgs, SnapConfig, NO_IMAGE_MESSAGE};

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let Some(image) = SnapArgs::parse().image else {
        println!("{}", NO_IMAGE_MESSAGE);
        std::process::exit(2);
    };

    let config = SnapConfig::from_env();
    let (classifier, catalog) = config.load().with_context(|| {
        format!(
            "failed to load models from {}",
            config.classifier.model_path
        )
    })?;

    let report = identify(&classifier, &catalog, &image)
        .with_context(|| format!("failed to classify {}", image.display()))?;

    println!("{}", report);
    Ok(())
}
