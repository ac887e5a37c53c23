//! Smoke test: POST an image to a running server and print the JSON reply.

use anyhow::Context;
use clap::Parser;
use leaf_client::{init_tracing, ClientConfig, ClientError, PredictArgs, PredictClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    // Install rustls crypto provider (required for rustls 0.23+)
    let _ = rustls::crypto::ring::default_provider().install_default();

    let args = PredictArgs::parse();
    let config = ClientConfig::new(&args.url).context("invalid prediction URL")?;
    let client = PredictClient::new(config)?;

    match client.predict_file(&args.image).await {
        Ok(response) => {
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(())
        }
        // The server's JSON error body is the useful output here.
        Err(ClientError::Status {
            status,
            body: Some(body),
            ..
        }) => {
            println!("{}", serde_json::to_string_pretty(&body)?);
            eprintln!("server returned HTTP {}", status);
            std::process::exit(1);
        }
        Err(e) => Err(e)
            .with_context(|| format!("prediction request for {} failed", args.image.display())),
    }
}
