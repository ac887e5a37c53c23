//! Command-line front ends for the leaf classifier.
//!
//! - `PredictClient`: posts an image to a running `/predict/` endpoint
//! - `identify`: runs the local ensemble and looks the result up in the
//!   plant catalog

pub mod args;
pub mod client;
pub mod error;
pub mod snap;

pub use args::{PredictArgs, SnapArgs};
pub use client::{ClientConfig, PredictClient, DEFAULT_PREDICT_URL};
pub use error::{ClientError, ClientResult};
pub use snap::{identify, SnapConfig, NO_IMAGE_MESSAGE};

/// Initialize tracing for the command-line tools.
///
/// Logs go to stderr so stdout stays clean for the tool's output.
pub fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let mut env_filter = EnvFilter::from_default_env();
    for directive in ["leaf=warn", "leaf_client=info", "ort=warn"] {
        if let Ok(d) = directive.parse() {
            env_filter = env_filter.add_directive(d);
        }
    }

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false),
            )
            .with(env_filter)
            .init();
    }
}
