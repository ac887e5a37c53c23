//! Axum HTTP inference server.
//!
//! This crate provides:
//! - `POST /predict/` (label + confidence) and `POST /predict/raw/` (score vector)
//! - Liveness and readiness probes with model metadata
//! - CORS, request ID, request logging and security headers
//! - Prometheus metrics

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
