//! Prometheus metrics for the API server.

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use std::time::Instant;

/// Initialize the Prometheus metrics recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "leaf_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "leaf_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "leaf_http_requests_in_flight";
    pub const HTTP_ERRORS_TOTAL: &str = "leaf_http_errors_total";

    // Inference metrics
    pub const PREDICTIONS_TOTAL: &str = "leaf_predictions_total";
    pub const INFERENCE_DURATION_SECONDS: &str = "leaf_inference_duration_seconds";
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record a request that ended in an API error.
pub fn record_request_error(code: &str) {
    let labels = [("code", code.to_string())];
    counter!(names::HTTP_ERRORS_TOTAL, &labels).increment(1);
}

/// Record a served prediction.
pub fn record_prediction(contract: &str, unknown_label: bool) {
    let labels = [
        ("contract", contract.to_string()),
        ("unknown", unknown_label.to_string()),
    ];
    counter!(names::PREDICTIONS_TOTAL, &labels).increment(1);
}

/// Record time spent preprocessing and running the model.
pub fn record_inference_duration(contract: &str, duration_secs: f64) {
    let labels = [("contract", contract.to_string())];
    histogram!(names::INFERENCE_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Collapse unknown paths so scanners can't blow up label cardinality.
fn sanitize_path(path: &str) -> String {
    const KNOWN: &[&str] = &[
        "/predict",
        "/predict/",
        "/predict/raw",
        "/predict/raw/",
        "/health",
        "/healthz",
        "/ready",
        "/metrics",
    ];
    if KNOWN.contains(&path) {
        path.to_string()
    } else {
        "other".to_string()
    }
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);

    let response = next.run(request).await;

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    let status = response.status().as_u16();
    let duration = start.elapsed().as_secs_f64();

    record_http_request(&method, &path, status, duration);

    response
}
