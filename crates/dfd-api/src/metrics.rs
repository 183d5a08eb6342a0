//! Prometheus metrics for the API server.

use axum::body::Body;
use axum::extract::MatchedPath;
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
    pub const HTTP_REQUESTS_TOTAL: &str = "dfd_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "dfd_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "dfd_http_requests_in_flight";

    // Analysis metrics
    pub const ANALYSES_TOTAL: &str = "dfd_analyses_total";
    pub const INVALID_VIDEOS_TOTAL: &str = "dfd_invalid_videos_total";
    pub const ANALYSIS_FAILURES_TOTAL: &str = "dfd_analysis_failures_total";
    pub const DOWNLOAD_DURATION_SECONDS: &str = "dfd_download_duration_seconds";
    pub const PREDICTION_DURATION_SECONDS: &str = "dfd_prediction_duration_seconds";
    pub const UPLOAD_BYTES_TOTAL: &str = "dfd_upload_bytes_total";

    // Report metrics
    pub const REPORTS_GENERATED_TOTAL: &str = "dfd_reports_generated_total";

    // Rate limiting metrics
    pub const RATE_LIMIT_HITS_TOTAL: &str = "dfd_rate_limit_hits_total";
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", path.to_string()),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record a completed prediction.
pub fn record_analysis(source: &str, verdict: &str) {
    let labels = [
        ("source", source.to_string()),
        ("verdict", verdict.to_string()),
    ];
    counter!(names::ANALYSES_TOTAL, &labels).increment(1);
}

/// Record a file rejected by the video validator.
pub fn record_invalid_video(source: &str) {
    let labels = [("source", source.to_string())];
    counter!(names::INVALID_VIDEOS_TOTAL, &labels).increment(1);
}

/// Record an analysis that ended in an error.
pub fn record_analysis_failure(source: &str, stage: &str) {
    let labels = [
        ("source", source.to_string()),
        ("stage", stage.to_string()),
    ];
    counter!(names::ANALYSIS_FAILURES_TOTAL, &labels).increment(1);
}

/// Record download duration.
pub fn record_download_duration(duration_secs: f64) {
    histogram!(names::DOWNLOAD_DURATION_SECONDS).record(duration_secs);
}

/// Record prediction duration.
pub fn record_prediction_duration(duration_secs: f64) {
    histogram!(names::PREDICTION_DURATION_SECONDS).record(duration_secs);
}

/// Record bytes written by an upload.
pub fn record_upload_bytes(bytes: usize) {
    counter!(names::UPLOAD_BYTES_TOTAL).increment(bytes as u64);
}

/// Record a generated PDF report.
pub fn record_report_generated() {
    counter!(names::REPORTS_GENERATED_TOTAL).increment(1);
}

/// Record rate limit hit.
pub fn record_rate_limit_hit(endpoint: &str) {
    let labels = [("endpoint", endpoint.to_string())];
    counter!(names::RATE_LIMIT_HITS_TOTAL, &labels).increment(1);
}

/// Route template for metrics labels, so label cardinality stays bounded.
fn route_label(request: &Request<Body>) -> String {
    request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string())
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = route_label(&request);
    let start = Instant::now();

    // Increment in-flight counter
    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);

    let response = next.run(request).await;

    // Decrement in-flight counter
    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    let status = response.status().as_u16();
    let duration = start.elapsed().as_secs_f64();

    record_http_request(&method, &path, status, duration);

    response
}
