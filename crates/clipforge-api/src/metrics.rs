//! Prometheus metrics for the API server.

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Instant;

/// Initialize the Prometheus metrics recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> PrometheusHandle {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus recorder")
}

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "clipforge_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "clipforge_http_request_duration_seconds";

    // Dispatch metrics
    pub const RENDERS_DISPATCHED_TOTAL: &str = "clipforge_renders_dispatched_total";
    pub const RENDER_DISPATCH_FAILURES_TOTAL: &str = "clipforge_render_dispatch_failures_total";

    // Webhook metrics
    pub const WEBHOOKS_TOTAL: &str = "clipforge_webhooks_total";
    pub const RESUME_FORWARD_FAILURES_TOTAL: &str = "clipforge_resume_forward_failures_total";
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

/// Record a successful render dispatch.
pub fn record_render_dispatched(with_callback: bool) {
    let labels = [("callback", with_callback.to_string())];
    counter!(names::RENDERS_DISPATCHED_TOTAL, &labels).increment(1);
}

/// Record a failed render dispatch.
pub fn record_render_dispatch_failure() {
    counter!(names::RENDER_DISPATCH_FAILURES_TOTAL).increment(1);
}

/// Record a webhook delivery by outcome
/// (processed / ignored / rejected / malformed).
pub fn record_webhook(outcome: &'static str) {
    let labels = [("outcome", outcome.to_string())];
    counter!(names::WEBHOOKS_TOTAL, &labels).increment(1);
}

/// Record a failed resume forward.
pub fn record_forward_failure() {
    counter!(names::RESUME_FORWARD_FAILURES_TOTAL).increment(1);
}

/// Sanitize path for metrics labels (collapse render ids).
fn sanitize_path(path: &str) -> String {
    let path = regex_lite::Regex::new(r"/progress/[^/]+")
        .unwrap()
        .replace_all(path, "/progress/:render_id");
    path.to_string()
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    record_http_request(
        &method,
        &path,
        response.status().as_u16(),
        start.elapsed().as_secs_f64(),
    );

    response
}
