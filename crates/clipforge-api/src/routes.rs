//! API routes.

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;

use crate::handlers::{dispatch_render, get_progress, health, ready, receive_webhook};
use crate::metrics::metrics_middleware;
use crate::middleware::{cors_layer, request_id, request_logging, security_headers};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let mut router = Router::new()
        // Render dispatch
        .route("/render", post(dispatch_render))
        .route("/progress/:render_id", get(get_progress))
        // Render farm completion callbacks
        .route("/webhook", post(receive_webhook))
        // Health
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/ready", get(ready));

    if let Some(handle) = metrics_handle {
        router = router.route("/metrics", get(move || async move { handle.render() }));
    }

    router
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn(request_id))
        .layer(middleware::from_fn(request_logging))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(cors_layer(&state.config.cors_origins))
        .layer(DefaultBodyLimit::max(state.config.max_body_size))
        .with_state(state)
}
