//! Health check handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub services: ServiceStatus,
}

#[derive(Serialize)]
pub struct ServiceStatus {
    pub slack: bool,
    pub records: bool,
}

/// Health check endpoint.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: chrono::Utc::now().to_rfc3339(),
        services: ServiceStatus {
            slack: state.slack.is_configured(),
            records: state.records.is_configured(),
        },
    })
}

/// Readiness probe. Not ready until the render farm answers its health
/// endpoint; dispatches would only fail until then.
pub async fn ready(State(state): State<AppState>) -> StatusCode {
    if state.farm.health_check().await {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}
