//! Render-completion webhook receiver.
//!
//! One state machine per job: `AWAITING_CALLBACK -> {COMPLETED, FAILED,
//! IGNORED}`. The contract with the render farm is deliberately narrow:
//! 401 for a bad signature, 200 for everything else. A farm that receives
//! 200 stops retrying, so malformed or already-consumed payloads must never
//! surface as errors — they would be redelivered forever.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Serialize;
use tracing::{debug, info, warn};

use clipforge_models::{BusinessRefs, RenderId, ResumePayload, ResumeStatus, WebhookPayload};

use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::signature::{self, SIGNATURE_HEADER};
use crate::state::AppState;

/// Webhook endpoint response. Always delivered with HTTP 200; the only
/// non-200 this endpoint produces is the 401 signature rejection.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookResponse {
    /// processed | ignored | error
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub render_id: Option<RenderId>,
    pub forwarded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Receive a render-completion callback from the farm.
pub async fn receive_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<WebhookResponse>> {
    // Step 1: authenticate over the exact raw bytes, before any parsing.
    let header = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            warn!("Webhook rejected: missing signature header");
            metrics::record_webhook("rejected");
            ApiError::unauthorized("Missing signature header")
        })?;

    if !signature::verify(&state.config.webhook_secret, &body, header) {
        warn!("Webhook rejected: invalid signature");
        metrics::record_webhook("rejected");
        return Err(ApiError::unauthorized("Invalid signature"));
    }

    // Step 2: parse. Malformed bodies are authenticated farm bugs; answer
    // 200 so the farm does not retry-storm the same broken payload.
    let payload: WebhookPayload = match serde_json::from_slice(&body) {
        Ok(p) => p,
        Err(e) => {
            warn!("Webhook payload malformed: {}", e);
            metrics::record_webhook("malformed");
            return Ok(Json(WebhookResponse {
                status: "error",
                render_id: None,
                forwarded: false,
                reason: None,
                error: Some(e.to_string()),
            }));
        }
    };

    info!(render_id = %payload.render_id, done = payload.done, "Received render webhook");

    // Step 3: atomically claim the pending entry. Absence means the job is
    // unknown, expired, or already consumed by an earlier delivery — all
    // benign, and the response does not reveal which.
    let Some(entry) = state.registry.take(&payload.render_id) else {
        info!(render_id = %payload.render_id, "No pending entry for webhook, ignoring");
        metrics::record_webhook("ignored");
        return Ok(Json(WebhookResponse {
            status: "ignored",
            render_id: Some(payload.render_id),
            forwarded: false,
            reason: Some("no_resume_url"),
            error: None,
        }));
    };

    let resume = ResumePayload::from_webhook(&payload);

    // Step 4: best-effort side channels. Failures are logged, never
    // escalated, and never block forwarding or cleanup.
    notify_side_channels(&state, &payload.render_id, &resume, entry.refs.as_ref()).await;

    // Step 5: resume the external workflow, if one registered for this job.
    let forwarded = match &entry.callback_url {
        Some(callback_url) => forward_resume(&state, callback_url, &resume).await,
        None => false,
    };

    metrics::record_webhook("processed");

    Ok(Json(WebhookResponse {
        status: "processed",
        render_id: Some(payload.render_id),
        forwarded,
        reason: None,
        error: None,
    }))
}

/// Post the outcome to chat and persist it to the record store.
async fn notify_side_channels(
    state: &AppState,
    render_id: &RenderId,
    resume: &ResumePayload,
    refs: Option<&BusinessRefs>,
) {
    let chat_result = match resume.status {
        ResumeStatus::Completed => {
            state
                .slack
                .notify_render_complete(
                    render_id,
                    resume.output_file.as_deref().unwrap_or_default(),
                    refs,
                )
                .await
        }
        ResumeStatus::Failed => {
            state
                .slack
                .notify_render_failed(
                    render_id,
                    resume.error.as_deref().unwrap_or("Render failed"),
                    refs,
                )
                .await
        }
    };
    if let Err(e) = chat_result {
        warn!(render_id = %render_id, "Chat notification failed: {}", e);
    }

    if let Some(clip_id) = refs.and_then(|r| r.clip_id.as_deref()) {
        if let Err(e) = state.records.update_render_result(clip_id, render_id, resume).await {
            warn!(render_id = %render_id, clip_id, "Record update failed: {}", e);
        }
    }
}

/// Fire the resume GET. Returns whether the callback endpoint was reached;
/// a non-2xx answer still counts as forwarded since the workflow engine owns
/// its own retry semantics.
async fn forward_resume(state: &AppState, callback_url: &str, resume: &ResumePayload) -> bool {
    let data = match serde_json::to_string(resume) {
        Ok(s) => s,
        Err(e) => {
            warn!("Failed to serialize resume payload: {}", e);
            metrics::record_forward_failure();
            return false;
        }
    };

    let separator = if callback_url.contains('?') { '&' } else { '?' };
    let url = format!("{}{}data={}", callback_url, separator, urlencoding::encode(&data));

    debug!(callback_url, "Forwarding resume payload");

    match state.http.get(&url).send().await {
        Ok(response) if response.status().is_success() => {
            info!(callback_url, "Workflow resume triggered");
            true
        }
        Ok(response) => {
            warn!(
                callback_url,
                status = %response.status(),
                "Workflow resume returned non-success"
            );
            metrics::record_forward_failure();
            true
        }
        Err(e) => {
            warn!(callback_url, "Failed to reach resume URL: {}", e);
            metrics::record_forward_failure();
            false
        }
    }
}
