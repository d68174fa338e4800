//! Render dispatch handlers.

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use clipforge_models::{BusinessRefs, Codec, RenderId};
use clipforge_registry::PendingRender;
use clipforge_render::{DispatchRequest, WebhookRegistration};

use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::state::AppState;

/// Render dispatch request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    /// Composition identifier known to the render farm.
    pub composition: String,

    /// Input parameters for the composition.
    #[serde(default)]
    pub input_props: Option<serde_json::Value>,

    /// Output codec, defaults to h264.
    pub codec: Option<Codec>,

    /// Workflow-resume URL to call back once the render finishes.
    pub callback_url: Option<String>,

    /// Business identifiers carried through to downstream notifications.
    pub business_refs: Option<BusinessRefs>,
}

/// Render dispatch response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderStartedResponse {
    pub render_id: RenderId,
    pub bucket_name: String,
    pub status: &'static str,
}

/// Dispatch a render to the farm.
///
/// When a callback URL or business refs are supplied, a pending-render entry
/// is registered *after* the dispatch succeeds, so a farm error leaves no
/// partial registry state behind.
pub async fn dispatch_render(
    State(state): State<AppState>,
    Json(body): Json<RenderRequest>,
) -> ApiResult<Json<RenderStartedResponse>> {
    if body.composition.trim().is_empty() {
        return Err(ApiError::bad_request("composition must not be empty"));
    }

    if let Some(callback_url) = &body.callback_url {
        validate_callback_url(callback_url)?;
    }

    let refs = body.business_refs.filter(|r| !r.is_empty());
    let callback_intent = body.callback_url.is_some() || refs.is_some();

    let mut request = DispatchRequest::new(&body.composition)
        .with_codec(body.codec.unwrap_or_default());
    if let Some(props) = body.input_props {
        request = request.with_input_props(props);
    }

    // The farm only signs and delivers a completion callback when one is
    // registered at dispatch time.
    if callback_intent {
        request = request.with_webhook(WebhookRegistration {
            url: state.config.webhook_url(),
            secret: state.config.webhook_secret.clone(),
        });
    }

    info!(composition = %body.composition, callback = callback_intent, "Dispatching render");

    let dispatch = match state.farm.dispatch(&request).await {
        Ok(d) => d,
        Err(e) => {
            metrics::record_render_dispatch_failure();
            return Err(e.into());
        }
    };

    if callback_intent {
        state
            .registry
            .insert(&dispatch.render_id, PendingRender::new(body.callback_url, refs));
        info!(render_id = %dispatch.render_id, "Registered pending render");
    }

    metrics::record_render_dispatched(callback_intent);

    Ok(Json(RenderStartedResponse {
        render_id: dispatch.render_id,
        bucket_name: dispatch.bucket_name,
        status: "started",
    }))
}

/// Query render progress from the farm (pass-through).
pub async fn get_progress(
    State(state): State<AppState>,
    Path(render_id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    let progress = state
        .farm
        .progress(&RenderId::from_string(&render_id))
        .await?;
    Ok(Json(progress))
}

fn validate_callback_url(raw: &str) -> ApiResult<()> {
    let parsed = url::Url::parse(raw)
        .map_err(|e| ApiError::bad_request(format!("Invalid callback URL: {}", e)))?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(ApiError::bad_request(format!(
            "Invalid callback URL scheme '{}', only http and https are allowed",
            scheme
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_callback_url() {
        assert!(validate_callback_url("https://n8n.example/resume?token=abc").is_ok());
        assert!(validate_callback_url("http://localhost:5678/resume").is_ok());
        assert!(validate_callback_url("ftp://example.com/resume").is_err());
        assert!(validate_callback_url("not a url").is_err());
    }
}
