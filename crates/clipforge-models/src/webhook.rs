//! Render-farm completion webhook payload.

use serde::{Deserialize, Serialize};

use crate::render::RenderId;

/// Payload delivered by the render farm to the webhook endpoint when a
/// render finishes (successfully or not).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPayload {
    /// Render job identifier.
    pub render_id: RenderId,

    /// Bucket holding the render output.
    pub bucket_name: String,

    /// Output object key/location, present on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_file: Option<String>,

    /// Farm-reported error message, present on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Whether the farm considers the job finished successfully.
    pub done: bool,

    /// Optional accrued cost report.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub costs: Option<RenderCosts>,
}

impl WebhookPayload {
    /// A render only counts as completed when the farm reports `done` *and*
    /// an output location exists. `done` without output is a farm-side
    /// inconsistency and is treated as a failure.
    pub fn is_completed(&self) -> bool {
        self.done && self.output_file.is_some()
    }
}

/// Cost accounting attached by the render farm.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderCosts {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accrued_so_far: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_success_payload() {
        let json = r#"{
            "renderId": "r1",
            "bucketName": "renders",
            "outputFile": "s3://renders/out.mp4",
            "done": true,
            "costs": {"accruedSoFar": 0.02}
        }"#;
        let payload: WebhookPayload = serde_json::from_str(json).unwrap();
        assert!(payload.is_completed());
        assert_eq!(payload.render_id.as_str(), "r1");
        assert_eq!(payload.costs.unwrap().accrued_so_far, Some(0.02));
    }

    #[test]
    fn test_parse_failure_payload() {
        let json = r#"{"renderId": "r2", "bucketName": "renders", "error": "boom", "done": false}"#;
        let payload: WebhookPayload = serde_json::from_str(json).unwrap();
        assert!(!payload.is_completed());
        assert_eq!(payload.error.as_deref(), Some("boom"));
    }

    #[test]
    fn test_done_without_output_is_not_completed() {
        let json = r#"{"renderId": "r3", "bucketName": "renders", "done": true}"#;
        let payload: WebhookPayload = serde_json::from_str(json).unwrap();
        assert!(!payload.is_completed());
    }
}
