//! Downstream payload forwarded to the registered workflow-resume URL.

use serde::{Deserialize, Serialize};

use crate::render::RenderId;
use crate::webhook::WebhookPayload;

/// Terminal classification of a render as seen by the downstream workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResumeStatus {
    Completed,
    Failed,
}

impl ResumeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResumeStatus::Completed => "completed",
            ResumeStatus::Failed => "failed",
        }
    }
}

/// Payload appended (URL-encoded) to the resume URL when a render reaches a
/// terminal state. `outputFile` and `error` are always present, as explicit
/// nulls when absent, so the workflow can branch on them without existence
/// checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumePayload {
    pub status: ResumeStatus,
    pub render_id: RenderId,
    pub output_file: Option<String>,
    pub error: Option<String>,
}

impl ResumePayload {
    /// Classify a webhook payload into the downstream resume payload.
    pub fn from_webhook(payload: &WebhookPayload) -> Self {
        if payload.is_completed() {
            Self {
                status: ResumeStatus::Completed,
                render_id: payload.render_id.clone(),
                output_file: payload.output_file.clone(),
                error: None,
            }
        } else {
            Self {
                status: ResumeStatus::Failed,
                render_id: payload.render_id.clone(),
                output_file: None,
                error: Some(
                    payload
                        .error
                        .clone()
                        .unwrap_or_else(|| "Render failed".to_string()),
                ),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn webhook(done: bool, output: Option<&str>, error: Option<&str>) -> WebhookPayload {
        WebhookPayload {
            render_id: RenderId::from("r1"),
            bucket_name: "renders".to_string(),
            output_file: output.map(String::from),
            error: error.map(String::from),
            done,
            costs: None,
        }
    }

    #[test]
    fn test_completed_classification() {
        let payload = ResumePayload::from_webhook(&webhook(true, Some("s3://b/out.mp4"), None));
        assert_eq!(payload.status, ResumeStatus::Completed);
        assert_eq!(payload.output_file.as_deref(), Some("s3://b/out.mp4"));
        assert!(payload.error.is_none());
    }

    #[test]
    fn test_failed_classification_carries_error() {
        let payload = ResumePayload::from_webhook(&webhook(false, None, Some("timeout")));
        assert_eq!(payload.status, ResumeStatus::Failed);
        assert_eq!(payload.error.as_deref(), Some("timeout"));
        assert!(payload.output_file.is_none());
    }

    #[test]
    fn test_failed_classification_default_error() {
        let payload = ResumePayload::from_webhook(&webhook(false, None, None));
        assert_eq!(payload.error.as_deref(), Some("Render failed"));
    }

    #[test]
    fn test_done_without_output_is_failed() {
        let payload = ResumePayload::from_webhook(&webhook(true, None, None));
        assert_eq!(payload.status, ResumeStatus::Failed);
    }

    #[test]
    fn test_nulls_are_explicit_on_the_wire() {
        let payload = ResumePayload::from_webhook(&webhook(true, Some("out.mp4"), None));
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["status"], "completed");
        assert_eq!(json["renderId"], "r1");
        assert_eq!(json["outputFile"], "out.mp4");
        assert!(json["error"].is_null());
        assert!(json.as_object().unwrap().contains_key("error"));
    }
}
