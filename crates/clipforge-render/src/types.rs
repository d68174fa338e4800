//! Wire types for the render farm API.

use serde::{Deserialize, Serialize};

use clipforge_models::{Codec, RenderId};

/// Completion-callback registration attached to a dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookRegistration {
    /// URL the farm calls when the render reaches a terminal state.
    pub url: String,
    /// Shared secret the farm uses to sign the callback body.
    pub secret: String,
}

/// Render dispatch request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchRequest {
    /// Composition identifier known to the farm.
    pub composition: String,

    /// Input parameters handed to the composition.
    #[serde(default)]
    pub input_props: serde_json::Value,

    /// Output codec.
    #[serde(default)]
    pub codec: Codec,

    /// Optional completion webhook.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook: Option<WebhookRegistration>,
}

impl DispatchRequest {
    pub fn new(composition: impl Into<String>) -> Self {
        Self {
            composition: composition.into(),
            input_props: serde_json::Value::Object(Default::default()),
            codec: Codec::default(),
            webhook: None,
        }
    }

    pub fn with_input_props(mut self, props: serde_json::Value) -> Self {
        self.input_props = props;
        self
    }

    pub fn with_codec(mut self, codec: Codec) -> Self {
        self.codec = codec;
        self
    }

    pub fn with_webhook(mut self, webhook: WebhookRegistration) -> Self {
        self.webhook = Some(webhook);
        self
    }
}

/// Render dispatch response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchResponse {
    /// Job identifier issued by the farm.
    pub render_id: RenderId,
    /// Bucket the output will land in.
    pub bucket_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_request_wire_shape() {
        let request = DispatchRequest::new("SocialClip")
            .with_input_props(serde_json::json!({"title": "Hello"}))
            .with_codec(Codec::H264);

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["composition"], "SocialClip");
        assert_eq!(json["inputProps"]["title"], "Hello");
        assert_eq!(json["codec"], "h264");
        assert!(json.get("webhook").is_none());
    }

    #[test]
    fn test_dispatch_response_parse() {
        let json = r#"{"renderId": "r-42", "bucketName": "render-output"}"#;
        let response: DispatchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.render_id.as_str(), "r-42");
        assert_eq!(response.bucket_name, "render-output");
    }
}
