//! Render farm HTTP client.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};

use clipforge_models::RenderId;

use crate::error::{RenderError, RenderResult};
use crate::types::{DispatchRequest, DispatchResponse};

/// Configuration for the render farm client.
#[derive(Debug, Clone)]
pub struct RenderFarmConfig {
    /// Base URL of the render farm API.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
    /// Max retries for idempotent calls.
    pub max_retries: u32,
}

impl Default for RenderFarmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout: Duration::from_secs(120),
            max_retries: 2,
        }
    }
}

impl RenderFarmConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("RENDER_FARM_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            timeout: Duration::from_secs(
                std::env::var("RENDER_FARM_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(120),
            ),
            max_retries: std::env::var("RENDER_FARM_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(2),
        }
    }
}

/// Client for the external render farm.
pub struct RenderFarmClient {
    http: Client,
    config: RenderFarmConfig,
}

impl RenderFarmClient {
    /// Create a new client.
    pub fn new(config: RenderFarmConfig) -> RenderResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(RenderError::Network)?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> RenderResult<Self> {
        Self::new(RenderFarmConfig::from_env())
    }

    /// Check if the farm is reachable.
    pub async fn health_check(&self) -> bool {
        let url = format!("{}/health", self.config.base_url);
        match self.http.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                warn!("Render farm health check error: {}", e);
                false
            }
        }
    }

    /// Dispatch a render job.
    ///
    /// Not retried: a duplicate dispatch would start a second paid render.
    /// The caller surfaces any error to the client instead.
    pub async fn dispatch(&self, request: &DispatchRequest) -> RenderResult<DispatchResponse> {
        let url = format!("{}/renders", self.config.base_url);

        debug!(composition = %request.composition, "Dispatching render to {}", url);

        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(RenderError::Network)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RenderError::RequestFailed(format!(
                "Render farm returned {}: {}",
                status, body
            )));
        }

        let dispatch: DispatchResponse = response
            .json()
            .await
            .map_err(|e| RenderError::InvalidResponse(e.to_string()))?;
        Ok(dispatch)
    }

    /// Query progress for a render job. Passed through to the caller as-is.
    ///
    /// Idempotent, so network errors and farm 5xx responses are retried.
    pub async fn progress(&self, render_id: &RenderId) -> RenderResult<serde_json::Value> {
        let url = format!("{}/renders/{}/progress", self.config.base_url, render_id);

        let response = self
            .with_retry(|| async {
                let response = self
                    .http
                    .get(&url)
                    .send()
                    .await
                    .map_err(RenderError::Network)?;

                if response.status().is_server_error() {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    return Err(RenderError::ServiceUnavailable(format!(
                        "Render farm returned {}: {}",
                        status, body
                    )));
                }

                Ok(response)
            })
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RenderError::RequestFailed(format!(
                "Render farm returned {}: {}",
                status, body
            )));
        }

        let progress: serde_json::Value = response.json().await?;
        Ok(progress)
    }

    /// Execute with retry and exponential backoff.
    async fn with_retry<F, Fut, T>(&self, operation: F) -> RenderResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = RenderResult<T>>,
    {
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    let delay = Duration::from_millis(500 * 2u64.pow(attempt));
                    warn!(
                        "Render farm request failed (attempt {}), retrying in {:?}: {}",
                        attempt + 1,
                        delay,
                        e
                    );
                    tokio::time::sleep(delay).await;
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or(RenderError::RequestFailed("Unknown error".to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::WebhookRegistration;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> RenderFarmClient {
        client_with_retries(server, 0)
    }

    fn client_with_retries(server: &MockServer, max_retries: u32) -> RenderFarmClient {
        RenderFarmClient::new(RenderFarmConfig {
            base_url: server.uri(),
            timeout: Duration::from_secs(5),
            max_retries,
        })
        .unwrap()
    }

    #[test]
    fn test_config_defaults() {
        let config = RenderFarmConfig::default();
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.timeout, Duration::from_secs(120));
    }

    #[tokio::test]
    async fn test_dispatch_success() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/renders"))
            .and(body_partial_json(serde_json::json!({
                "composition": "SocialClip",
                "webhook": {"url": "http://api/webhook"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "renderId": "r-1",
                "bucketName": "render-output"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let request = DispatchRequest::new("SocialClip").with_webhook(WebhookRegistration {
            url: "http://api/webhook".to_string(),
            secret: "s3cret".to_string(),
        });

        let response = client_for(&server).dispatch(&request).await.unwrap();
        assert_eq!(response.render_id.as_str(), "r-1");
        assert_eq!(response.bucket_name, "render-output");
    }

    #[tokio::test]
    async fn test_dispatch_error_is_surfaced() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/renders"))
            .respond_with(ResponseTemplate::new(500).set_body_string("farm exploded"))
            .expect(1)
            .mount(&server)
            .await;

        let result = client_for(&server)
            .dispatch(&DispatchRequest::new("SocialClip"))
            .await;

        match result {
            Err(RenderError::RequestFailed(msg)) => assert!(msg.contains("farm exploded")),
            other => panic!("expected RequestFailed, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_progress_passthrough() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/renders/r-1/progress"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "done": false,
                "overallProgress": 0.4
            })))
            .mount(&server)
            .await;

        let progress = client_for(&server)
            .progress(&RenderId::from("r-1"))
            .await
            .unwrap();
        assert_eq!(progress["overallProgress"], 0.4);
    }

    #[tokio::test]
    async fn test_progress_retries_transient_server_error() {
        let server = MockServer::start().await;

        // First delivery answers 503, every one after that succeeds.
        Mock::given(method("GET"))
            .and(path("/renders/r-1/progress"))
            .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/renders/r-1/progress"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "done": true,
                "overallProgress": 1.0
            })))
            .expect(1)
            .mount(&server)
            .await;

        let progress = client_with_retries(&server, 2)
            .progress(&RenderId::from("r-1"))
            .await
            .unwrap();
        assert_eq!(progress["overallProgress"], 1.0);
    }

    #[tokio::test]
    async fn test_progress_client_error_is_not_retried() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/renders/r-gone/progress"))
            .respond_with(ResponseTemplate::new(404).set_body_string("unknown render"))
            .expect(1)
            .mount(&server)
            .await;

        let result = client_with_retries(&server, 2)
            .progress(&RenderId::from("r-gone"))
            .await;

        match result {
            Err(RenderError::RequestFailed(msg)) => assert!(msg.contains("404")),
            other => panic!("expected RequestFailed, got {:?}", other.map(|_| ())),
        }
    }
}
