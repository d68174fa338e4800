//! Record-store (Airtable-style) updates for clip records.

use reqwest::Client;
use tracing::{debug, info};

use clipforge_models::{RenderId, ResumePayload, ResumeStatus};

use crate::error::{NotifyError, NotifyResult};

const DEFAULT_BASE_URL: &str = "https://api.airtable.com/v0";
const CLIPS_TABLE: &str = "Clips";

/// Record store configuration.
#[derive(Debug, Clone, Default)]
pub struct RecordsConfig {
    /// API key; updates are skipped when absent.
    pub api_key: Option<String>,
    /// Base (workspace) identifier; updates are skipped when absent.
    pub base_id: Option<String>,
    /// API base URL override, for tests.
    pub base_url: Option<String>,
}

impl RecordsConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("AIRTABLE_API_KEY").ok().filter(|s| !s.is_empty()),
            base_id: std::env::var("AIRTABLE_BASE_ID").ok().filter(|s| !s.is_empty()),
            base_url: None,
        }
    }
}

/// Client persisting render state transitions to clip records.
pub struct RecordStore {
    http: Client,
    config: RecordsConfig,
}

impl RecordStore {
    /// Create a new record store client.
    pub fn new(config: RecordsConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    /// Create from environment variables.
    pub fn from_env() -> Self {
        Self::new(RecordsConfig::from_env())
    }

    /// Whether the store is configured.
    pub fn is_configured(&self) -> bool {
        self.config.api_key.is_some() && self.config.base_id.is_some()
    }

    /// Persist a render outcome onto the clip record.
    ///
    /// Skips (successfully) when the store is not configured.
    pub async fn update_render_result(
        &self,
        clip_id: &str,
        render_id: &RenderId,
        outcome: &ResumePayload,
    ) -> NotifyResult<()> {
        let (api_key, base_id) = match (&self.config.api_key, &self.config.base_id) {
            (Some(k), Some(b)) => (k, b),
            _ => {
                debug!("Record update skipped - store not configured");
                return Ok(());
            }
        };

        let base_url = self.config.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        let url = format!("{}/{}/{}/{}", base_url, base_id, CLIPS_TABLE, clip_id);

        let fields = match outcome.status {
            ResumeStatus::Completed => serde_json::json!({
                "Status": "Rendered",
                "Render ID": render_id.as_str(),
                "Video URL": outcome.output_file,
            }),
            ResumeStatus::Failed => serde_json::json!({
                "Status": "Render Failed",
                "Render ID": render_id.as_str(),
                "Render Error": outcome.error,
            }),
        };

        let response = self
            .http
            .patch(&url)
            .bearer_auth(api_key)
            .json(&serde_json::json!({ "fields": fields }))
            .send()
            .await
            .map_err(NotifyError::Network)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::RequestFailed(format!(
                "Record store returned {}: {}",
                status, body
            )));
        }

        info!(clip_id, render_id = %render_id, "Clip record updated");
        Ok(())
    }
}
