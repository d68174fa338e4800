//! Slack chat notifications.

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use clipforge_models::{BusinessRefs, RenderId};

use crate::error::{NotifyError, NotifyResult};

const CHAT_POST_MESSAGE_URL: &str = "https://slack.com/api/chat.postMessage";

/// Slack configuration.
#[derive(Debug, Clone, Default)]
pub struct SlackConfig {
    /// Bot token; notifications are skipped when absent.
    pub bot_token: Option<String>,
    /// Channel to post to; notifications are skipped when absent.
    pub channel_id: Option<String>,
    /// API base URL override, for tests.
    pub api_url: Option<String>,
}

impl SlackConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            bot_token: std::env::var("SLACK_BOT_TOKEN").ok().filter(|s| !s.is_empty()),
            channel_id: std::env::var("SLACK_CHANNEL_ID").ok().filter(|s| !s.is_empty()),
            api_url: None,
        }
    }
}

#[derive(Deserialize)]
struct PostMessageResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Chat notifier posting render outcomes to a Slack channel.
pub struct SlackNotifier {
    http: Client,
    config: SlackConfig,
}

impl SlackNotifier {
    /// Create a new notifier.
    pub fn new(config: SlackConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    /// Create from environment variables.
    pub fn from_env() -> Self {
        Self::new(SlackConfig::from_env())
    }

    /// Whether both token and channel are configured.
    pub fn is_configured(&self) -> bool {
        self.config.bot_token.is_some() && self.config.channel_id.is_some()
    }

    /// Notify that a render completed with its output location.
    pub async fn notify_render_complete(
        &self,
        render_id: &RenderId,
        output_file: &str,
        refs: Option<&BusinessRefs>,
    ) -> NotifyResult<()> {
        let campaign = campaign_label(refs);
        let text = format!("Render complete: {}", campaign);
        let blocks = serde_json::json!([{
            "type": "section",
            "text": {
                "type": "mrkdwn",
                "text": format!(
                    "*Render Complete*\n\n*Campaign:* {}\n*Render ID:* `{}`\n*Output:* {}",
                    campaign, render_id, output_file
                ),
            }
        }]);

        self.post_message(&text, blocks).await
    }

    /// Notify that a render failed.
    pub async fn notify_render_failed(
        &self,
        render_id: &RenderId,
        error: &str,
        refs: Option<&BusinessRefs>,
    ) -> NotifyResult<()> {
        let campaign = campaign_label(refs);
        let text = format!("Render failed: {}", campaign);
        let blocks = serde_json::json!([{
            "type": "section",
            "text": {
                "type": "mrkdwn",
                "text": format!(
                    "*Render Failed*\n\n*Campaign:* {}\n*Render ID:* `{}`\n*Error:* {}",
                    campaign, render_id, error
                ),
            }
        }]);

        self.post_message(&text, blocks).await
    }

    /// Post a message to the configured channel.
    ///
    /// Skips (successfully) when Slack is not configured.
    pub async fn post_message(&self, text: &str, blocks: serde_json::Value) -> NotifyResult<()> {
        let (token, channel) = match (&self.config.bot_token, &self.config.channel_id) {
            (Some(t), Some(c)) => (t, c),
            _ => {
                debug!("Slack notification skipped - not configured");
                return Ok(());
            }
        };

        let url = self
            .config
            .api_url
            .as_deref()
            .unwrap_or(CHAT_POST_MESSAGE_URL);

        let response = self
            .http
            .post(url)
            .bearer_auth(token)
            .json(&serde_json::json!({
                "channel": channel,
                "text": text,
                "blocks": blocks,
            }))
            .send()
            .await
            .map_err(NotifyError::Network)?;

        if !response.status().is_success() {
            return Err(NotifyError::RequestFailed(format!(
                "Slack returned {}",
                response.status()
            )));
        }

        // Slack reports API-level errors inside a 200 body.
        let body: PostMessageResponse = response.json().await?;
        if !body.ok {
            return Err(NotifyError::Rejected(
                body.error.unwrap_or_else(|| "unknown slack error".to_string()),
            ));
        }

        info!("Slack notification sent: {}", truncate(text, 50));
        Ok(())
    }
}

fn campaign_label(refs: Option<&BusinessRefs>) -> String {
    refs.and_then(|r| r.campaign_id.clone())
        .unwrap_or_else(|| "(no campaign)".to_string())
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
