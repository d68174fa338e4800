//! Application state.

use std::sync::Arc;
use std::time::Duration;

use clipforge_notify::{RecordStore, SlackNotifier};
use clipforge_registry::PendingRegistry;
use clipforge_render::RenderFarmClient;

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub registry: Arc<PendingRegistry>,
    pub farm: Arc<RenderFarmClient>,
    pub slack: Arc<SlackNotifier>,
    pub records: Arc<RecordStore>,
    /// Plain HTTP client for resume-URL forwarding.
    pub http: reqwest::Client,
}

impl AppState {
    /// Create new application state from the environment.
    pub fn new(config: ApiConfig) -> anyhow::Result<Self> {
        let registry = PendingRegistry::from_env();
        let farm = RenderFarmClient::from_env()?;
        let slack = SlackNotifier::from_env();
        let records = RecordStore::from_env();

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            config,
            registry: Arc::new(registry),
            farm: Arc::new(farm),
            slack: Arc::new(slack),
            records: Arc::new(records),
            http,
        })
    }
}
