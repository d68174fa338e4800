//! Pending-render table keyed by render id.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;
use tracing::warn;

use clipforge_models::{BusinessRefs, RenderId};

/// Default time-to-live for a pending render (30 minutes).
pub const DEFAULT_TTL_SECS: u64 = 30 * 60;

/// Default interval between TTL sweeps (5 minutes).
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 5 * 60;

/// Metric name for sweep evictions.
pub const EVICTIONS_METRIC: &str = "clipforge_registry_evictions_total";

/// Registry configuration.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Maximum age of an entry before the sweep evicts it.
    pub ttl: Duration,
    /// Interval between sweep runs.
    pub sweep_interval: Duration,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(DEFAULT_TTL_SECS),
            sweep_interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
        }
    }
}

impl RegistryConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            ttl: Duration::from_secs(
                std::env::var("PENDING_RENDER_TTL_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_TTL_SECS),
            ),
            sweep_interval: Duration::from_secs(
                std::env::var("REGISTRY_SWEEP_INTERVAL_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_SWEEP_INTERVAL_SECS),
            ),
        }
    }
}

/// Callback metadata stored for one dispatched render.
///
/// Immutable after insertion; owned exclusively by the registry.
#[derive(Debug, Clone)]
pub struct PendingRender {
    /// Workflow-resume URL to notify on completion, if any.
    pub callback_url: Option<String>,
    /// Associated business identifiers for downstream notification.
    pub refs: Option<BusinessRefs>,
    /// Insertion time, used for expiry.
    pub created_at: Instant,
}

impl PendingRender {
    pub fn new(callback_url: Option<String>, refs: Option<BusinessRefs>) -> Self {
        Self {
            callback_url,
            refs,
            created_at: Instant::now(),
        }
    }

    /// Whether the entry has outlived the given TTL.
    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.created_at.elapsed() >= ttl
    }
}

/// In-memory table of renders awaiting their completion webhook.
///
/// All mutation happens under one mutex with short critical sections, so the
/// table is safe under the multi-threaded runtime. `take` removes and returns
/// in a single locked step, which makes duplicate webhook deliveries race-free:
/// only one delivery can claim an entry, the rest observe absence.
pub struct PendingRegistry {
    entries: Mutex<HashMap<String, PendingRender>>,
    config: RegistryConfig,
}

impl PendingRegistry {
    /// Create a new registry.
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            config,
        }
    }

    /// Create from environment variables.
    pub fn from_env() -> Self {
        Self::new(RegistryConfig::from_env())
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Register callback metadata for a dispatched render.
    ///
    /// At most one entry exists per render id; a second insert for the same
    /// id replaces the first, which indicates a duplicate dispatch upstream.
    pub fn insert(&self, render_id: &RenderId, entry: PendingRender) {
        let mut entries = self.entries.lock().expect("registry mutex poisoned");
        if entries.insert(render_id.as_str().to_string(), entry).is_some() {
            warn!(render_id = %render_id, "Replaced existing pending render entry");
        }
    }

    /// Atomically remove and return the entry for a render id.
    ///
    /// Returns `None` if the render is unknown, already claimed, or expired
    /// out by the sweep.
    pub fn take(&self, render_id: &RenderId) -> Option<PendingRender> {
        let mut entries = self.entries.lock().expect("registry mutex poisoned");
        entries.remove(render_id.as_str())
    }

    /// Whether an entry currently exists for a render id.
    pub fn contains(&self, render_id: &RenderId) -> bool {
        let entries = self.entries.lock().expect("registry mutex poisoned");
        entries.contains_key(render_id.as_str())
    }

    /// Number of pending entries.
    pub fn len(&self) -> usize {
        let entries = self.entries.lock().expect("registry mutex poisoned");
        entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Evict all entries older than the TTL, logging each eviction.
    ///
    /// Returns the number of entries removed.
    pub fn sweep_once(&self) -> usize {
        let ttl = self.config.ttl;
        let mut entries = self.entries.lock().expect("registry mutex poisoned");

        let expired: Vec<String> = entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(ttl))
            .map(|(id, _)| id.clone())
            .collect();

        for render_id in &expired {
            entries.remove(render_id);
            warn!(render_id = %render_id, "Evicted stale pending render (no webhook received)");
        }

        if !expired.is_empty() {
            metrics::counter!(EVICTIONS_METRIC).increment(expired.len() as u64);
        }

        expired.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(ttl_secs: u64) -> PendingRegistry {
        PendingRegistry::new(RegistryConfig {
            ttl: Duration::from_secs(ttl_secs),
            sweep_interval: Duration::from_secs(1),
        })
    }

    #[tokio::test]
    async fn test_insert_and_take() {
        let reg = registry(60);
        let id = RenderId::from("r1");

        reg.insert(&id, PendingRender::new(Some("http://resume".to_string()), None));
        assert_eq!(reg.len(), 1);

        let entry = reg.take(&id).expect("entry should exist");
        assert_eq!(entry.callback_url.as_deref(), Some("http://resume"));
        assert!(reg.is_empty());
    }

    #[tokio::test]
    async fn test_take_is_claim_once() {
        let reg = registry(60);
        let id = RenderId::from("r1");

        reg.insert(&id, PendingRender::new(None, None));
        assert!(reg.take(&id).is_some());
        assert!(reg.take(&id).is_none(), "second take must observe absence");
    }

    #[tokio::test]
    async fn test_insert_replaces_duplicate_id() {
        let reg = registry(60);
        let id = RenderId::from("r1");

        reg.insert(&id, PendingRender::new(Some("http://first".to_string()), None));
        reg.insert(&id, PendingRender::new(Some("http://second".to_string()), None));

        assert_eq!(reg.len(), 1);
        let entry = reg.take(&id).unwrap();
        assert_eq!(entry.callback_url.as_deref(), Some("http://second"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_evicts_expired_entries() {
        let reg = registry(1800);
        reg.insert(&RenderId::from("old"), PendingRender::new(None, None));

        // Not yet expired
        tokio::time::advance(Duration::from_secs(900)).await;
        assert_eq!(reg.sweep_once(), 0);
        assert_eq!(reg.len(), 1);

        reg.insert(&RenderId::from("young"), PendingRender::new(None, None));

        // "old" crosses the 30 minute TTL, "young" does not
        tokio::time::advance(Duration::from_secs(901)).await;
        assert_eq!(reg.sweep_once(), 1);
        assert_eq!(reg.len(), 1);
        assert!(reg.contains(&RenderId::from("young")));
        assert!(!reg.contains(&RenderId::from("old")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_absent_after_ttl_plus_sweep() {
        let reg = registry(1800);
        reg.insert(&RenderId::from("r1"), PendingRender::new(None, None));

        tokio::time::advance(Duration::from_secs(1800 + 300)).await;
        reg.sweep_once();

        assert!(!reg.contains(&RenderId::from("r1")));
    }
}
