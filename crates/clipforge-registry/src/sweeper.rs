//! Background task that periodically evicts expired pending renders.

use std::sync::Arc;

use tokio::time::interval;
use tracing::{debug, info};

use crate::registry::PendingRegistry;

/// Periodic TTL sweep over the pending-render registry.
///
/// Runs forever once started; spawn it as a background task from the binary.
pub struct RegistrySweeper {
    registry: Arc<PendingRegistry>,
    enabled: bool,
}

impl RegistrySweeper {
    /// Create a new sweeper.
    ///
    /// Can be disabled with `ENABLE_REGISTRY_SWEEP=false` (entries then live
    /// until claimed, which is only acceptable in tests).
    pub fn new(registry: Arc<PendingRegistry>) -> Self {
        let enabled = std::env::var("ENABLE_REGISTRY_SWEEP")
            .map(|v| v != "false" && v != "0")
            .unwrap_or(true);

        Self { registry, enabled }
    }

    /// Start the sweep loop.
    pub async fn run(&self) {
        if !self.enabled {
            info!("Registry sweep is disabled");
            return;
        }

        let sweep_interval = self.registry.config().sweep_interval;
        info!("Starting registry sweeper (interval: {:?})", sweep_interval);

        let mut ticker = interval(sweep_interval);
        // The first tick fires immediately; skip it so a fresh process does
        // not sweep an empty table.
        ticker.tick().await;

        loop {
            ticker.tick().await;

            let evicted = self.registry.sweep_once();
            if evicted > 0 {
                info!(evicted, pending = self.registry.len(), "Registry sweep complete");
            } else {
                debug!(pending = self.registry.len(), "Registry sweep found nothing to evict");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{PendingRender, RegistryConfig};
    use clipforge_models::RenderId;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_loop_evicts_over_time() {
        let registry = Arc::new(PendingRegistry::new(RegistryConfig {
            ttl: Duration::from_secs(30),
            sweep_interval: Duration::from_secs(10),
        }));
        registry.insert(&RenderId::from("r1"), PendingRender::new(None, None));

        let sweeper = RegistrySweeper {
            registry: Arc::clone(&registry),
            enabled: true,
        };
        let handle = tokio::spawn(async move { sweeper.run().await });

        // Before the TTL the entry survives every sweep.
        tokio::time::advance(Duration::from_secs(25)).await;
        tokio::task::yield_now().await;
        assert_eq!(registry.len(), 1);

        // One sweep interval past the TTL the entry is gone.
        tokio::time::advance(Duration::from_secs(20)).await;
        tokio::task::yield_now().await;
        assert!(registry.is_empty());

        handle.abort();
    }
}
