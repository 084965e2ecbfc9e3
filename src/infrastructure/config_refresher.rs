//! Configuration Refresher
//!
//! Background task that periodically triggers a configuration refresh. The
//! trigger fires every `poll_interval`; the provider itself decides whether
//! its cache window elapsed and the store must be contacted. Published
//! changes are logged as they arrive.

use crate::application::{ConfigChange, ConfigProvider, RefreshOutcome};
use crate::domain::ports::ConfigStoreError;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Default refresh trigger interval.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Periodic refresh driver for a ConfigProvider.
pub struct ConfigRefresher {
    provider: Arc<ConfigProvider>,
    poll_interval: Duration,
}

impl ConfigRefresher {
    pub fn new(provider: Arc<ConfigProvider>, poll_interval: Duration) -> Self {
        Self {
            provider,
            poll_interval,
        }
    }

    /// Run one trigger: refresh when expired. Errors are logged by the
    /// provider and returned for callers that care.
    pub async fn tick(&self) -> Result<RefreshOutcome, ConfigStoreError> {
        self.provider.refresh_if_expired().await
    }

    /// Start the refresh loop.
    ///
    /// The loop stops when the shutdown channel fires or is closed.
    pub fn start(self: Arc<Self>, mut shutdown: broadcast::Receiver<()>) -> JoinHandle<()> {
        let mut changes = self.provider.subscribe();

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.poll_interval);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // First tick completes immediately, the snapshot is fresh at startup
            interval.tick().await;

            tracing::debug!(interval = ?self.poll_interval, "configuration refresher started");

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        let _ = self.tick().await;
                    }
                    change = changes.recv() => match change {
                        Ok(change) => log_change(&change),
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "configuration change log lagged");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                    _ = shutdown.recv() => {
                        tracing::debug!("configuration refresher stopped");
                        break;
                    }
                }
            }
        })
    }
}

fn log_change(change: &ConfigChange) {
    match change {
        ConfigChange::BreedChanged { old, new } => {
            tracing::info!(%old, %new, "breed changed");
        }
        ConfigChange::FlagChanged { name, enabled } => {
            tracing::info!(flag = %name, enabled, "feature flag changed");
        }
        ConfigChange::Reloaded { revision } => {
            tracing::info!(revision, "configuration reloaded");
        }
    }
}
