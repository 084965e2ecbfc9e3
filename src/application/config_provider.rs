//! Configuration Provider
//!
//! Owns the process-wide configuration snapshot (breed + feature flags) and
//! refreshes it from a remote ConfigStore.
//!
//! Readers get an `Arc<ConfigSnapshot>`; the lock around it is held only to
//! clone or replace the pointer. All store I/O happens outside the lock, so
//! a refresh in progress never blocks readers and readers never see a
//! partially updated snapshot.

use crate::domain::entities::{BreedConfiguration, ConfigSnapshot, FeatureFlags};
use crate::domain::ports::{ConfigStore, ConfigStoreError};
use crate::domain::value_objects::{BreedName, EnvironmentName};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::broadcast;

/// Canonical configuration namespace.
pub const DEFAULT_NAMESPACE: &str = "SquadraExperience";

/// Default cache expiration for the watched key.
pub const DEFAULT_CACHE_EXPIRATION: Duration = Duration::from_secs(5);

/// Name of the flag gating the About page.
pub const BETA_FLAG: &str = "Beta";

/// Where feature flag values come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeatureFlagSource {
    /// Read the named flags from the store on every refresh
    Remote(Vec<String>),
    /// Fixed flag set, never refreshed
    Static(FeatureFlags),
}

/// Options for the configuration provider.
#[derive(Debug, Clone)]
pub struct ProviderOptions {
    pub namespace: String,
    pub environment: EnvironmentName,
    pub cache_expiration: Duration,
    pub feature_flags: FeatureFlagSource,
}

impl Default for ProviderOptions {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            environment: EnvironmentName::default(),
            cache_expiration: DEFAULT_CACHE_EXPIRATION,
            feature_flags: FeatureFlagSource::Remote(vec![BETA_FLAG.to_string()]),
        }
    }
}

impl ProviderOptions {
    pub fn new(environment: EnvironmentName) -> Self {
        Self {
            environment,
            ..Default::default()
        }
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn cache_expiration(mut self, expiration: Duration) -> Self {
        self.cache_expiration = expiration;
        self
    }

    pub fn feature_flags(mut self, source: FeatureFlagSource) -> Self {
        self.feature_flags = source;
        self
    }

    /// Key of the watched breed setting, e.g. `SquadraExperience:Dog:DogName`.
    pub fn breed_key(&self) -> String {
        format!("{}:Dog:DogName", self.namespace)
    }
}

/// Configuration change notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigChange {
    /// The watched breed changed
    BreedChanged { old: String, new: String },
    /// A feature flag changed state
    FlagChanged { name: String, enabled: bool },
    /// A new snapshot was published
    Reloaded { revision: u64 },
}

/// Result of a refresh attempt that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The cache window has not elapsed, the store was not contacted
    NotExpired,
    /// The store returned the same values, the snapshot was kept
    Unchanged,
    /// A new snapshot with this revision was published
    Updated(u64),
}

/// Process-wide refreshable configuration.
pub struct ConfigProvider {
    store: Arc<dyn ConfigStore>,
    options: ProviderOptions,
    current: RwLock<Arc<ConfigSnapshot>>,
    /// Time of the last refresh attempt, successful or not
    last_attempt: Mutex<Instant>,
    /// Serializes refreshes so revisions stay monotonic
    refresh_lock: tokio::sync::Mutex<()>,
    change_tx: broadcast::Sender<ConfigChange>,
}

impl ConfigProvider {
    /// Connect to the store and load the initial snapshot.
    ///
    /// Any failure here is returned to the caller; the process is expected
    /// to abort startup.
    pub async fn load(
        store: Arc<dyn ConfigStore>,
        options: ProviderOptions,
    ) -> Result<Self, ConfigStoreError> {
        let initial = fetch_snapshot(store.as_ref(), &options, 1).await?;

        tracing::info!(
            breed = %initial.breed_name(),
            environment = %options.environment,
            key = %options.breed_key(),
            "configuration loaded"
        );

        let (change_tx, _) = broadcast::channel(64);
        Ok(Self {
            store,
            options,
            current: RwLock::new(Arc::new(initial)),
            last_attempt: Mutex::new(Instant::now()),
            refresh_lock: tokio::sync::Mutex::new(()),
            change_tx,
        })
    }

    /// Current snapshot. Never waits on a refresh in progress.
    pub fn snapshot(&self) -> Arc<ConfigSnapshot> {
        self.current.read().clone()
    }

    pub fn is_enabled(&self, flag: &str) -> bool {
        self.snapshot().is_enabled(flag)
    }

    pub fn environment(&self) -> &EnvironmentName {
        &self.options.environment
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ConfigChange> {
        self.change_tx.subscribe()
    }

    /// Whether the cache window elapsed since the last refresh attempt.
    pub fn is_expired(&self) -> bool {
        self.last_attempt.lock().elapsed() >= self.options.cache_expiration
    }

    /// Refresh only when the cache window elapsed.
    pub async fn refresh_if_expired(&self) -> Result<RefreshOutcome, ConfigStoreError> {
        if !self.is_expired() {
            return Ok(RefreshOutcome::NotExpired);
        }
        self.refresh().await
    }

    /// Reload from the store now.
    ///
    /// On failure the previous snapshot stays published and the error is
    /// returned; the next attempt waits a full cache window.
    pub async fn refresh(&self) -> Result<RefreshOutcome, ConfigStoreError> {
        let _guard = self.refresh_lock.lock().await;

        let previous = self.snapshot();
        let fetched = fetch_snapshot(self.store.as_ref(), &self.options, previous.revision + 1).await;
        *self.last_attempt.lock() = Instant::now();

        let next = match fetched {
            Ok(next) => next,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    revision = previous.revision,
                    "configuration refresh failed, keeping last known values"
                );
                return Err(e);
            }
        };

        if next.same_values(&previous) {
            tracing::debug!(revision = previous.revision, "configuration unchanged");
            return Ok(RefreshOutcome::Unchanged);
        }

        let revision = next.revision;
        let next = Arc::new(next);
        *self.current.write() = next.clone();

        tracing::info!(revision, breed = %next.breed_name(), "configuration refreshed");
        self.publish_changes(&previous, &next);

        Ok(RefreshOutcome::Updated(revision))
    }

    fn publish_changes(&self, previous: &ConfigSnapshot, next: &ConfigSnapshot) {
        if previous.breed != next.breed {
            let _ = self.change_tx.send(ConfigChange::BreedChanged {
                old: previous.breed_name().to_string(),
                new: next.breed_name().to_string(),
            });
        }

        for (name, enabled) in next.flags.iter() {
            if previous.flags.is_enabled(name) != enabled {
                let _ = self.change_tx.send(ConfigChange::FlagChanged {
                    name: name.to_string(),
                    enabled,
                });
            }
        }
        for (name, was_enabled) in previous.flags.iter() {
            if was_enabled && !next.flags.iter().any(|(n, _)| n == name) {
                let _ = self.change_tx.send(ConfigChange::FlagChanged {
                    name: name.to_string(),
                    enabled: false,
                });
            }
        }

        let _ = self.change_tx.send(ConfigChange::Reloaded {
            revision: next.revision,
        });
    }
}

/// Read a setting scoped by the environment label, falling back to the
/// unlabeled value.
async fn lookup_setting(
    store: &dyn ConfigStore,
    key: &str,
    label: &str,
) -> Result<Option<String>, ConfigStoreError> {
    match store.get_setting(key, Some(label)).await? {
        Some(value) => Ok(Some(value)),
        None => store.get_setting(key, None).await,
    }
}

async fn lookup_flag(
    store: &dyn ConfigStore,
    name: &str,
    label: &str,
) -> Result<Option<bool>, ConfigStoreError> {
    match store.get_feature_flag(name, Some(label)).await? {
        Some(value) => Ok(Some(value)),
        None => store.get_feature_flag(name, None).await,
    }
}

/// Build a complete snapshot from the store. Nothing is published here.
async fn fetch_snapshot(
    store: &dyn ConfigStore,
    options: &ProviderOptions,
    revision: u64,
) -> Result<ConfigSnapshot, ConfigStoreError> {
    let key = options.breed_key();
    let label = options.environment.as_str();

    let raw = lookup_setting(store, &key, label)
        .await?
        .ok_or_else(|| ConfigStoreError::MissingKey(key.clone()))?;
    let breed_name = BreedName::new(raw).map_err(|e| ConfigStoreError::InvalidValue {
        key: key.clone(),
        reason: e.to_string(),
    })?;

    let flags = match &options.feature_flags {
        FeatureFlagSource::Static(flags) => flags.clone(),
        FeatureFlagSource::Remote(names) => {
            let mut flags = FeatureFlags::new();
            for name in names {
                let enabled = lookup_flag(store, name, label).await?.unwrap_or(false);
                flags.set(name.clone(), enabled);
            }
            flags
        }
    };

    Ok(ConfigSnapshot::new(
        BreedConfiguration::new(breed_name),
        flags,
        revision,
    ))
}
