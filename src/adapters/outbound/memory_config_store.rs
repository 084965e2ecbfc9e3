//! In-Memory Configuration Store
//!
//! Implements ConfigStore using DashMap. Used for local development
//! (`APPCONFIG_CONNECTION_STRING=memory`) and in tests, where it can also
//! simulate an unreachable store.

use crate::domain::ports::{ConfigStore, ConfigStoreError};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

type EntryKey = (String, Option<String>);

/// DashMap-backed configuration store.
#[derive(Default)]
pub struct MemoryConfigStore {
    settings: DashMap<EntryKey, String>,
    flags: DashMap<EntryKey, bool>,
    unavailable: AtomicBool,
    reads: AtomicU64,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_setting(&self, key: impl Into<String>, label: Option<&str>, value: impl Into<String>) {
        self.settings
            .insert((key.into(), label.map(str::to_string)), value.into());
    }

    pub fn set_feature_flag(&self, name: impl Into<String>, label: Option<&str>, enabled: bool) {
        self.flags
            .insert((name.into(), label.map(str::to_string)), enabled);
    }

    /// Make every subsequent read fail with `ConfigStoreError::Unavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of reads served or rejected so far.
    pub fn read_count(&self) -> u64 {
        self.reads.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<(), ConfigStoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(ConfigStoreError::Unavailable);
        }
        Ok(())
    }
}

#[async_trait]
impl ConfigStore for MemoryConfigStore {
    async fn get_setting(
        &self,
        key: &str,
        label: Option<&str>,
    ) -> Result<Option<String>, ConfigStoreError> {
        self.check_available()?;
        Ok(self
            .settings
            .get(&(key.to_string(), label.map(str::to_string)))
            .map(|v| v.value().clone()))
    }

    async fn get_feature_flag(
        &self,
        name: &str,
        label: Option<&str>,
    ) -> Result<Option<bool>, ConfigStoreError> {
        self.check_available()?;
        Ok(self
            .flags
            .get(&(name.to_string(), label.map(str::to_string)))
            .map(|v| *v.value()))
    }
}
