//! Configuration Store Port
//!
//! Defines the interface for reading settings and feature flags from a
//! remote key-value configuration service.

use async_trait::async_trait;

/// Key-value configuration store.
///
/// Keys may be qualified by a label (the environment name). A `None` label
/// addresses the unlabeled value. Missing entries are `Ok(None)`, not errors.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Read a plain setting.
    async fn get_setting(
        &self,
        key: &str,
        label: Option<&str>,
    ) -> Result<Option<String>, ConfigStoreError>;

    /// Read the enabled state of a feature flag.
    async fn get_feature_flag(
        &self,
        name: &str,
        label: Option<&str>,
    ) -> Result<Option<bool>, ConfigStoreError>;
}

/// Failures when reading from the configuration store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigStoreError {
    #[error("invalid connection string: {0}")]
    InvalidConnectionString(String),
    #[error("configuration store request failed: {0}")]
    Transport(String),
    #[error("configuration store returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("configuration store returned a malformed body: {0}")]
    Decode(String),
    #[error("configuration key not found: {0}")]
    MissingKey(String),
    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },
    #[error("configuration store unavailable")]
    Unavailable,
}
