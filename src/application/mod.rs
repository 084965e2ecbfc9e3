//! Application Layer
//!
//! Use cases wiring the domain ports together.

pub mod config_provider;
pub mod page_service;

pub use config_provider::{
    ConfigChange, ConfigProvider, FeatureFlagSource, ProviderOptions, RefreshOutcome, BETA_FLAG,
    DEFAULT_CACHE_EXPIRATION, DEFAULT_NAMESPACE,
};
pub use page_service::{PageError, PageService};
