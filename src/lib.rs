//! squadra-web Library
//!
//! A small site that shows a random dog image for a breed read from a
//! remote configuration store. Exposed as a library for integration tests.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

// Re-export commonly used types
pub use adapters::inbound::{router, WebServer, WebState};
pub use adapters::outbound::{AppConfigStore, DogApiClient, MemoryConfigStore};
pub use application::{ConfigProvider, PageError, PageService, ProviderOptions};
pub use config::{load_settings, Settings};
pub use domain::ports::{ConfigStore, DogImageClient};
pub use domain::value_objects::{BreedName, EnvironmentName};
pub use infrastructure::{ConfigRefresher, ShutdownController};
