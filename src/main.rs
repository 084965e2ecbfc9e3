//! squadra-web - random dog image site
//!
//! This is the composition root that wires together all the components.

use anyhow::Context;
use squadra_web::application::{FeatureFlagSource, ProviderOptions};
use squadra_web::config::{load_settings, Settings};
use squadra_web::domain::entities::FeatureFlags;
use squadra_web::infrastructure::shutdown_signal;
use squadra_web::{
    AppConfigStore, ConfigProvider, ConfigRefresher, ConfigStore, DogApiClient, EnvironmentName,
    MemoryConfigStore, PageService, ShutdownController, WebServer,
};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::fmt::format::FmtSpan;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load settings from environment
    let settings = load_settings()?;

    // Setup logging
    let log_level = if settings.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_span_events(FmtSpan::CLOSE)
        .init();

    tracing::info!(
        "starting squadra-web environment={} listen={}",
        settings.environment,
        settings.listen_addr
    );

    // ===== COMPOSITION ROOT =====

    // 1. Configuration store and provider (fatal on failure)
    let store = build_config_store(&settings)?;
    let provider = Arc::new(
        ConfigProvider::load(store, provider_options(&settings))
            .await
            .context("failed to load configuration from the remote store")?,
    );

    // 2. Background refresh
    let shutdown = ShutdownController::new();
    let refresher = Arc::new(ConfigRefresher::new(
        provider.clone(),
        Duration::from_millis(settings.refresh_poll_millis.max(1)),
    ));
    let refresher_task = refresher.start(shutdown.subscribe());

    // 3. Application service
    let images = Arc::new(DogApiClient::new(settings.dog_api_base_url.clone()));
    let pages = Arc::new(
        PageService::new(provider, images).show_environment(settings.show_environment),
    );

    // 4. Inbound adapter
    tokio::spawn(shutdown_signal(shutdown.clone()));
    let server = WebServer::new(settings.listen_addr.clone(), pages);
    let result = server.run(shutdown.clone()).await;

    shutdown.shutdown();
    let _ = refresher_task.await;
    result
}

fn build_config_store(settings: &Settings) -> anyhow::Result<Arc<dyn ConfigStore>> {
    if settings.uses_memory_store() {
        tracing::warn!(
            breed = %settings.seed_dog_name,
            "using in-memory configuration store"
        );
        let store = MemoryConfigStore::new();
        store.set_setting(
            format!("{}:Dog:DogName", settings.namespace),
            None,
            settings.seed_dog_name.clone(),
        );
        for flag in &settings.static_feature_flags {
            store.set_feature_flag(flag.clone(), None, true);
        }
        return Ok(Arc::new(store));
    }

    let connection_string = settings
        .connection_string
        .as_deref()
        .context("APPCONFIG_CONNECTION_STRING is not set")?;
    let store = AppConfigStore::connect(connection_string)?;
    Ok(Arc::new(store))
}

fn provider_options(settings: &Settings) -> ProviderOptions {
    let flags = if settings.feature_flags_remote {
        FeatureFlagSource::Remote(settings.feature_flags.clone())
    } else {
        FeatureFlagSource::Static(FeatureFlags::enabled(settings.static_feature_flags.iter().cloned()))
    };

    ProviderOptions::new(EnvironmentName::new(settings.environment.clone()))
        .namespace(settings.namespace.clone())
        .cache_expiration(Duration::from_secs(settings.cache_expiration_secs))
        .feature_flags(flags)
}
