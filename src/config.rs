//! Process settings loaded from environment variables.

use crate::adapters::outbound::DEFAULT_DOG_API_URL;
use crate::application::{BETA_FLAG, DEFAULT_NAMESPACE};

/// Connection string value selecting the in-memory configuration store.
pub const MEMORY_STORE: &str = "memory";

#[derive(Debug, Clone)]
pub struct Settings {
    // Web server
    pub listen_addr: String,
    pub environment: String,
    pub show_environment: bool,
    pub debug: bool,

    // Dog image API
    pub dog_api_base_url: String,

    // Remote configuration store
    pub connection_string: Option<String>,
    pub namespace: String,
    pub cache_expiration_secs: u64,
    pub refresh_poll_millis: u64,
    pub seed_dog_name: String,

    // Feature flags
    pub feature_flags_remote: bool,
    pub feature_flags: Vec<String>,
    pub static_feature_flags: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            environment: "Production".to_string(),
            show_environment: true,
            debug: false,
            dog_api_base_url: DEFAULT_DOG_API_URL.to_string(),
            connection_string: None,
            namespace: DEFAULT_NAMESPACE.to_string(),
            cache_expiration_secs: 5,
            refresh_poll_millis: 1000,
            seed_dog_name: "hound".to_string(),
            feature_flags_remote: true,
            feature_flags: vec![BETA_FLAG.to_string()],
            static_feature_flags: Vec::new(),
        }
    }
}

impl Settings {
    /// Build settings from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Settings::default();

        let string = |key: &str, default: String| lookup(key).unwrap_or(default);
        let number = |key: &str, default: u64| {
            lookup(key)
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(default)
        };
        let flag = |key: &str, default: bool| {
            lookup(key)
                .map(|v| v == "1" || v.to_lowercase() == "true")
                .unwrap_or(default)
        };
        let list = |key: &str, default: Vec<String>| {
            lookup(key)
                .map(|v| {
                    v.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or(default)
        };

        Self {
            listen_addr: string("SQUADRA_LISTEN_ADDR", defaults.listen_addr),
            environment: string("APP_ENVIRONMENT", defaults.environment),
            show_environment: flag("SHOW_ENVIRONMENT", defaults.show_environment),
            debug: lookup("DEBUG").is_some(),
            dog_api_base_url: string("DOG_API_BASE_URL", defaults.dog_api_base_url),
            connection_string: lookup("APPCONFIG_CONNECTION_STRING").filter(|v| !v.trim().is_empty()),
            namespace: string("APPCONFIG_NAMESPACE", defaults.namespace),
            cache_expiration_secs: number(
                "APPCONFIG_CACHE_EXPIRATION_SECS",
                defaults.cache_expiration_secs,
            ),
            refresh_poll_millis: number("APPCONFIG_REFRESH_POLL_MILLIS", defaults.refresh_poll_millis),
            seed_dog_name: string("DOG_NAME", defaults.seed_dog_name),
            feature_flags_remote: flag(
                "APPCONFIG_FEATURE_FLAGS_ENABLED",
                defaults.feature_flags_remote,
            ),
            feature_flags: list("FEATURE_FLAGS", defaults.feature_flags),
            static_feature_flags: list("FEATURE_FLAGS_STATIC", defaults.static_feature_flags),
        }
    }

    /// Whether the in-memory store was requested.
    pub fn uses_memory_store(&self) -> bool {
        self.connection_string
            .as_deref()
            .is_some_and(|c| c.trim().eq_ignore_ascii_case(MEMORY_STORE))
    }
}

/// Load settings from the process environment.
pub fn load_settings() -> anyhow::Result<Settings> {
    Ok(Settings::from_lookup(|key| std::env::var(key).ok()))
}
