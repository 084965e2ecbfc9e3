//! Page Service - Main application use case
//!
//! Builds the data behind every page of the site: reads the configured breed,
//! fetches a random image for it and answers feature-gate checks.

use crate::application::config_provider::ConfigProvider;
use crate::domain::entities::{ErrorView, HomeView};
use crate::domain::ports::{DogApiError, DogImageClient};
use std::sync::Arc;

/// Failures surfaced to the web layer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageError {
    #[error("failed to fetch dog image for breed '{breed}': {source}")]
    ImageFetch {
        breed: String,
        #[source]
        source: DogApiError,
    },
}

/// Page service - orchestrates configuration and the image client.
pub struct PageService {
    config: Arc<ConfigProvider>,
    images: Arc<dyn DogImageClient>,
    show_environment: bool,
}

impl PageService {
    pub fn new(config: Arc<ConfigProvider>, images: Arc<dyn DogImageClient>) -> Self {
        Self {
            config,
            images,
            show_environment: true,
        }
    }

    /// Toggle display of the environment name on the home page.
    pub fn show_environment(mut self, show: bool) -> Self {
        self.show_environment = show;
        self
    }

    pub fn config(&self) -> &Arc<ConfigProvider> {
        &self.config
    }

    /// Build the home page view.
    ///
    /// Reads the breed from the current snapshot and awaits a single image
    /// fetch. Fetch failures are returned as-is, there is no fallback image.
    pub async fn render_home(&self) -> Result<HomeView, PageError> {
        let snapshot = self.config.snapshot();
        let breed = snapshot.breed_name();

        let image = self
            .images
            .fetch_random_image(breed)
            .await
            .map_err(|source| PageError::ImageFetch {
                breed: breed.to_string(),
                source,
            })?;

        Ok(HomeView {
            image_url: image.message,
            breed_name: breed.to_string(),
            environment_name: self
                .show_environment
                .then(|| self.config.environment().to_string()),
        })
    }

    /// Build the error page view for a correlation id.
    pub fn render_error(&self, request_id: Option<String>) -> ErrorView {
        ErrorView {
            request_id,
            development: self.config.environment().is_development(),
        }
    }

    /// Whether a feature is enabled in the current snapshot.
    pub fn is_feature_enabled(&self, name: &str) -> bool {
        self.config.is_enabled(name)
    }
}
