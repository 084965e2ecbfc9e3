//! Dog API Client
//!
//! Implements DogImageClient against the public dog image API
//! (`GET {base}/breed/{breed}/images/random`).

use crate::domain::entities::DogImage;
use crate::domain::ports::{DogApiError, DogImageClient};
use crate::domain::value_objects::BreedName;
use async_trait::async_trait;
use reqwest::Url;

/// Default base URL of the dog image API.
pub const DEFAULT_DOG_API_URL: &str = "https://dog.ceo/api";

/// HTTP client for the dog image API.
///
/// Every call is a single GET. Timeouts are whatever the reqwest defaults are.
#[derive(Debug, Clone)]
pub struct DogApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl DogApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into(),
            client,
        }
    }

    /// Build the random-image URL for a breed.
    ///
    /// The breed is pushed as one path segment, so characters such as `/`
    /// are percent-encoded rather than changing the route.
    pub fn random_image_url(&self, breed: &BreedName) -> Result<Url, DogApiError> {
        let mut url =
            Url::parse(&self.base_url).map_err(|e| DogApiError::InvalidUrl(e.to_string()))?;

        url.path_segments_mut()
            .map_err(|_| DogApiError::InvalidUrl(format!("{} cannot be a base", self.base_url)))?
            .pop_if_empty()
            .push("breed")
            .push(breed.as_str())
            .push("images")
            .push("random");

        Ok(url)
    }
}

impl Default for DogApiClient {
    fn default() -> Self {
        Self::new(DEFAULT_DOG_API_URL)
    }
}

#[async_trait]
impl DogImageClient for DogApiClient {
    async fn fetch_random_image(&self, breed: &BreedName) -> Result<DogImage, DogApiError> {
        let url = self.random_image_url(breed)?;
        tracing::debug!(%url, "fetching random dog image");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DogApiError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DogApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| DogApiError::Transport(e.to_string()))?;

        serde_json::from_slice(&bytes).map_err(|e| DogApiError::Decode(e.to_string()))
    }
}
