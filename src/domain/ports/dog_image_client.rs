//! Dog Image Client Port
//!
//! Defines the interface for fetching random dog images from a remote API.

use crate::domain::entities::DogImage;
use crate::domain::value_objects::BreedName;
use async_trait::async_trait;

/// Client for the remote dog image API.
///
/// This is an outbound port. Implementations perform exactly one request per
/// call: no retries, no caching.
#[async_trait]
pub trait DogImageClient: Send + Sync {
    /// Fetch a random image for the given breed.
    async fn fetch_random_image(&self, breed: &BreedName) -> Result<DogImage, DogApiError>;
}

/// Failures when talking to the dog image API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DogApiError {
    /// The request URL could not be built from the configured base URL
    #[error("invalid dog api url: {0}")]
    InvalidUrl(String),
    /// Network level failure (connect, TLS, reset, ...)
    #[error("dog api request failed: {0}")]
    Transport(String),
    /// The API answered with a non-success status
    #[error("dog api returned {status}: {body}")]
    Status { status: u16, body: String },
    /// The response body was not a valid image document
    #[error("dog api returned a malformed body: {0}")]
    Decode(String),
}
