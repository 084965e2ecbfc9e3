//! Domain Entities - Core business objects
//!
//! These entities represent the configuration state and page data of the site.
//! They have no external dependencies and contain only business logic.

use crate::domain::value_objects::BreedName;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// Response body of the dog image API.
///
/// Mirrors the JSON returned by `GET /breed/{breed}/images/random`:
/// `{"message": "<image url>", "status": "success"}`. Error bodies carry an
/// extra numeric `code`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DogImage {
    /// Image URL on success, error text otherwise
    pub message: String,
    /// Status string reported by the API ("success" / "error")
    pub status: String,
    /// Error code, only present on error bodies
    #[serde(default)]
    pub code: Option<u16>,
}

/// Breed to request from the dog image API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreedConfiguration {
    pub breed_name: BreedName,
}

impl BreedConfiguration {
    pub fn new(breed_name: BreedName) -> Self {
        Self { breed_name }
    }
}

/// Named boolean toggles. A flag that is not present is disabled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureFlags {
    flags: BTreeMap<String, bool>,
}

impl FeatureFlags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a flag set where every given name is enabled.
    pub fn enabled<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            flags: names.into_iter().map(|n| (n.into(), true)).collect(),
        }
    }

    pub fn set(&mut self, name: impl Into<String>, enabled: bool) {
        self.flags.insert(name.into(), enabled);
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        self.flags.get(name).copied().unwrap_or(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.flags.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// Immutable view of the configuration at one point in time.
///
/// Breed and flags always come from the same load; the provider replaces the
/// whole value at once and never mutates a published snapshot.
#[derive(Debug, Clone)]
pub struct ConfigSnapshot {
    pub breed: BreedConfiguration,
    pub flags: FeatureFlags,
    /// Monotonic counter, bumped every time a new snapshot is published
    pub revision: u64,
    pub loaded_at: Instant,
}

impl ConfigSnapshot {
    pub fn new(breed: BreedConfiguration, flags: FeatureFlags, revision: u64) -> Self {
        Self {
            breed,
            flags,
            revision,
            loaded_at: Instant::now(),
        }
    }

    pub fn breed_name(&self) -> &BreedName {
        &self.breed.breed_name
    }

    pub fn is_enabled(&self, flag: &str) -> bool {
        self.flags.is_enabled(flag)
    }

    pub fn age(&self) -> Duration {
        self.loaded_at.elapsed()
    }

    /// Whether two snapshots carry the same values (ignores revision and time).
    pub fn same_values(&self, other: &ConfigSnapshot) -> bool {
        self.breed == other.breed && self.flags == other.flags
    }
}

/// Data handed to the home page template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomeView {
    pub image_url: String,
    pub breed_name: String,
    /// Active environment, only when environment display is switched on
    pub environment_name: Option<String>,
}

/// Data handed to the error page template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorView {
    pub request_id: Option<String>,
    /// Show the development hint block
    pub development: bool,
}

impl ErrorView {
    pub fn show_request_id(&self) -> bool {
        self.request_id.as_deref().is_some_and(|id| !id.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn breed(name: &str) -> BreedConfiguration {
        BreedConfiguration::new(BreedName::new(name).unwrap())
    }

    #[test]
    fn test_dog_image_deserialize_success() {
        let json = r#"{"message":"https://images.example/hound/1.jpg","status":"success"}"#;
        let image: DogImage = serde_json::from_str(json).unwrap();
        assert_eq!(image.message, "https://images.example/hound/1.jpg");
        assert_eq!(image.status, "success");
        assert_eq!(image.code, None);
    }

    #[test]
    fn test_dog_image_deserialize_error_body() {
        let json = r#"{"status":"error","message":"Breed not found","code":404}"#;
        let image: DogImage = serde_json::from_str(json).unwrap();
        assert_eq!(image.status, "error");
        assert_eq!(image.code, Some(404));
    }

    #[test]
    fn test_dog_image_missing_message_fails() {
        let json = r#"{"status":"success"}"#;
        assert!(serde_json::from_str::<DogImage>(json).is_err());
    }

    #[test]
    fn test_feature_flags_absent_is_disabled() {
        let flags = FeatureFlags::new();
        assert!(!flags.is_enabled("Beta"));
        assert_eq!(flags.iter().count(), 0);
    }

    #[test]
    fn test_feature_flags_enabled_builder() {
        let flags = FeatureFlags::enabled(["Beta", "Gamma"]);
        assert!(flags.is_enabled("Beta"));
        assert!(flags.is_enabled("Gamma"));
        assert!(!flags.is_enabled("beta"));
    }

    #[test]
    fn test_feature_flags_set_overrides() {
        let mut flags = FeatureFlags::enabled(["Beta"]);
        flags.set("Beta", false);
        assert!(!flags.is_enabled("Beta"));
        assert_eq!(flags.iter().collect::<Vec<_>>(), vec![("Beta", false)]);
    }

    #[test]
    fn test_snapshot_same_values_ignores_revision() {
        let a = ConfigSnapshot::new(breed("hound"), FeatureFlags::enabled(["Beta"]), 1);
        let b = ConfigSnapshot::new(breed("hound"), FeatureFlags::enabled(["Beta"]), 2);
        let c = ConfigSnapshot::new(breed("pug"), FeatureFlags::enabled(["Beta"]), 3);
        assert!(a.same_values(&b));
        assert!(!a.same_values(&c));
    }

    #[test]
    fn test_snapshot_accessors() {
        let snap = ConfigSnapshot::new(breed("hound"), FeatureFlags::new(), 7);
        assert_eq!(snap.breed_name().as_str(), "hound");
        assert!(!snap.is_enabled("Beta"));
        assert_eq!(snap.revision, 7);
        assert!(snap.age() < Duration::from_secs(5));
    }

    #[test]
    fn test_error_view_show_request_id() {
        let view = ErrorView { request_id: Some("abc".into()), development: false };
        assert!(view.show_request_id());

        let view = ErrorView { request_id: Some(String::new()), development: false };
        assert!(!view.show_request_id());

        let view = ErrorView { request_id: None, development: false };
        assert!(!view.show_request_id());
    }
}
