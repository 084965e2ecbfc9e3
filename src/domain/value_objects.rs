//! Value Objects - Immutable domain primitives
//!
//! Value objects are identified by their value rather than identity.
//! They are immutable and can be freely shared.

use serde::{Deserialize, Serialize};

/// Name of a dog breed as understood by the dog image API.
///
/// The value is used verbatim as a URL path segment, so the only local rule
/// is that it must not be blank. Anything else is forwarded to the remote
/// service, which is responsible for rejecting unknown breeds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BreedName(String);

impl BreedName {
    /// Create a breed name, rejecting empty or whitespace-only values.
    ///
    /// # Examples
    /// ```
    /// use squadra_web::domain::value_objects::BreedName;
    ///
    /// assert_eq!(BreedName::new("hound").unwrap().as_str(), "hound");
    /// assert!(BreedName::new("  ").is_err());
    /// ```
    pub fn new(name: impl Into<String>) -> Result<Self, ValueError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValueError::EmptyBreedName);
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for BreedName {
    type Error = ValueError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BreedName> for String {
    fn from(value: BreedName) -> Self {
        value.0
    }
}

impl std::fmt::Display for BreedName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hosting environment the process runs in (Development, Production, ...).
///
/// Used as the label that scopes configuration lookups in the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnvironmentName(String);

impl EnvironmentName {
    pub const PRODUCTION: &'static str = "Production";
    pub const DEVELOPMENT: &'static str = "Development";

    /// Create an environment name. Blank input falls back to `Production`.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            Self::default()
        } else {
            Self(trimmed.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the development environment (case-insensitive).
    pub fn is_development(&self) -> bool {
        self.0.eq_ignore_ascii_case(Self::DEVELOPMENT)
    }
}

impl Default for EnvironmentName {
    fn default() -> Self {
        Self(Self::PRODUCTION.to_string())
    }
}

impl std::fmt::Display for EnvironmentName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors raised when constructing value objects.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueError {
    #[error("breed name must not be empty")]
    EmptyBreedName,
}
