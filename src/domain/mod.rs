//! Domain Layer
//!
//! Entities, value objects and the outbound ports the application depends on.

pub mod entities;
pub mod ports;
pub mod value_objects;

pub use entities::{BreedConfiguration, ConfigSnapshot, DogImage, ErrorView, FeatureFlags, HomeView};
pub use value_objects::{BreedName, EnvironmentName, ValueError};
