mod config_store;
mod dog_image_client;

pub use config_store::{ConfigStore, ConfigStoreError};
pub use dog_image_client::{DogApiError, DogImageClient};
