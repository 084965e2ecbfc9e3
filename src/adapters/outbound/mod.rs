mod app_config_store;
mod dog_api_client;
mod memory_config_store;

pub use app_config_store::{
    sign_request, AppConfigStore, ConnectionString, SignedHeaders, API_VERSION,
    FEATURE_FLAG_PREFIX,
};
pub use dog_api_client::{DogApiClient, DEFAULT_DOG_API_URL};
pub use memory_config_store::MemoryConfigStore;
