//! Integration tests for configuration loading and refresh against a mock
//! App Configuration endpoint.

use squadra_web::application::{RefreshOutcome, BETA_FLAG};
use squadra_web::domain::ports::ConfigStoreError;
use squadra_web::{AppConfigStore, ConfigProvider, EnvironmentName, ProviderOptions};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const KEY_PATH: &str = "/kv/SquadraExperience:Dog:DogName";

fn connection_string(endpoint: &str) -> String {
    // Secret is base64("secret-key")
    format!("Endpoint={};Id=test-id;Secret=c2VjcmV0LWtleQ==", endpoint)
}

fn kv(value: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "key": "SquadraExperience:Dog:DogName",
        "label": "Development",
        "value": value
    }))
}

fn flag(enabled: bool) -> ResponseTemplate {
    let value = serde_json::json!({ "id": "Beta", "enabled": enabled }).to_string();
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "key": ".appconfig.featureflag/Beta",
        "value": value
    }))
}

async fn mount_breed(server: &MockServer, value: &str) {
    Mock::given(method("GET"))
        .and(path(KEY_PATH))
        .and(query_param("label", "Development"))
        .respond_with(kv(value))
        .mount(server)
        .await;
}

async fn mount_flag(server: &MockServer, enabled: bool) {
    Mock::given(method("GET"))
        .and(path_regex(r"^/kv/\.appconfig\.featureflag"))
        .respond_with(flag(enabled))
        .mount(server)
        .await;
}

async fn load(server: &MockServer, expiration: Duration) -> Result<ConfigProvider, ConfigStoreError> {
    let store = Arc::new(AppConfigStore::connect(&connection_string(&server.uri()))?);
    let options = ProviderOptions::new(EnvironmentName::new("Development")).cache_expiration(expiration);
    ConfigProvider::load(store, options).await
}

#[tokio::test]
async fn test_load_breed_and_flag() {
    let server = MockServer::start().await;
    mount_breed(&server, "hound").await;
    mount_flag(&server, true).await;

    let provider = load(&server, Duration::from_secs(5)).await.unwrap();
    let snapshot = provider.snapshot();

    assert_eq!(snapshot.breed_name().as_str(), "hound");
    assert!(snapshot.is_enabled(BETA_FLAG));
}

#[tokio::test]
async fn test_load_falls_back_to_unlabeled_key() {
    let server = MockServer::start().await;

    // Labeled lookup misses, unlabeled one hits
    Mock::given(method("GET"))
        .and(path(KEY_PATH))
        .and(query_param("label", "Development"))
        .respond_with(ResponseTemplate::new(404))
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(KEY_PATH))
        .respond_with(kv("pug"))
        .with_priority(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/kv/\.appconfig\.featureflag"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let provider = load(&server, Duration::from_secs(5)).await.unwrap();
    assert_eq!(provider.snapshot().breed_name().as_str(), "pug");
    assert!(!provider.is_enabled(BETA_FLAG));
}

#[tokio::test]
async fn test_load_unreachable_store_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let result = load(&server, Duration::from_secs(5)).await;
    assert!(matches!(result, Err(ConfigStoreError::Status { status: 500, .. })));
}

#[tokio::test]
async fn test_refresh_replaces_snapshot() {
    let server = MockServer::start().await;
    mount_breed(&server, "hound").await;
    mount_flag(&server, false).await;

    let provider = load(&server, Duration::ZERO).await.unwrap();
    assert_eq!(provider.snapshot().revision, 1);

    server.reset().await;
    mount_breed(&server, "akita").await;
    mount_flag(&server, true).await;

    let outcome = provider.refresh_if_expired().await.unwrap();
    assert_eq!(outcome, RefreshOutcome::Updated(2));

    let snapshot = provider.snapshot();
    assert_eq!(snapshot.breed_name().as_str(), "akita");
    assert!(snapshot.is_enabled(BETA_FLAG));
}

#[tokio::test]
async fn test_refresh_failure_keeps_last_known_good() {
    let server = MockServer::start().await;
    mount_breed(&server, "hound").await;
    mount_flag(&server, true).await;

    let provider = load(&server, Duration::ZERO).await.unwrap();

    server.reset().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let result = provider.refresh().await;
    assert!(matches!(result, Err(ConfigStoreError::Status { status: 503, .. })));

    let snapshot = provider.snapshot();
    assert_eq!(snapshot.breed_name().as_str(), "hound");
    assert!(snapshot.is_enabled(BETA_FLAG));
    assert_eq!(snapshot.revision, 1);
}

#[tokio::test]
async fn test_refresh_with_partial_failure_publishes_nothing() {
    let server = MockServer::start().await;
    mount_breed(&server, "hound").await;
    mount_flag(&server, false).await;

    let provider = load(&server, Duration::ZERO).await.unwrap();

    // Breed changes but the flag read fails: no mixed snapshot is published
    server.reset().await;
    mount_breed(&server, "pug").await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/kv/\.appconfig\.featureflag"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    assert!(provider.refresh().await.is_err());
    assert_eq!(provider.snapshot().breed_name().as_str(), "hound");
}

#[tokio::test]
async fn test_refresh_within_window_does_not_contact_store() {
    let server = MockServer::start().await;
    mount_breed(&server, "hound").await;
    mount_flag(&server, false).await;

    let provider = load(&server, Duration::from_secs(60)).await.unwrap();
    let before = server.received_requests().await.unwrap().len();

    let outcome = provider.refresh_if_expired().await.unwrap();
    assert_eq!(outcome, RefreshOutcome::NotExpired);
    assert_eq!(server.received_requests().await.unwrap().len(), before);
}

#[tokio::test]
async fn test_requests_are_signed() {
    let server = MockServer::start().await;
    mount_breed(&server, "hound").await;
    mount_flag(&server, false).await;

    load(&server, Duration::from_secs(5)).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert!(!requests.is_empty());
    for request in requests {
        let auth = request
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(auth.starts_with("HMAC-SHA256 Credential=test-id&"), "got {}", auth);
        assert!(request.headers.get("x-ms-date").is_some());
        assert!(request.headers.get("x-ms-content-sha256").is_some());
        assert!(request.url.query().unwrap_or_default().contains("api-version=1.0"));
    }
}
