//! End-to-end tests of the site: router + page service + configuration
//! provider + dog API client against a Wiremock server.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use squadra_web::application::BETA_FLAG;
use squadra_web::{
    router, ConfigProvider, DogApiClient, EnvironmentName, MemoryConfigStore, PageService,
    ProviderOptions, WebState,
};
use std::sync::Arc;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const KEY: &str = "SquadraExperience:Dog:DogName";

struct Site {
    store: Arc<MemoryConfigStore>,
    provider: Arc<ConfigProvider>,
    app: Router,
}

async fn site(dog_api: &MockServer, environment: &str, show_environment: bool) -> Site {
    let store = Arc::new(MemoryConfigStore::new());
    store.set_setting(KEY, Some(environment), "hound");

    let options = ProviderOptions::new(EnvironmentName::new(environment));
    let provider = Arc::new(ConfigProvider::load(store.clone(), options).await.unwrap());

    let images = Arc::new(DogApiClient::new(dog_api.uri()));
    let pages = PageService::new(provider.clone(), images).show_environment(show_environment);
    let app = router(WebState::new(Arc::new(pages)));

    Site { store, provider, app }
}

async fn mount_image(server: &MockServer, breed: &str, url: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/breed/{}/images/random", breed)))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "message": url,
            "status": "success"
        })))
        .mount(server)
        .await;
}

async fn get(app: &Router, uri: &str) -> (StatusCode, axum::http::HeaderMap, String) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, headers, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn test_home_shows_configured_breed_image() {
    let dog_api = MockServer::start().await;
    mount_image(&dog_api, "hound", "https://images.example/hound/1.jpg").await;

    let site = site(&dog_api, "Development", true).await;
    let (status, _, body) = get(&site.app, "/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#"src="https://images.example/hound/1.jpg""#));
    assert!(body.contains("Random hound"));
    assert!(body.contains("Environment: <strong>Development</strong>"));
}

#[tokio::test]
async fn test_home_without_environment_display() {
    let dog_api = MockServer::start().await;
    mount_image(&dog_api, "hound", "https://images.example/hound/1.jpg").await;

    let site = site(&dog_api, "Production", false).await;
    let (status, _, body) = get(&site.app, "/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(!body.contains("Environment:"));
}

#[tokio::test]
async fn test_home_follows_breed_refresh() {
    let dog_api = MockServer::start().await;
    mount_image(&dog_api, "hound", "https://images.example/hound/1.jpg").await;
    mount_image(&dog_api, "akita", "https://images.example/akita/1.jpg").await;

    let site = site(&dog_api, "Development", true).await;
    site.store.set_setting(KEY, Some("Development"), "akita");
    site.provider.refresh().await.unwrap();

    let (_, _, body) = get(&site.app, "/").await;
    assert!(body.contains("https://images.example/akita/1.jpg"));
}

#[tokio::test]
async fn test_home_keeps_breed_when_refresh_fails() {
    let dog_api = MockServer::start().await;
    mount_image(&dog_api, "hound", "https://images.example/hound/1.jpg").await;

    let site = site(&dog_api, "Development", true).await;
    site.store.set_unavailable(true);
    assert!(site.provider.refresh().await.is_err());

    let (status, _, body) = get(&site.app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("https://images.example/hound/1.jpg"));
}

#[tokio::test]
async fn test_home_fetch_failure_renders_error_page() {
    let dog_api = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("stack trace here"))
        .mount(&dog_api)
        .await;

    let site = site(&dog_api, "Production", true).await;
    let (status, headers, body) = get(&site.app, "/").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(headers[header::CACHE_CONTROL], "no-store, no-cache");
    assert!(body.contains("An error occurred while processing your request."));
    assert!(body.contains("Request ID:"));
    assert!(!body.contains("stack trace here"));
}

#[tokio::test]
async fn test_beta_page_gated_by_flag() {
    let dog_api = MockServer::start().await;
    let site = site(&dog_api, "Development", true).await;

    let (status, _, body) = get(&site.app, "/Home/About").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(!body.contains("/Home/About"));

    site.store.set_feature_flag(BETA_FLAG, Some("Development"), true);
    site.provider.refresh().await.unwrap();

    let (status, _, body) = get(&site.app, "/Home/About").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#"<a href="/Home/About">About</a>"#));

    site.store.set_feature_flag(BETA_FLAG, Some("Development"), false);
    site.provider.refresh().await.unwrap();

    let (status, _, _) = get(&site.app, "/Home/About").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_error_page_echoes_request_id() {
    let dog_api = MockServer::start().await;
    let site = site(&dog_api, "Production", true).await;

    let request = Request::builder()
        .uri("/Home/Error")
        .header("x-request-id", "corr-123")
        .body(Body::empty())
        .unwrap();
    let response = site.app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store, no-cache");
    assert_eq!(response.headers()[header::PRAGMA], "no-cache");
    assert_eq!(response.headers()["x-request-id"], "corr-123");

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(body.contains("<code>corr-123</code>"));
}

#[tokio::test]
async fn test_privacy_page_does_not_call_dog_api() {
    let dog_api = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&dog_api)
        .await;

    let site = site(&dog_api, "Production", true).await;
    let (status, _, body) = get(&site.app, "/Home/Privacy").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Privacy Policy"));
}
