//! Web Server
//!
//! HTTP front-end of the site: home page, static pages, the Beta-gated About
//! page and the error page.

use crate::adapters::inbound::views::{self, Layout};
use crate::application::{PageService, BETA_FLAG};
use crate::infrastructure::ShutdownController;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode, Uri},
    middleware::{self, Next},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

/// Header carrying the correlation id of a request.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

const ABOUT_PATH: &str = "/Home/About";

/// Page routes reachable under any letter case.
const PAGE_PATHS: &[&str] = &["/Home", "/Home/Index", "/Home/Privacy", "/Home/Error", ABOUT_PATH];

/// Health response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub environment: String,
    pub breed: String,
    pub revision: u64,
    /// Seconds since the current snapshot was loaded
    pub config_age_secs: u64,
}

/// Shared state of the web handlers.
#[derive(Clone)]
pub struct WebState {
    pub pages: Arc<PageService>,
}

impl WebState {
    pub fn new(pages: Arc<PageService>) -> Self {
        Self { pages }
    }

    fn layout(&self) -> Layout {
        Layout {
            show_about: self.pages.is_feature_enabled(BETA_FLAG),
        }
    }
}

/// Generic error page. Never cached by intermediaries.
pub struct ErrorPage {
    status: StatusCode,
    html: String,
}

impl ErrorPage {
    pub fn new(state: &WebState, status: StatusCode, request_id: String) -> Self {
        let view = state.pages.render_error(Some(request_id));
        Self {
            status,
            html: views::error(state.layout(), &view),
        }
    }
}

impl IntoResponse for ErrorPage {
    fn into_response(self) -> Response {
        let mut response = (self.status, Html(self.html)).into_response();
        let headers = response.headers_mut();
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store, no-cache"));
        headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
        response
    }
}

/// Build the router with all routes and middleware.
pub fn router(state: WebState) -> Router {
    let beta = Router::new()
        .route(ABOUT_PATH, get(about_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), beta_gate));

    Router::new()
        .route("/", get(home_handler))
        .route("/Home", get(home_handler))
        .route("/Home/Index", get(home_handler))
        .route("/Home/Privacy", get(privacy_handler))
        .route("/Home/Error", get(error_handler))
        .route("/health", get(health_handler))
        .merge(beta)
        .fallback(not_found_handler)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
        .with_state(state)
}

/// HTTP server for the site.
pub struct WebServer {
    listen_addr: String,
    state: WebState,
}

impl WebServer {
    pub fn new(listen_addr: String, pages: Arc<PageService>) -> Self {
        Self {
            listen_addr,
            state: WebState::new(pages),
        }
    }

    /// Bind the configured address and serve until shutdown.
    #[cfg_attr(coverage_nightly, coverage(off))]
    pub async fn run(&self, shutdown: ShutdownController) -> anyhow::Result<()> {
        let listener = TcpListener::bind(&self.listen_addr).await?;
        self.serve(listener, shutdown).await
    }

    /// Serve on an already bound listener until shutdown.
    pub async fn serve(&self, listener: TcpListener, shutdown: ShutdownController) -> anyhow::Result<()> {
        tracing::info!("web server listening on {}", listener.local_addr()?);

        axum::serve(listener, router(self.state.clone()))
            .with_graceful_shutdown(async move { shutdown.wait().await })
            .await?;

        tracing::info!("web server stopped");
        Ok(())
    }
}

fn request_id(headers: &HeaderMap) -> String {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}

/// Route guard: the gated route does not exist while the Beta flag is off.
async fn beta_gate(State(state): State<WebState>, request: Request, next: Next) -> Response {
    if state.pages.is_feature_enabled(BETA_FLAG) {
        next.run(request).await
    } else {
        tracing::debug!(path = %request.uri().path(), "feature '{}' disabled", BETA_FLAG);
        not_found(&state)
    }
}

fn not_found(state: &WebState) -> Response {
    (StatusCode::NOT_FOUND, Html(views::not_found(state.layout()))).into_response()
}

// Handler functions

async fn home_handler(State(state): State<WebState>, headers: HeaderMap) -> Response {
    match state.pages.render_home().await {
        Ok(view) => Html(views::home(state.layout(), &view)).into_response(),
        Err(e) => {
            let id = request_id(&headers);
            tracing::error!(request_id = %id, error = %e, "home page failed");
            ErrorPage::new(&state, StatusCode::INTERNAL_SERVER_ERROR, id).into_response()
        }
    }
}

async fn privacy_handler(State(state): State<WebState>) -> Html<String> {
    Html(views::privacy(state.layout()))
}

async fn about_handler(State(state): State<WebState>) -> Html<String> {
    Html(views::about(state.layout()))
}

async fn error_handler(State(state): State<WebState>, headers: HeaderMap) -> ErrorPage {
    ErrorPage::new(&state, StatusCode::OK, request_id(&headers))
}

/// Unmatched requests. A page path in the wrong letter case is redirected to
/// its canonical spelling; anything else is the 404 page.
async fn not_found_handler(State(state): State<WebState>, uri: Uri) -> Response {
    match canonical_path(uri.path()) {
        Some(ABOUT_PATH) if !state.pages.is_feature_enabled(BETA_FLAG) => not_found(&state),
        Some(path) => {
            let target = match uri.query() {
                Some(query) => format!("{}?{}", path, query),
                None => path.to_string(),
            };
            Redirect::permanent(&target).into_response()
        }
        None => not_found(&state),
    }
}

fn canonical_path(path: &str) -> Option<&'static str> {
    let path = path.strip_suffix('/').filter(|p| !p.is_empty()).unwrap_or(path);
    PAGE_PATHS
        .iter()
        .copied()
        .find(|canonical| canonical.eq_ignore_ascii_case(path))
}

async fn health_handler(State(state): State<WebState>) -> Json<HealthResponse> {
    let config = state.pages.config();
    let snapshot = config.snapshot();
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        environment: config.environment().to_string(),
        breed: snapshot.breed_name().to_string(),
        revision: snapshot.revision,
        config_age_secs: snapshot.age().as_secs(),
    })
}
