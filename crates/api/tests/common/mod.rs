//! Shared helpers for HTTP-level integration tests.
//!
//! Builds the real router with the production middleware stack and drives
//! it through `tower::ServiceExt::oneshot`. The acting account is passed
//! the way the service expects it: the `X-Account-Id` header.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use keepsake_api::config::ServerConfig;
use keepsake_api::routes;
use keepsake_api::state::AppState;
use keepsake_core::storage::LocalStorage;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config(media_root: &str) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        frontend_origin: "http://localhost:5173".to_string(),
        media_root: media_root.to_string(),
        media_base_url: "http://localhost:3000/media".to_string(),
        purge_enabled: false,
        purge_batch_size: 50,
        purge_interval_secs: 1800,
    }
}

/// Build the application router backed by a temp-dir local storage.
///
/// Mirrors the router construction in `main.rs` (minus CORS, which needs
/// nothing from tests) so integration tests exercise the same middleware
/// stack production uses.
pub fn build_test_app(pool: PgPool) -> Router {
    let media_root = std::env::temp_dir().join("keepsake-test-media");
    let config = test_config(media_root.to_str().unwrap());

    let state = AppState {
        pool,
        storage: Arc::new(LocalStorage::new(
            config.media_root.clone(),
            config.media_base_url.clone(),
        )),
        config: Arc::new(config),
    };

    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Send a request, optionally as an account, optionally with a JSON body.
pub async fn request(
    app: Router,
    method: Method,
    uri: &str,
    account: Option<i64>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(id) = account {
        builder = builder.header(HeaderName::from_static("x-account-id"), id.to_string());
    }
    let request = match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str, account: i64) -> Response<Body> {
    request(app, Method::GET, uri, Some(account), None).await
}

pub async fn post_json(
    app: Router,
    uri: &str,
    account: i64,
    body: serde_json::Value,
) -> Response<Body> {
    request(app, Method::POST, uri, Some(account), Some(body)).await
}

pub async fn post_empty(app: Router, uri: &str, account: i64) -> Response<Body> {
    request(app, Method::POST, uri, Some(account), None).await
}

pub async fn patch_json(
    app: Router,
    uri: &str,
    account: i64,
    body: serde_json::Value,
) -> Response<Body> {
    request(app, Method::PATCH, uri, Some(account), Some(body)).await
}

pub async fn delete(app: Router, uri: &str, account: i64) -> Response<Body> {
    request(app, Method::DELETE, uri, Some(account), None).await
}

/// Upload a file through the multipart endpoint.
pub async fn upload_file(
    app: Router,
    uri: &str,
    account: i64,
    filename: &str,
    bytes: &[u8],
) -> Response<Body> {
    let boundary = "keepsake-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
             Content-Type: image/jpeg\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(HeaderName::from_static("x-account-id"), account.to_string())
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
