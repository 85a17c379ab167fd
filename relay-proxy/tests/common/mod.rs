#![allow(dead_code)]

use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, Response, header};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use relay_proxy::api;
pub use relay_proxy::config::Config;
use relay_proxy::state::AppState;

/// Configuration with no upstream and fast polling
pub fn test_config() -> Config {
    Config {
        port: 0,
        bind_host: "127.0.0.1".to_string(),
        poll_interval: Duration::from_millis(20),
        poll_ceiling: Duration::from_secs(5),
        ..Config::default()
    }
}

/// Build the application router the way `main.rs` does, returning the state
/// too so tests can inspect the cache and poller.
pub fn build_test_app(config: Config) -> (Router, AppState) {
    let state = AppState::new(&config);
    (api::create_router(state.clone()), state)
}

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

pub async fn post_json(app: Router, uri: &str, body: &Value) -> Response<Body> {
    post_raw(app, uri, body.to_string()).await
}

pub async fn post_raw(app: Router, uri: &str, body: impl Into<String>) -> Response<Body> {
    let request = Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.into()))
        .unwrap();
    send(app, request).await
}

pub async fn request(app: Router, method: Method, uri: &str) -> Response<Body> {
    send(
        app,
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
