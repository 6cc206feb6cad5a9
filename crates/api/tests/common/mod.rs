#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use studio_api::config::{SdJobConfig, ServerConfig, TryOnConfig};
use studio_api::router::build_app_router;
use studio_api::state::AppState;

/// Nothing listens on the discard port, so every call fails at connect time.
pub const UNREACHABLE_URL: &str = "http://127.0.0.1:9";

pub const MULTIPART_BOUNDARY: &str = "studio-test-boundary";

/// Build a test `ServerConfig` pointing both remote services at `remote_url`.
///
/// Poll interval is 1 ms and try-on credentials are empty.
pub fn test_config(remote_url: &str) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        http_client_timeout_secs: 5,
        poll_max_attempts: 20,
        log_json: false,
        sdjob: SdJobConfig {
            api_url: remote_url.to_string(),
            poll_interval_ms: 1,
        },
        tryon: TryOnConfig {
            api_url: remote_url.to_string(),
            access_key: String::new(),
            secret_key: String::new(),
            poll_interval_ms: 1,
        },
    }
}

/// Build the full application router with the production middleware stack.
pub fn build_test_app(config: ServerConfig) -> Router {
    let state = AppState::new(config.clone(), CancellationToken::new())
        .expect("test HTTP client should build");
    build_app_router(state, &config)
}

pub async fn get(app: Router, uri: &str) -> Response {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// POST a `multipart/form-data` body built from `(field, file_name, bytes)`.
pub async fn post_multipart(
    app: Router,
    uri: &str,
    parts: &[(&str, Option<&str>, &[u8])],
) -> Response {
    let mut body = Vec::new();
    for (name, file_name, data) in parts {
        body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}\r\n").as_bytes());
        match file_name {
            Some(file_name) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                     Content-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
            ),
        }
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}--\r\n").as_bytes());

    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
