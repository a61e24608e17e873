//! Integration tests for proxy behavior

use axum::{
    Router,
    body::{Body, Bytes},
    http::{HeaderMap, Request, StatusCode, header},
    response::Response,
    routing::{get, post},
};
use prompt_tap::{format::PromptField, proxy::ReverseProxy, state::AppState};
use std::{net::SocketAddr, sync::Arc};

async fn spawn_backend(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn spawn_proxy(backend: &str, verbose: bool) -> SocketAddr {
    let state = Arc::new(AppState {
        proxy: ReverseProxy::new(backend).unwrap(),
        verbose,
        prompt_field: PromptField::Auto,
    });
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(
            listener,
            prompt_tap::router(state).into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });
    tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
    addr
}

fn echo_backend() -> Router {
    Router::new()
        .route("/api/generate", post(|body: Bytes| async move { body }))
        .route("/api/chat", post(|body: Bytes| async move { body }))
}

#[tokio::test]
async fn test_generate_body_round_trip() {
    let backend = spawn_backend(echo_backend()).await;
    let proxy = spawn_proxy(&format!("http://{}", backend), false).await;

    let body = r#"{"model":"llama2","prompt":"hello"}"#;
    let response = reqwest::Client::new()
        .post(format!("http://{}/api/generate", proxy))
        .header("content-type", "application/json")
        .body(body)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), body);
}

#[tokio::test]
async fn test_verbose_mode_round_trip() {
    let backend = spawn_backend(echo_backend()).await;
    let proxy = spawn_proxy(&format!("http://{}", backend), true).await;

    let body = r#"{"model":"llama2","messages":[{"role":"user","content":"why is the sky blue?"}]}"#;
    let response = reqwest::Client::new()
        .post(format!("http://{}/api/chat?stream=false", proxy))
        .header("x-client", "integration")
        .body(body)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), body);
}

#[tokio::test]
async fn test_binary_body_preserved() {
    let backend = spawn_backend(echo_backend()).await;
    let proxy = spawn_proxy(&format!("http://{}", backend), true).await;

    let body: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
    let response = reqwest::Client::new()
        .post(format!("http://{}/api/generate", proxy))
        .body(body.clone())
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.bytes().await.unwrap().as_ref(), body.as_slice());
}

#[tokio::test]
async fn test_get_without_body_passes_through() {
    let backend_app = Router::new().route(
        "/api/tags",
        get(|request: Request<Body>| async move {
            let body = axum::body::to_bytes(request.into_body(), usize::MAX)
                .await
                .unwrap();
            let mut response = Response::new(Body::from(format!(
                r#"{{"models":[],"received":{}}}"#,
                body.len()
            )));
            response.headers_mut().insert(
                header::CONTENT_TYPE,
                header::HeaderValue::from_static("application/json"),
            );
            response
                .headers_mut()
                .insert("x-backend", header::HeaderValue::from_static("test-value"));
            response
        }),
    );
    let backend = spawn_backend(backend_app).await;
    let proxy = spawn_proxy(&format!("http://{}", backend), false).await;

    let response = reqwest::Client::new()
        .get(format!("http://{}/api/tags", proxy))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("content-type").unwrap(), "application/json");
    assert_eq!(response.headers().get("x-backend").unwrap(), "test-value");
    assert_eq!(response.text().await.unwrap(), r#"{"models":[],"received":0}"#);
}

#[tokio::test]
async fn test_query_parameters_preserved() {
    let backend_app = Router::new().route(
        "/api/search",
        get(|request: Request<Body>| async move {
            format!("Query: {}", request.uri().query().unwrap_or(""))
        }),
    );
    let backend = spawn_backend(backend_app).await;
    let proxy = spawn_proxy(&format!("http://{}", backend), false).await;

    let response = reqwest::Client::new()
        .get(format!("http://{}/api/search?q=test&page=2&limit=10", proxy))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "Query: q=test&page=2&limit=10");
}

#[tokio::test]
async fn test_host_rewritten_and_headers_forwarded() {
    let backend_app = Router::new().route(
        "/api/headers",
        get(|headers: HeaderMap| async move {
            let value = |name: &str| {
                headers
                    .get(name)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("")
                    .to_string()
            };
            format!(
                "{}|{}|{}",
                value("host"),
                value("x-custom"),
                value("x-forwarded-for")
            )
        }),
    );
    let backend = spawn_backend(backend_app).await;
    let proxy = spawn_proxy(&format!("http://{}", backend), false).await;

    let response = reqwest::Client::new()
        .get(format!("http://{}/api/headers", proxy))
        .header("x-custom", "should-preserve")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.text().await.unwrap(),
        format!("{}|should-preserve|127.0.0.1", backend)
    );
}

#[tokio::test]
async fn test_backend_error_propagated() {
    let backend_app = Router::new().route(
        "/api/error",
        get(|| async {
            let mut response = Response::new(Body::from("Backend error"));
            *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            response
                .headers_mut()
                .insert("x-error", header::HeaderValue::from_static("backend-failure"));
            response
        }),
    );
    let backend = spawn_backend(backend_app).await;
    let proxy = spawn_proxy(&format!("http://{}", backend), false).await;

    let response = reqwest::Client::new()
        .get(format!("http://{}/api/error", proxy))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.headers().get("x-error").unwrap(), "backend-failure");
    assert_eq!(response.text().await.unwrap(), "Backend error");
}

#[tokio::test]
async fn test_unknown_path_returns_backend_404() {
    let backend = spawn_backend(echo_backend()).await;
    let proxy = spawn_proxy(&format!("http://{}", backend), false).await;

    let response = reqwest::Client::new()
        .get(format!("http://{}/does/not/exist", proxy))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_backend_unavailable() {
    // Reserve a port, then free it so nothing is listening there
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let dead = listener.local_addr().unwrap();
    drop(listener);

    let proxy = spawn_proxy(&format!("http://{}", dead), false).await;

    let response = reqwest::Client::new()
        .post(format!("http://{}/api/generate", proxy))
        .body(r#"{"prompt":"anyone there?"}"#)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[test]
fn test_invalid_backend_rejected() {
    assert!(ReverseProxy::new("http://exa mple.com").is_err());
    assert!(ReverseProxy::new("file:///tmp/socket").is_err());
    assert!(ReverseProxy::new("http://localhost:70000").is_err());
}
