use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use datagate::context::AccountContext;
use datagate::credentials::{CredentialStore, MemoryBackend};
use datagate::routes;

const API_KEY_TTL: Duration = Duration::from_secs(300);
const ACCOUNT_TTL: Duration = Duration::from_secs(60);

fn account_service() -> Router {
    let store = CredentialStore::new(Arc::new(MemoryBackend::new()), API_KEY_TTL, ACCOUNT_TTL);
    routes::account_router(Arc::new(AccountContext::new(store)))
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, String) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8_lossy(&bytes).to_string())
}

fn add_api_key(key: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/addAPIKey")
        .header("apiKey", key)
        .body(Body::empty())
        .unwrap()
}

fn check_api_key(key: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(format!("/checkAPIKey?apiKey={key}"))
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn add_api_key_requires_the_header() {
    let router = account_service();
    let request = Request::builder()
        .method("POST")
        .uri("/addAPIKey")
        .body(Body::empty())
        .unwrap();

    let (status, _) = send(&router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn added_key_checks_out() {
    let router = account_service();

    let (status, _) = send(&router, add_api_key("k1")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&router, check_api_key("k1")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn unknown_key_is_not_found() {
    let router = account_service();
    let (status, _) = send(&router, check_api_key("never-added")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn check_requires_the_query_param() {
    let router = account_service();
    let request = Request::builder()
        .method("GET")
        .uri("/checkAPIKey")
        .body(Body::empty())
        .unwrap();

    let (status, _) = send(&router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test(start_paused = true)]
async fn api_key_expires_over_http() {
    let router = account_service();

    send(&router, add_api_key("k1")).await;

    tokio::time::advance(API_KEY_TTL + Duration::from_secs(1)).await;

    let (status, _) = send(&router, check_api_key("k1")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn account_round_trip() {
    let router = account_service();

    let request = Request::builder()
        .method("POST")
        .uri("/add")
        .body(Body::from(r#"{"id":"42","name":"alice"}"#))
        .unwrap();
    let (status, body) = send(&router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("alice"));
    assert!(body.contains("42"));

    let request = Request::builder()
        .method("GET")
        .uri("/get?id=42")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&router, request).await;
    assert_eq!(status, StatusCode::OK);

    let account: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(account, json!({"id": "42", "name": "alice"}));
}

#[tokio::test]
async fn malformed_account_body_is_rejected() {
    let router = account_service();
    let request = Request::builder()
        .method("POST")
        .uri("/add")
        .body(Body::from("not-json"))
        .unwrap();

    let (status, _) = send(&router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn get_requires_the_query_param() {
    let router = account_service();
    let request = Request::builder()
        .method("GET")
        .uri("/get")
        .body(Body::empty())
        .unwrap();

    let (status, _) = send(&router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_account_is_not_found() {
    let router = account_service();
    let request = Request::builder()
        .method("GET")
        .uri("/get?id=nobody")
        .body(Body::empty())
        .unwrap();

    let (status, _) = send(&router, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn health_reports_ok_with_a_live_backend() {
    let router = account_service();
    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(&router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");
}
