//! Integration tests for the health check endpoint and general HTTP behaviour.

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::{body_json, TestApp};
use tower::ServiceExt;

// ---------------------------------------------------------------------------
// Test: GET /health returns 200 with expected JSON fields
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_check_returns_ok_with_json() {
    let app = TestApp::new();
    let response = app.get("/health", None).await;

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}

// ---------------------------------------------------------------------------
// Test: every response carries an x-request-id header
// ---------------------------------------------------------------------------

#[tokio::test]
async fn responses_carry_request_id() {
    let app = TestApp::new();
    let response = app.get("/health", None).await;

    let id = response
        .headers()
        .get("x-request-id")
        .expect("x-request-id header should be set");
    assert!(!id.is_empty());
}

// ---------------------------------------------------------------------------
// Test: writes without a bearer token are rejected
// ---------------------------------------------------------------------------

#[tokio::test]
async fn writes_require_a_token() {
    let app = TestApp::new();
    let response = app
        .send(Method::POST, "/api/v1/events", None, Some(common::event_body(1)))
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "UNAUTHORIZED");
}

// ---------------------------------------------------------------------------
// Test: a client-supplied request id is echoed back unchanged
// ---------------------------------------------------------------------------

#[tokio::test]
async fn client_request_id_is_kept() {
    let app = TestApp::new();
    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "trace-42")
        .body(Body::empty())
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.headers()["x-request-id"], "trace-42");
}

// ---------------------------------------------------------------------------
// Test: preflight from the configured origin is allowed and exposes the id
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cors_preflight_allows_configured_origin() {
    let app = TestApp::new();
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/v1/users/me")
        .header("origin", "http://localhost:5173")
        .header("access-control-request-method", "PUT")
        .body(Body::empty())
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    let headers = response.headers();

    assert_eq!(
        headers["access-control-allow-origin"],
        "http://localhost:5173"
    );
    assert!(headers["access-control-allow-methods"]
        .to_str()
        .unwrap()
        .contains("PUT"));
    assert_eq!(headers["access-control-expose-headers"], "x-request-id");
}
