//! Mapping of domain errors onto HTTP responses.

mod common;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::{body_json, TestApp};
use openmic_api::error::AppError;
use openmic_core::error::CoreError;
use openmic_core::store::StoreError;
use openmic_core::types::new_id;

async fn render(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    (status, body_json(response).await)
}

#[tokio::test]
async fn not_found_names_entity() {
    let id = new_id();
    let (status, body) = render(CoreError::event_not_found(id).into()).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
    assert!(body["error"].as_str().unwrap().contains(&id.to_string()));
}

#[tokio::test]
async fn role_and_ownership_errors_are_forbidden_with_distinct_codes() {
    let (status, body) = render(CoreError::InvalidRole("hosts only".into()).into()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "INVALID_ROLE");

    let (status, body) = render(CoreError::Forbidden("not yours".into()).into()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");
}

#[tokio::test]
async fn conflict_and_validation_keep_message() {
    let (status, body) = render(CoreError::Conflict("Slot is already taken".into()).into()).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Slot is already taken");

    let (status, body) = render(CoreError::Validation("bad".into()).into()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn store_failures_are_sanitized() {
    let err = CoreError::Store(StoreError::Unavailable("pg at 10.0.0.5 refused".into()));
    let (status, body) = render(err.into()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "INTERNAL_ERROR");
    assert_eq!(body["error"], "An internal error occurred");
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let app = TestApp::new();
    let response = app.get("/api/v1/nope", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_event_id_is_rejected() {
    let app = TestApp::new();
    let response = app.get("/api/v1/events/not-a-uuid", None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn garbage_token_is_unauthorized() {
    let app = TestApp::new();
    let response = app.get("/api/v1/users/me", Some("abc.def.ghi")).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "UNAUTHORIZED");
}
