//! Integration tests for the notification inbox endpoints.

mod common;

use axum::http::StatusCode;
use common::{body_json, TestApp};
use openmic_core::user::UserType;
use serde_json::Value;

async fn inbox(app: &TestApp, token: &str, query: &str) -> Vec<Value> {
    let response = app
        .get(&format!("/api/v1/notifications{query}"), Some(token))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["data"].as_array().unwrap().clone()
}

async fn unread(app: &TestApp, token: &str) -> i64 {
    let response = app
        .get("/api/v1/notifications/unread-count", Some(token))
        .await;
    body_json(response).await["data"]["count"].as_i64().unwrap()
}

#[tokio::test]
async fn inbox_requires_token() {
    let app = TestApp::new();
    let response = app.get("/api/v1/notifications", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn new_event_alerts_comedian_and_booking_confirms() {
    let app = TestApp::new();
    let (_, comic) = app.user("Abe", UserType::Comedian).await;
    let (_, host) = app.user("Hana", UserType::Host).await;

    let event = app.create_event(&host, 2).await;

    let items = inbox(&app, &comic, "").await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["type"], "slot_available");
    assert_eq!(items[0]["read"], false);
    assert_eq!(items[0]["event_id"], event["id"]);

    let uri = format!(
        "/api/v1/events/{}/slots/{}",
        event["id"].as_str().unwrap(),
        event["time_slots"][1]["id"].as_str().unwrap()
    );
    assert_eq!(app.post(&uri, &comic, None).await.status(), StatusCode::OK);

    let items = inbox(&app, &comic, "").await;
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["type"], "slot_confirmed");
    assert_eq!(items[0]["time_slot_id"], event["time_slots"][1]["id"]);
    assert_eq!(unread(&app, &comic).await, 2);
}

#[tokio::test]
async fn rsvp_notifies_host() {
    let app = TestApp::new();
    let (_, host) = app.user("Hana", UserType::Host).await;
    let (_, guest) = app.user("Gus", UserType::Guest).await;
    let event = app.create_event(&host, 0).await;

    app.post(
        &format!("/api/v1/events/{}/attend", event["id"].as_str().unwrap()),
        &guest,
        Some(serde_json::json!({})),
    )
    .await;

    let items = inbox(&app, &host, "").await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["type"], "new_attendee");
}

#[tokio::test]
async fn mark_read_and_read_all_update_unread_count() {
    let app = TestApp::new();
    let (_, comic) = app.user("Abe", UserType::Comedian).await;
    let (_, host) = app.user("Hana", UserType::Host).await;
    app.create_event(&host, 1).await;
    app.create_event(&host, 1).await;
    app.create_event(&host, 1).await;
    assert_eq!(unread(&app, &comic).await, 3);

    let items = inbox(&app, &comic, "").await;
    let first = items[0]["id"].as_str().unwrap();
    let response = app
        .post(&format!("/api/v1/notifications/{first}/read"), &comic, None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["read"], true);
    assert_eq!(unread(&app, &comic).await, 2);
    assert_eq!(inbox(&app, &comic, "?unread_only=true").await.len(), 2);

    let response = app
        .post("/api/v1/notifications/read-all", &comic, None)
        .await;
    assert_eq!(body_json(response).await["data"]["marked_read"], 2);
    assert_eq!(unread(&app, &comic).await, 0);
    assert_eq!(inbox(&app, &comic, "").await.len(), 3);
}

#[tokio::test]
async fn cannot_touch_someone_elses_notification() {
    let app = TestApp::new();
    let (_, comic) = app.user("Abe", UserType::Comedian).await;
    let (_, host) = app.user("Hana", UserType::Host).await;
    app.create_event(&host, 1).await;

    let items = inbox(&app, &comic, "").await;
    let uri = format!("/api/v1/notifications/{}", items[0]["id"].as_str().unwrap());

    let response = app.delete(&uri, &host).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let response = app.post(&format!("{uri}/read"), &host, None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    assert_eq!(app.delete(&uri, &comic).await.status(), StatusCode::NO_CONTENT);
    assert!(inbox(&app, &comic, "").await.is_empty());
    assert_eq!(app.delete(&uri, &comic).await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn cancellation_notifies_roster() {
    let app = TestApp::new();
    let (_, host) = app.user("Hana", UserType::Host).await;
    let (_, guest) = app.user("Gus", UserType::Guest).await;
    let event = app.create_event(&host, 0).await;
    let event_uri = format!("/api/v1/events/{}", event["id"].as_str().unwrap());

    app.post(
        &format!("{event_uri}/attend"),
        &guest,
        Some(serde_json::json!({})),
    )
    .await;
    app.put(&event_uri, &host, serde_json::json!({ "status": "cancelled" }))
        .await;

    let items = inbox(&app, &guest, "").await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["type"], "event_cancelled");
}
