#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use chrono::{Duration, TimeZone, Utc};
use http_body_util::BodyExt;
use openmic_api::auth::jwt::{generate_access_token, JwtConfig};
use openmic_api::config::ServerConfig;
use openmic_api::router::build_app_router;
use openmic_api::state::AppState;
use openmic_booking::BookingServices;
use openmic_core::memory::{MemoryBlobStore, MemoryStore};
use openmic_core::store::EntityStore;
use openmic_core::user::{NewUser, User, UserType};
use serde_json::{json, Value};
use tower::ServiceExt;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        upload_dir: std::env::temp_dir().join("openmic-test-uploads"),
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 15,
        },
    }
}

/// The full application over in-memory stores, plus handles on both stores.
pub struct TestApp {
    pub router: Router,
    pub store: MemoryStore,
    pub blobs: MemoryBlobStore,
    pub config: ServerConfig,
}

impl TestApp {
    pub fn new() -> Self {
        let config = test_config();
        let store = MemoryStore::new();
        let blobs = MemoryBlobStore::new();
        let state = AppState {
            services: BookingServices::new(Arc::new(store.clone()), Arc::new(blobs.clone())),
            config: Arc::new(config.clone()),
        };
        Self {
            router: build_app_router(state, &config),
            store,
            blobs,
            config,
        }
    }

    /// Insert a user and return it with a valid bearer token.
    pub async fn user(&self, name: &str, user_type: UserType) -> (User, String) {
        let user = User::new(NewUser {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            password_hash: "not-a-real-hash".to_string(),
            user_type,
        });
        self.store.insert_user(&user).await.unwrap();
        let token = generate_access_token(user.id, user_type, &self.config.jwt).unwrap();
        (user, token)
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        self.router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap()
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Response<Body> {
        self.send(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Option<Value>) -> Response<Body> {
        self.send(Method::POST, uri, Some(token), body).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> Response<Body> {
        self.send(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> Response<Body> {
        self.send(Method::DELETE, uri, Some(token), None).await
    }

    /// Create an event with `slots` open slots through the API and return its JSON.
    pub async fn create_event(&self, host_token: &str, slots: u32) -> Value {
        let response = self
            .post("/api/v1/events", host_token, Some(event_body(slots)))
            .await;
        assert_eq!(response.status(), 201);
        body_json(response).await["data"].clone()
    }
}

/// Parse a response body as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn at(hour: u32) -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 11, 20, hour, 0, 0).unwrap()
}

pub fn slot_json(start_hour: u32) -> Value {
    json!({
        "start_time": at(start_hour),
        "end_time": at(start_hour) + Duration::minutes(10),
    })
}

pub fn event_body(slots: u32) -> Value {
    json!({
        "name": "Tuesday Open Mic",
        "description": "Sign up for five minutes",
        "venue": "The Cellar",
        "address": {
            "street": "1 Main St",
            "city": "Austin",
            "state": "TX",
            "zip_code": "78701"
        },
        "location": { "longitude": -97.74, "latitude": 30.27 },
        "date": at(0),
        "start_time": at(18),
        "end_time": at(23),
        "time_slots": (0..slots).map(|i| slot_json(18 + i)).collect::<Vec<_>>(),
    })
}
