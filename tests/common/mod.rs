// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use riding_school::config::Config;
use riding_school::db::{MemoryLessonStore, MemoryRiderDirectory, RiderDirectory};
use riding_school::middleware::auth::create_jwt;
use riding_school::models::{Rider, Role};
use riding_school::routes::create_router;
use riding_school::services::{Notification, NotificationQueue};
use riding_school::AppState;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tower::ServiceExt;

/// Everything a route test needs to drive and inspect the app.
#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    /// Direct handle on the lesson store, for seeding past lessons.
    pub store: MemoryLessonStore,
    pub outbox: UnboundedReceiver<Notification>,
}

/// Create a test app with in-memory stores and riders `alice` and `bob`.
#[allow(dead_code)]
pub fn create_test_app() -> TestApp {
    create_test_app_with(Config::test_default())
}

#[allow(dead_code)]
pub fn create_test_app_with(config: Config) -> TestApp {
    let (notifications, outbox) = NotificationQueue::channel();
    let store = MemoryLessonStore::new();
    let riders = Arc::new(MemoryRiderDirectory::with_admin(
        &config.admin_username,
        &config.admin_email,
    ));
    for name in ["alice", "bob"] {
        riders
            .register(Rider::new(name, format!("{}@example.com", name)))
            .expect("Failed to seed rider");
    }

    let state = Arc::new(AppState::new(
        config,
        Arc::new(store.clone()),
        riders,
        notifications,
    ));

    TestApp {
        router: create_router(state.clone()),
        state,
        store,
        outbox,
    }
}

/// Create a test JWT token.
#[allow(dead_code)]
pub fn create_test_jwt(username: &str, role: Role, signing_key: &[u8]) -> String {
    create_jwt(username, role, signing_key).expect("Failed to sign test token")
}

#[allow(dead_code)]
pub fn admin_token(state: &AppState) -> String {
    create_test_jwt("admin", Role::Admin, &state.config.jwt_signing_key)
}

#[allow(dead_code)]
pub fn rider_token(state: &AppState, username: &str) -> String {
    create_test_jwt(username, Role::Rider, &state.config.jwt_signing_key)
}

/// Send one request and decode the JSON response body.
#[allow(dead_code)]
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };
    (status, json)
}

/// Create a lesson as admin and return its id.
#[allow(dead_code)]
pub async fn create_lesson(app: &Router, token: &str, name: &str, start: &str, duration: u32) -> String {
    let (status, json) = send(
        app,
        "POST",
        "/api/lessons",
        Some(token),
        Some(serde_json::json!({
            "name": name,
            "description": "Rhythm, balance and transitions",
            "scheduledStart": start,
            "duration": duration,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {}", json);
    json["id"].as_str().expect("lesson id").to_string()
}
