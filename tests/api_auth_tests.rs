// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API authentication and CORS tests.
//!
//! These tests verify that:
//! 1. Protected routes reject requests without valid tokens
//! 2. Tokens are accepted from the Authorization header or the session cookie
//! 3. CORS preflight requests return correct headers

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use riding_school::middleware::auth::{Claims, TOKEN_COOKIE};
use riding_school::models::Role;
use std::time::{SystemTime, UNIX_EPOCH};
use tower::ServiceExt;

mod common;

#[tokio::test]
async fn test_protected_route_without_token() {
    let t = common::create_test_app();

    let response = t
        .router
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/lessons")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_route_with_invalid_token() {
    let t = common::create_test_app();

    let response = t
        .router
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/lessons")
                .header(header::AUTHORIZATION, "Bearer invalid.token.here")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_signed_with_other_key_is_rejected() {
    let t = common::create_test_app();
    let token = common::create_test_jwt("admin", Role::Admin, b"not-the-server-key");

    let response = t
        .router
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/lessons")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_expired_token_is_rejected() {
    let t = common::create_test_app();
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize;

    let claims = Claims {
        sub: "admin".to_string(),
        role: Role::Admin,
        exp: now - 3600,
        iat: now - 7200,
    };
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(&t.state.config.jwt_signing_key),
    )
    .unwrap();

    let response = t
        .router
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/lessons")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_route_with_valid_token() {
    let t = common::create_test_app();
    let token = common::admin_token(&t.state);

    let response = t
        .router
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/lessons")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_session_cookie_is_accepted() {
    let t = common::create_test_app();
    let token = common::rider_token(&t.state, "alice");

    let response = t
        .router
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/events")
                .header(header::COOKIE, format!("{}={}", TOKEN_COOKIE, token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_cors_preflight() {
    let t = common::create_test_app();

    let response = t
        .router
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/lessons")
                .header(header::ORIGIN, "http://localhost:5173")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // OPTIONS should return 200 (CORS preflight success)
    assert_eq!(response.status(), StatusCode::OK);

    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_METHODS));
}

#[tokio::test]
async fn test_public_route_no_auth_required() {
    let t = common::create_test_app();

    let response = t
        .router
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("x-content-type-options").unwrap(),
        "nosniff"
    );
}
