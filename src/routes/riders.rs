// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Rider directory routes and the caller's own profile.

use crate::error::{AppError, Result, ScheduleError};
use crate::middleware::auth::require_admin;
use crate::models::{Principal, Rider, Role};
use crate::services::Notification;
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/riders", get(list_riders).post(register_rider))
        .route("/api/me", get(get_me))
}

#[derive(Deserialize, Validate)]
struct NewRiderRequest {
    #[validate(length(min = 3, max = 64, message = "Username must be 3-64 characters"))]
    username: String,
    #[validate(email(message = "Valid email is required"))]
    email: String,
}

impl NewRiderRequest {
    /// Surrounding whitespace is not part of the stored account.
    fn trimmed(self) -> Self {
        Self {
            username: self.username.trim().to_string(),
            email: self.email.trim().to_string(),
        }
    }
}

/// Current principal response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ProfileResponse {
    pub username: String,
    pub role: Role,
    pub email: Option<String>,
    pub uses_default_credential: bool,
}

async fn list_riders(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Vec<Rider>>> {
    require_admin(&principal)?;
    Ok(Json(state.riders.list_riders()))
}

/// Register a rider on the default credential and queue a welcome mail.
async fn register_rider(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    body: std::result::Result<Json<NewRiderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Rider>)> {
    require_admin(&principal)?;
    let Json(body) = body?;
    let body = body.trimmed();
    body.validate().map_err(ScheduleError::from_validation)?;

    let rider = state
        .riders
        .register(Rider::new(body.username, body.email))?;

    tracing::info!(username = %rider.username, "Rider registered");
    state.notifications.enqueue(Notification::RiderWelcome {
        to: rider.email.clone(),
        username: rider.username.clone(),
    });

    Ok((StatusCode::CREATED, Json(rider)))
}

async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<ProfileResponse>> {
    let account = state.riders.find(&principal.username);
    if account.is_none() && !principal.is_admin() {
        return Err(AppError::Unauthorized);
    }

    Ok(Json(ProfileResponse {
        username: principal.username,
        role: principal.role,
        email: account.as_ref().map(|a| a.email.clone()),
        uses_default_credential: account
            .map(|a| a.uses_default_credential)
            .unwrap_or(false),
    }))
}
