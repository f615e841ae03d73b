// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Calendar event routes, scoped by the caller's role.

use super::parse_timestamp;
use crate::error::Result;
use crate::models::{CalendarEvent, Lesson, Principal};
use crate::services::calendar;
use crate::services::lessons::check_range;
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    routing::{get, put},
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/events", get(get_events))
        .route("/api/events/range", get(get_events_in_range))
        .route("/api/events/{id}", put(move_event))
}

#[derive(Deserialize)]
struct RangeQuery {
    start: Option<String>,
    end: Option<String>,
}

#[derive(Deserialize)]
struct MoveEventRequest {
    #[serde(alias = "dateTime")]
    start: Option<String>,
    end: Option<String>,
}

/// Admins project everything; riders only need their own lessons.
fn lessons_for(state: &AppState, principal: &Principal) -> Vec<Lesson> {
    if principal.is_admin() {
        state.lessons.all()
    } else {
        state.lessons.for_rider(&principal.username)
    }
}

async fn get_events(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> Json<Vec<CalendarEvent>> {
    let lessons = lessons_for(&state, &principal);
    Json(calendar::project(&lessons, &principal))
}

/// Events starting within `[start, end]`.
async fn get_events_in_range(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Query(params): Query<RangeQuery>,
) -> Result<Json<Vec<CalendarEvent>>> {
    let start = parse_timestamp(params.start.as_deref(), "start")?;
    let end = parse_timestamp(params.end.as_deref(), "end")?;
    check_range(start, end)?;

    tracing::debug!(
        username = %principal.username,
        start = %start,
        end = %end,
        "Fetching calendar range"
    );

    let lessons = lessons_for(&state, &principal);
    Ok(Json(calendar::project_range(
        &lessons, &principal, start, end,
    )))
}

/// Drag-and-drop reschedule. Open to admins and assigned riders.
async fn move_event(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    body: std::result::Result<Json<MoveEventRequest>, JsonRejection>,
) -> Result<Json<CalendarEvent>> {
    let Json(body) = body?;
    let start = parse_timestamp(body.start.as_deref(), "start")?;
    let end = match body.end.as_deref() {
        Some(raw) => Some(parse_timestamp(Some(raw), "end")?),
        None => None,
    };

    let lesson = state.lessons.reschedule(&principal, &id, start, end).await?;
    Ok(Json(calendar::to_event(&lesson, &principal)))
}
