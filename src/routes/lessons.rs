// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Lesson management routes.

use super::{parse_timestamp, MessageResponse};
use crate::error::{AppError, Result, ScheduleError};
use crate::middleware::auth::require_admin;
use crate::models::{Lesson, LessonUpdate, NewLesson, Principal};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Deserializer};
use std::sync::Arc;

/// Lesson routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/lessons", get(list_lessons).post(create_lesson))
        .route(
            "/api/lessons/{id}",
            get(get_lesson).put(update_lesson).delete(delete_lesson),
        )
        .route("/api/lessons/rider/{username}", get(get_rider_lessons))
        .route("/api/lessons/{id}/assign", post(assign_rider))
        .route("/api/lessons/{id}/unassign", post(unassign_rider))
}

/// Body for create and update. Every field is optional on the wire so that
/// missing values are reported as validation errors.
///
/// `description` and `imageRef` distinguish an absent key (keep) from an
/// explicit `null` (clear).
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonRequest {
    name: Option<String>,
    #[serde(default, deserialize_with = "present")]
    description: Option<Option<String>>,
    #[serde(alias = "dateTime")]
    scheduled_start: Option<String>,
    /// Signed so that negative values reach range validation.
    duration: Option<i64>,
    #[serde(default, alias = "imagePath", deserialize_with = "present")]
    image_ref: Option<Option<String>>,
}

/// Marks a key that was present in the body, even when its value is `null`.
fn present<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Narrow a wire duration, leaving the bounds check to `validator`.
fn duration_minutes(raw: Option<i64>) -> Result<Option<u32>> {
    raw.map(|minutes| {
        u32::try_from(minutes).map_err(|_| {
            AppError::from(ScheduleError::Invalid(
                "Duration must be between 15 and 180 minutes".to_string(),
            ))
        })
    })
    .transpose()
}

impl LessonRequest {
    fn into_new_lesson(self) -> Result<NewLesson> {
        let scheduled_start = match self.scheduled_start.as_deref() {
            Some(raw) => Some(parse_timestamp(Some(raw), "scheduledStart")?),
            None => None,
        };
        Ok(NewLesson {
            name: self.name.unwrap_or_default(),
            description: self.description.flatten(),
            scheduled_start,
            duration: duration_minutes(self.duration)?,
            image_ref: self.image_ref.flatten(),
        })
    }

    fn into_update(self) -> Result<LessonUpdate> {
        let scheduled_start = match self.scheduled_start.as_deref() {
            Some(raw) => Some(parse_timestamp(Some(raw), "scheduledStart")?),
            None => None,
        };
        Ok(LessonUpdate {
            name: self.name,
            description: self.description,
            image_ref: self.image_ref,
            scheduled_start,
            duration: duration_minutes(self.duration)?,
        })
    }
}

#[derive(Deserialize)]
struct RangeQuery {
    start: Option<String>,
    end: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssignRequest {
    rider_username: Option<String>,
}

impl AssignRequest {
    fn username(self) -> Result<String> {
        self.rider_username
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .ok_or_else(|| AppError::BadRequest("Rider username is required".to_string()))
    }
}

// ─── Queries ─────────────────────────────────────────────────

/// List lessons, optionally restricted to those starting in `[start, end)`.
async fn list_lessons(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RangeQuery>,
) -> Result<Json<Vec<Lesson>>> {
    let lessons = match (params.start.as_deref(), params.end.as_deref()) {
        (None, None) => state.lessons.all(),
        (start, end) => {
            let start = parse_timestamp(start, "start")?;
            let end = parse_timestamp(end, "end")?;
            state.lessons.in_range(start, end)?
        }
    };
    Ok(Json(lessons))
}

async fn get_lesson(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Lesson>> {
    Ok(Json(state.lessons.get(&id)?))
}

/// Lessons assigned to one rider. Riders may only ask about themselves.
async fn get_rider_lessons(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(username): Path<String>,
) -> Result<Json<Vec<Lesson>>> {
    if !principal.can_act_for(&username) {
        return Err(AppError::Forbidden("Unauthorized access".to_string()));
    }

    tracing::debug!(username = %username, "Fetching rider lessons");
    Ok(Json(state.lessons.for_rider(&username)))
}

// ─── Admin mutations ─────────────────────────────────────────

async fn create_lesson(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    body: std::result::Result<Json<LessonRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Lesson>)> {
    require_admin(&principal)?;
    let Json(body) = body?;
    let lesson = state.lessons.create(body.into_new_lesson()?).await?;
    Ok((StatusCode::CREATED, Json(lesson)))
}

async fn update_lesson(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    body: std::result::Result<Json<LessonRequest>, JsonRejection>,
) -> Result<Json<Lesson>> {
    require_admin(&principal)?;
    let Json(body) = body?;
    let lesson = state.lessons.update(&id, body.into_update()?).await?;
    Ok(Json(lesson))
}

async fn delete_lesson(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    require_admin(&principal)?;
    state.lessons.delete(&id).await?;
    Ok(Json(MessageResponse {
        message: "Lesson deleted successfully".to_string(),
    }))
}

async fn assign_rider(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    body: std::result::Result<Json<AssignRequest>, JsonRejection>,
) -> Result<Json<Lesson>> {
    require_admin(&principal)?;
    let Json(body) = body?;
    let lesson = state.lessons.assign(&id, &body.username()?).await?;
    Ok(Json(lesson))
}

async fn unassign_rider(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    body: std::result::Result<Json<AssignRequest>, JsonRejection>,
) -> Result<Json<Lesson>> {
    require_admin(&principal)?;
    let Json(body) = body?;
    let lesson = state.lessons.unassign(&id, &body.username()?).await?;
    Ok(Json(lesson))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_accepts_legacy_field_names() {
        let body: LessonRequest = serde_json::from_str(
            r#"{"name":"Trot Basics","dateTime":"2099-01-01T10:00","duration":60,"imagePath":"/uploads/a.png"}"#,
        )
        .unwrap();
        let new = body.into_new_lesson().unwrap();

        assert_eq!(new.name, "Trot Basics");
        assert!(new.scheduled_start.is_some());
        assert_eq!(new.duration, Some(60));
        assert_eq!(new.image_ref.as_deref(), Some("/uploads/a.png"));
    }

    #[test]
    fn test_unparseable_start_is_bad_request() {
        let body = LessonRequest {
            scheduled_start: Some("tomorrow-ish".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            body.into_update(),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_null_clears_but_missing_keeps() {
        let body: LessonRequest =
            serde_json::from_str(r#"{"imageRef":null,"name":"Canter"}"#).unwrap();
        let update = body.into_update().unwrap();
        assert_eq!(update.image_ref, Some(None));
        assert_eq!(update.description, None);

        let body: LessonRequest = serde_json::from_str(r#"{"description":"Poles"}"#).unwrap();
        let update = body.into_update().unwrap();
        assert_eq!(update.description, Some(Some("Poles".to_string())));
        assert_eq!(update.image_ref, None);
    }

    #[test]
    fn test_negative_duration_is_bad_request() {
        let body: LessonRequest = serde_json::from_str(r#"{"duration":-5}"#).unwrap();
        assert!(matches!(
            body.into_new_lesson(),
            Err(AppError::BadRequest(ref m)) if m == "Duration must be between 15 and 180 minutes"
        ));
    }

    #[test]
    fn test_blank_rider_username_is_rejected() {
        let req = AssignRequest {
            rider_username: Some("  ".to_string()),
        };
        assert!(matches!(req.username(), Err(AppError::BadRequest(_))));
    }
}
