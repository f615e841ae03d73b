// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::collections::BTreeMap;

/// Failures of the scheduling core.
///
/// Every variant is raised before any mutation is applied.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleError {
    #[error("{0}")]
    Invalid(String),

    #[error("Lesson not found")]
    LessonNotFound,

    #[error("Lesson date cannot be in the past")]
    InPast,

    #[error("Time slot conflicts with an existing lesson")]
    Conflict { existing_id: String },

    #[error("Cannot delete past lessons")]
    PastLessonDeletion,

    #[error("Lesson is already assigned to a rider")]
    AlreadyAssigned,

    #[error("Invalid rider username")]
    InvalidRider,

    #[error("Username already exists")]
    UsernameTaken,

    #[error("{0}")]
    NotPermitted(String),
}

impl ScheduleError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, ScheduleError::Conflict { .. })
    }

    /// First message out of a `validator` report, taking fields in name
    /// order so the same input always reports the same failure.
    pub fn from_validation(errors: validator::ValidationErrors) -> Self {
        let fields: BTreeMap<_, _> = errors.field_errors().into_iter().collect();
        let message = fields
            .values()
            .flat_map(|errs| errs.iter())
            .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
            .unwrap_or_else(|| errors.to_string());
        ScheduleError::Invalid(message)
    }
}

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<ScheduleError> for AppError {
    fn from(err: ScheduleError) -> Self {
        match err {
            ScheduleError::NotPermitted(msg) => AppError::Forbidden(msg),
            other => AppError::BadRequest(other.to_string()),
        }
    }
}

/// Malformed or mistyped request bodies are client errors like any other.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", None),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "invalid_token", None),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", Some(msg.clone())),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "validation_error", Some(msg.clone()))
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewLesson;
    use validator::Validate;

    #[test]
    fn test_validation_message_is_stable_across_fields() {
        // Name, start and duration all fail; the report must not depend on
        // hash order.
        for _ in 0..16 {
            let errors = NewLesson::default().validate().unwrap_err();
            assert_eq!(
                ScheduleError::from_validation(errors),
                ScheduleError::Invalid("Duration is required".to_string())
            );
        }
    }

    #[test]
    fn test_not_permitted_maps_to_forbidden() {
        let err = AppError::from(ScheduleError::NotPermitted("nope".to_string()));
        assert_eq!(err.into_response().status(), StatusCode::FORBIDDEN);

        let err = AppError::from(ScheduleError::LessonNotFound);
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
