// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Lesson records and the typed inputs that create and modify them.

use crate::time_utils::{intervals_overlap, lesson_end};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Shortest bookable lesson, in minutes.
pub const MIN_DURATION_MINUTES: u32 = 15;
/// Longest bookable lesson, in minutes.
pub const MAX_DURATION_MINUTES: u32 = 180;

/// One scheduled riding session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Lesson {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub scheduled_start: DateTime<Utc>,
    /// Minutes, within `[MIN_DURATION_MINUTES, MAX_DURATION_MINUTES]`.
    pub duration: u32,
    /// Opaque reference handed out by the upload collaborator.
    pub image_ref: Option<String>,
    /// Usernames of assigned riders.
    pub assigned_riders: BTreeSet<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Effective state of a lesson, derived from the clock and assignments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LessonState {
    FutureUnassigned,
    FutureAssigned,
    Past,
}

impl Lesson {
    /// Computed end time. Never stored.
    pub fn end(&self) -> DateTime<Utc> {
        lesson_end(self.scheduled_start, self.duration)
    }

    /// Whether `[start, start + duration)` overlaps this lesson.
    pub fn overlaps(&self, start: DateTime<Utc>, duration: u32) -> bool {
        intervals_overlap(
            self.scheduled_start,
            self.end(),
            start,
            lesson_end(start, duration),
        )
    }

    pub fn is_assigned_to(&self, username: &str) -> bool {
        self.assigned_riders.contains(username)
    }

    pub fn state_at(&self, now: DateTime<Utc>) -> LessonState {
        if self.scheduled_start < now {
            LessonState::Past
        } else if self.assigned_riders.is_empty() {
            LessonState::FutureUnassigned
        } else {
            LessonState::FutureAssigned
        }
    }
}

/// Input for creating a lesson.
///
/// Required fields are optional here so that a missing value surfaces as a
/// validation error rather than a deserialization failure.
#[derive(Debug, Clone, Default, Validate)]
pub struct NewLesson {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    pub description: Option<String>,
    #[validate(required(message = "Date/time is required"))]
    pub scheduled_start: Option<DateTime<Utc>>,
    #[validate(
        required(message = "Duration is required"),
        range(
            min = 15,
            max = 180,
            message = "Duration must be between 15 and 180 minutes"
        )
    )]
    pub duration: Option<u32>,
    pub image_ref: Option<String>,
}

/// Partial update of a lesson. `None` leaves the field untouched; for the
/// clearable fields `Some(None)` clears it.
#[derive(Debug, Clone, Default, Validate)]
pub struct LessonUpdate {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub image_ref: Option<Option<String>>,
    pub scheduled_start: Option<DateTime<Utc>>,
    #[validate(range(
        min = 15,
        max = 180,
        message = "Duration must be between 15 and 180 minutes"
    ))]
    pub duration: Option<u32>,
}

impl LessonUpdate {
    /// Whether applying this update can move the lesson's interval.
    pub fn changes_schedule(&self) -> bool {
        self.scheduled_start.is_some() || self.duration.is_some()
    }

    /// Merge into `lesson`. Callers validate first.
    pub fn apply_to(self, lesson: &mut Lesson) {
        if let Some(name) = self.name {
            lesson.name = name.trim().to_string();
        }
        if let Some(description) = self.description {
            lesson.description = description;
        }
        if let Some(image_ref) = self.image_ref {
            lesson.image_ref = image_ref;
        }
        if let Some(start) = self.scheduled_start {
            lesson.scheduled_start = start;
        }
        if let Some(duration) = self.duration {
            lesson.duration = duration;
        }
    }
}
