// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Lesson lifecycle: create, update, reschedule, delete and queries.
//!
//! All mutations run under one async write lock so that the conflict scan
//! and the commit that follows it cannot interleave with another mutation.
//! Reads go straight to the store.

use crate::db::{LessonStore, RiderDirectory};
use crate::error::ScheduleError;
use crate::models::lesson::{MAX_DURATION_MINUTES, MIN_DURATION_MINUTES};
use crate::models::{Lesson, LessonState, LessonUpdate, NewLesson, Principal};
use crate::services::assignment::AssignmentPolicy;
use crate::services::conflict::ConflictChecker;
use crate::services::notifications::NotificationQueue;
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::Mutex;
use validator::Validate;

const STRICT_MIN_NAME_CHARS: usize = 3;
const STRICT_MIN_DESCRIPTION_CHARS: usize = 10;

/// How much free text a lesson must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationStrictness {
    /// Non-blank name; description optional.
    #[default]
    Lenient,
    /// Name of at least 3 characters and a description of at least 10.
    Strict,
}

impl FromStr for ValidationStrictness {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lenient" => Ok(Self::Lenient),
            "strict" => Ok(Self::Strict),
            other => Err(format!("unknown validation strictness '{}'", other)),
        }
    }
}

impl ValidationStrictness {
    fn check_name(self, name: &str) -> Result<(), ScheduleError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ScheduleError::Invalid("Name is required".to_string()));
        }
        if self == Self::Strict && name.chars().count() < STRICT_MIN_NAME_CHARS {
            return Err(ScheduleError::Invalid(
                "Name must be at least 3 characters".to_string(),
            ));
        }
        Ok(())
    }

    fn check_description(self, description: Option<&str>) -> Result<(), ScheduleError> {
        if self == Self::Lenient {
            return Ok(());
        }
        let len = description.map(|d| d.trim().chars().count()).unwrap_or(0);
        if len < STRICT_MIN_DESCRIPTION_CHARS {
            return Err(ScheduleError::Invalid(
                "Description must be at least 10 characters".to_string(),
            ));
        }
        Ok(())
    }
}

/// Scheduling core shared by all request handlers.
pub struct LessonService {
    pub(crate) store: Arc<dyn LessonStore>,
    pub(crate) riders: Arc<dyn RiderDirectory>,
    pub(crate) notifications: NotificationQueue,
    pub(crate) assignment_policy: AssignmentPolicy,
    strictness: ValidationStrictness,
    /// Serializes every mutation.
    pub(crate) write_lock: Mutex<()>,
}

impl LessonService {
    pub fn new(
        store: Arc<dyn LessonStore>,
        riders: Arc<dyn RiderDirectory>,
        notifications: NotificationQueue,
        assignment_policy: AssignmentPolicy,
        strictness: ValidationStrictness,
    ) -> Self {
        Self {
            store,
            riders,
            notifications,
            assignment_policy,
            strictness,
            write_lock: Mutex::new(()),
        }
    }

    // ─── Queries ─────────────────────────────────────────────────

    pub fn get(&self, id: &str) -> Result<Lesson, ScheduleError> {
        self.store.get(id).ok_or(ScheduleError::LessonNotFound)
    }

    pub fn all(&self) -> Vec<Lesson> {
        self.store.all()
    }

    pub fn for_rider(&self, username: &str) -> Vec<Lesson> {
        self.store.for_rider(username)
    }

    /// Lessons starting in `[start, end)`.
    pub fn in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Lesson>, ScheduleError> {
        check_range(start, end)?;
        Ok(self.store.in_range(start, end))
    }

    // ─── Mutations ───────────────────────────────────────────────

    pub async fn create(&self, new: NewLesson) -> Result<Lesson, ScheduleError> {
        new.validate().map_err(ScheduleError::from_validation)?;
        self.strictness.check_name(&new.name)?;
        self.strictness
            .check_description(new.description.as_deref())?;

        let (Some(scheduled_start), Some(duration)) = (new.scheduled_start, new.duration) else {
            return Err(ScheduleError::Invalid(
                "Name, date/time, and duration are required".to_string(),
            ));
        };

        let now = Utc::now();
        if scheduled_start < now {
            return Err(ScheduleError::InPast);
        }

        let _guard = self.write_lock.lock().await;
        self.ensure_slot_free(scheduled_start, duration, None)?;

        let lesson = Lesson {
            id: uuid::Uuid::new_v4().to_string(),
            name: new.name.trim().to_string(),
            description: new.description,
            scheduled_start,
            duration,
            image_ref: new.image_ref,
            assigned_riders: BTreeSet::new(),
            created_at: now,
            updated_at: now,
        };
        self.store.put(lesson.clone());

        tracing::info!(
            lesson_id = %lesson.id,
            name = %lesson.name,
            start = %lesson.scheduled_start,
            duration = lesson.duration,
            "Lesson created"
        );
        Ok(lesson)
    }

    pub async fn update(&self, id: &str, update: LessonUpdate) -> Result<Lesson, ScheduleError> {
        update.validate().map_err(ScheduleError::from_validation)?;
        if let Some(name) = &update.name {
            self.strictness.check_name(name)?;
        }
        if let Some(description) = &update.description {
            self.strictness.check_description(description.as_deref())?;
        }

        let _guard = self.write_lock.lock().await;
        let mut lesson = self.get(id)?;

        let now = Utc::now();
        if let Some(start) = update.scheduled_start {
            if start < now {
                return Err(ScheduleError::InPast);
            }
        }

        let moves = update.changes_schedule();
        update.apply_to(&mut lesson);
        if moves {
            self.ensure_slot_free(lesson.scheduled_start, lesson.duration, Some(id))?;
        }

        lesson.updated_at = now;
        self.store.put(lesson.clone());

        tracing::info!(lesson_id = %id, rescheduled = moves, "Lesson updated");
        Ok(lesson)
    }

    /// Move a lesson on the calendar.
    ///
    /// Admins may move any lesson, riders only lessons they are assigned to.
    /// When `end` is given the duration follows from it.
    pub async fn reschedule(
        &self,
        principal: &Principal,
        id: &str,
        start: DateTime<Utc>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Lesson, ScheduleError> {
        let _guard = self.write_lock.lock().await;
        let mut lesson = self.get(id)?;

        if !principal.is_admin() && !lesson.is_assigned_to(&principal.username) {
            tracing::warn!(
                lesson_id = %id,
                username = %principal.username,
                "Rejected reschedule by non-assignee"
            );
            return Err(ScheduleError::NotPermitted(
                "You do not have permission to update this lesson".to_string(),
            ));
        }

        let now = Utc::now();
        if start < now {
            return Err(ScheduleError::InPast);
        }

        let duration = match end {
            Some(end) => duration_between(start, end)?,
            None => lesson.duration,
        };

        self.ensure_slot_free(start, duration, Some(id))?;

        lesson.scheduled_start = start;
        lesson.duration = duration;
        lesson.updated_at = now;
        self.store.put(lesson.clone());

        tracing::info!(
            lesson_id = %id,
            username = %principal.username,
            start = %start,
            duration,
            "Lesson rescheduled"
        );
        Ok(lesson)
    }

    pub async fn delete(&self, id: &str) -> Result<(), ScheduleError> {
        let _guard = self.write_lock.lock().await;
        let lesson = self.get(id)?;

        if lesson.state_at(Utc::now()) == LessonState::Past {
            tracing::warn!(lesson_id = %id, "Refusing to delete past lesson");
            return Err(ScheduleError::PastLessonDeletion);
        }

        self.store.remove(id);
        tracing::info!(lesson_id = %id, "Lesson deleted");
        Ok(())
    }

    /// Caller must hold the write lock.
    fn ensure_slot_free(
        &self,
        start: DateTime<Utc>,
        duration: u32,
        exclude_id: Option<&str>,
    ) -> Result<(), ScheduleError> {
        match ConflictChecker::new(self.store.as_ref()).find_conflict(start, duration, exclude_id)
        {
            Some(existing) => {
                tracing::info!(
                    existing_id = %existing.id,
                    start = %start,
                    duration,
                    "Rejected conflicting time slot"
                );
                Err(ScheduleError::Conflict {
                    existing_id: existing.id,
                })
            }
            None => Ok(()),
        }
    }
}

/// Range bounds must both be present upstream and ordered here.
pub fn check_range(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<(), ScheduleError> {
    if end < start {
        return Err(ScheduleError::Invalid(
            "End date must not be before start date".to_string(),
        ));
    }
    Ok(())
}

fn duration_between(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<u32, ScheduleError> {
    let minutes = end.signed_duration_since(start).num_minutes();
    if minutes < i64::from(MIN_DURATION_MINUTES) || minutes > i64::from(MAX_DURATION_MINUTES) {
        return Err(ScheduleError::Invalid(
            "Duration must be between 15 and 180 minutes".to_string(),
        ));
    }
    Ok(minutes as u32)
}
