// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Rider assignment.

use crate::error::ScheduleError;
use crate::models::Lesson;
use crate::services::lessons::LessonService;
use crate::services::notifications::Notification;
use chrono::Utc;
use std::str::FromStr;

/// How many riders a lesson holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssignmentPolicy {
    /// Any number of riders; re-assigning a member is a no-op.
    #[default]
    Multi,
    /// At most one rider; assigning to an occupied lesson fails.
    Single,
}

impl FromStr for AssignmentPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "multi" => Ok(Self::Multi),
            "single" => Ok(Self::Single),
            other => Err(format!("unknown assignment policy '{}'", other)),
        }
    }
}

impl LessonService {
    /// Assign a rider and queue their notification.
    ///
    /// The notification is handed off after the commit; its fate never
    /// affects the result.
    pub async fn assign(&self, lesson_id: &str, username: &str) -> Result<Lesson, ScheduleError> {
        let (lesson, email) = {
            let _guard = self.write_lock.lock().await;
            let mut lesson = self.get(lesson_id)?;

            let rider = self
                .riders
                .find(username)
                .filter(|r| r.is_rider())
                .ok_or_else(|| {
                    tracing::warn!(lesson_id = %lesson_id, username = %username, "Assignment target is not a rider");
                    ScheduleError::InvalidRider
                })?;

            match self.assignment_policy {
                AssignmentPolicy::Single if !lesson.assigned_riders.is_empty() => {
                    return Err(ScheduleError::AlreadyAssigned);
                }
                AssignmentPolicy::Multi if lesson.is_assigned_to(username) => {
                    tracing::debug!(lesson_id = %lesson_id, username = %username, "Rider already assigned");
                    return Ok(lesson);
                }
                _ => {}
            }

            lesson.assigned_riders.insert(rider.username.clone());
            lesson.updated_at = Utc::now();
            self.store.put(lesson.clone());
            (lesson, rider.email)
        };

        tracing::info!(lesson_id = %lesson_id, username = %username, "Rider assigned");

        self.notifications.enqueue(Notification::LessonAssigned {
            to: email,
            lesson: lesson.clone(),
        });
        Ok(lesson)
    }

    /// Remove a rider. Removing someone not assigned changes nothing.
    pub async fn unassign(&self, lesson_id: &str, username: &str) -> Result<Lesson, ScheduleError> {
        let _guard = self.write_lock.lock().await;
        let mut lesson = self.get(lesson_id)?;

        if !lesson.assigned_riders.remove(username) {
            tracing::debug!(lesson_id = %lesson_id, username = %username, "Rider was not assigned");
            return Ok(lesson);
        }

        lesson.updated_at = Utc::now();
        self.store.put(lesson.clone());

        tracing::info!(lesson_id = %lesson_id, username = %username, "Rider unassigned");
        Ok(lesson)
    }
}
