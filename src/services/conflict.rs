// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Time-slot conflict detection.

use crate::db::LessonStore;
use crate::models::Lesson;
use chrono::{DateTime, Utc};

/// Scans a store for lessons overlapping a candidate slot.
///
/// Slots are half-open, so a lesson ending at 11:00 does not conflict with
/// one starting at 11:00.
pub struct ConflictChecker<'a> {
    store: &'a dyn LessonStore,
}

impl<'a> ConflictChecker<'a> {
    pub fn new(store: &'a dyn LessonStore) -> Self {
        Self { store }
    }

    /// First lesson (by start time) overlapping `[start, start + duration)`,
    /// ignoring `exclude_id`.
    pub fn find_conflict(
        &self,
        start: DateTime<Utc>,
        duration: u32,
        exclude_id: Option<&str>,
    ) -> Option<Lesson> {
        self.store
            .all()
            .into_iter()
            .filter(|lesson| Some(lesson.id.as_str()) != exclude_id)
            .find(|lesson| lesson.overlaps(start, duration))
    }

    pub fn has_conflict(
        &self,
        start: DateTime<Utc>,
        duration: u32,
        exclude_id: Option<&str>,
    ) -> bool {
        self.find_conflict(start, duration, exclude_id).is_some()
    }
}
