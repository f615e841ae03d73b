// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Storage layer.
//!
//! The scheduling core talks to storage through [`LessonStore`] and
//! [`RiderDirectory`]; the in-memory implementations live in [`memory`].

pub mod memory;

pub use memory::{MemoryLessonStore, MemoryRiderDirectory};

use crate::error::ScheduleError;
use crate::models::{Lesson, Rider};
use chrono::{DateTime, Utc};

/// Authoritative collection of lesson records.
///
/// Implementations hand out owned copies; nothing returned here aliases the
/// stored records. Individual calls are atomic, but sequences of calls are
/// not: callers that check-then-write must serialize themselves.
pub trait LessonStore: Send + Sync {
    /// Fetch one lesson.
    fn get(&self, id: &str) -> Option<Lesson>;

    /// All lessons, ordered by start time.
    fn all(&self) -> Vec<Lesson>;

    /// Insert or replace a lesson keyed by its id.
    fn put(&self, lesson: Lesson);

    /// Remove a lesson, returning it if it existed.
    fn remove(&self, id: &str) -> Option<Lesson>;

    /// Lessons the rider is assigned to, ordered by start time.
    fn for_rider(&self, username: &str) -> Vec<Lesson> {
        self.all()
            .into_iter()
            .filter(|l| l.is_assigned_to(username))
            .collect()
    }

    /// Lessons starting in `[start, end)`, ordered by start time.
    fn in_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<Lesson> {
        self.all()
            .into_iter()
            .filter(|l| l.scheduled_start >= start && l.scheduled_start < end)
            .collect()
    }
}

/// Identity collaborator: resolves usernames to accounts.
pub trait RiderDirectory: Send + Sync {
    fn find(&self, username: &str) -> Option<Rider>;

    /// Rider-role accounts, ordered by username.
    fn list_riders(&self) -> Vec<Rider>;

    /// Add an account. Fails if the username is taken.
    fn register(&self, rider: Rider) -> Result<Rider, ScheduleError>;
}
