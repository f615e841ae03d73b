// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Role-scoped calendar projection.
//!
//! Admins see every lesson, with assigned riders appended to the title.
//! Riders see only lessons they are assigned to.

use crate::models::{CalendarEvent, Lesson, Principal};
use chrono::{DateTime, Utc};

/// Calendar view of one lesson for the given viewer.
pub fn to_event(lesson: &Lesson, viewer: &Principal) -> CalendarEvent {
    let title = if viewer.is_admin() && !lesson.assigned_riders.is_empty() {
        let riders: Vec<&str> = lesson.assigned_riders.iter().map(String::as_str).collect();
        format!("{} - {}", lesson.name, riders.join(", "))
    } else {
        lesson.name.clone()
    };

    CalendarEvent {
        id: lesson.id.clone(),
        title,
        start: lesson.scheduled_start,
        end: lesson.end(),
        all_day: false,
        description: lesson.description.clone(),
        image_ref: lesson.image_ref.clone(),
        duration: lesson.duration,
        assigned_riders: lesson.assigned_riders.clone(),
    }
}

fn visible_to(lesson: &Lesson, viewer: &Principal) -> bool {
    viewer.is_admin() || lesson.is_assigned_to(&viewer.username)
}

/// Project the lessons `viewer` may see.
pub fn project(lessons: &[Lesson], viewer: &Principal) -> Vec<CalendarEvent> {
    lessons
        .iter()
        .filter(|l| visible_to(l, viewer))
        .map(|l| to_event(l, viewer))
        .collect()
}

/// Like [`project`], keeping only events starting within `[start, end]`.
pub fn project_range(
    lessons: &[Lesson],
    viewer: &Principal,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Vec<CalendarEvent> {
    lessons
        .iter()
        .filter(|l| visible_to(l, viewer))
        .filter(|l| l.scheduled_start >= start && l.scheduled_start <= end)
        .map(|l| to_event(l, viewer))
        .collect()
}
