// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod event;
pub mod lesson;
pub mod rider;

pub use event::CalendarEvent;
pub use lesson::{Lesson, LessonState, LessonUpdate, NewLesson};
pub use rider::{Principal, Rider, Role};
