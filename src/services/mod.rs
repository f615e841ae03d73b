// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod assignment;
pub mod calendar;
pub mod conflict;
pub mod lessons;
pub mod notifications;

pub use assignment::AssignmentPolicy;
pub use conflict::ConflictChecker;
pub use lessons::{LessonService, ValidationStrictness};
pub use notifications::{
    LogNotifier, Notification, NotificationQueue, Notifier, NotifyError, OutgoingMail,
    RelayNotifier,
};
