// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Riding School: lesson scheduling for a riding school
//!
//! This crate provides the backend API that lets administrators schedule
//! lessons and assign riders, and lets riders see their own calendar.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::{LessonStore, MemoryLessonStore, MemoryRiderDirectory, RiderDirectory};
use services::{LessonService, NotificationQueue};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub lessons: LessonService,
    pub riders: Arc<dyn RiderDirectory>,
    pub notifications: NotificationQueue,
}

impl AppState {
    /// Wire the in-memory stores, seeding the configured admin account.
    pub fn in_memory(config: Config, notifications: NotificationQueue) -> Self {
        let riders = Arc::new(MemoryRiderDirectory::with_admin(
            &config.admin_username,
            &config.admin_email,
        ));
        Self::new(
            config,
            Arc::new(MemoryLessonStore::new()),
            riders,
            notifications,
        )
    }

    pub fn new(
        config: Config,
        store: Arc<dyn LessonStore>,
        riders: Arc<dyn RiderDirectory>,
        notifications: NotificationQueue,
    ) -> Self {
        let lessons = LessonService::new(
            store,
            riders.clone(),
            notifications.clone(),
            config.assignment_policy,
            config.validation_strictness,
        );

        Self {
            config,
            lessons,
            riders,
            notifications,
        }
    }
}
