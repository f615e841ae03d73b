// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process storage backed by `DashMap`.

use super::{LessonStore, RiderDirectory};
use crate::error::ScheduleError;
use crate::models::{Lesson, Rider};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

/// Volatile lesson store. Contents are lost on restart.
#[derive(Clone, Default)]
pub struct MemoryLessonStore {
    lessons: Arc<DashMap<String, Lesson>>,
}

impl MemoryLessonStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lessons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lessons.is_empty()
    }
}

impl LessonStore for MemoryLessonStore {
    fn get(&self, id: &str) -> Option<Lesson> {
        self.lessons.get(id).map(|entry| entry.value().clone())
    }

    fn all(&self) -> Vec<Lesson> {
        let mut lessons: Vec<Lesson> = self
            .lessons
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        lessons.sort_by(|a, b| {
            a.scheduled_start
                .cmp(&b.scheduled_start)
                .then_with(|| a.id.cmp(&b.id))
        });
        lessons
    }

    fn put(&self, lesson: Lesson) {
        self.lessons.insert(lesson.id.clone(), lesson);
    }

    fn remove(&self, id: &str) -> Option<Lesson> {
        self.lessons.remove(id).map(|(_, lesson)| lesson)
    }
}

/// Volatile account directory.
#[derive(Clone, Default)]
pub struct MemoryRiderDirectory {
    accounts: Arc<DashMap<String, Rider>>,
}

impl MemoryRiderDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory seeded with one admin account.
    pub fn with_admin(username: &str, email: &str) -> Self {
        let directory = Self::new();
        directory
            .accounts
            .insert(username.to_string(), Rider::admin(username, email));
        tracing::info!(username = %username, "Admin account initialized");
        directory
    }
}

impl RiderDirectory for MemoryRiderDirectory {
    fn find(&self, username: &str) -> Option<Rider> {
        self.accounts.get(username).map(|entry| entry.value().clone())
    }

    fn list_riders(&self) -> Vec<Rider> {
        let mut riders: Vec<Rider> = self
            .accounts
            .iter()
            .filter(|entry| entry.value().is_rider())
            .map(|entry| entry.value().clone())
            .collect();
        riders.sort_by(|a, b| a.username.cmp(&b.username));
        riders
    }

    fn register(&self, rider: Rider) -> Result<Rider, ScheduleError> {
        match self.accounts.entry(rider.username.clone()) {
            Entry::Occupied(_) => Err(ScheduleError::UsernameTaken),
            Entry::Vacant(slot) => {
                slot.insert(rider.clone());
                Ok(rider)
            }
        }
    }
}
