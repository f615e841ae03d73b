//! Riders, roles and the authenticated principal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// The two fixed roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum Role {
    Admin,
    Rider,
}

/// Account known to the rider directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Rider {
    /// Unique key
    pub username: String,
    pub email: String,
    pub role: Role,
    /// True until the rider replaces the default credential
    pub uses_default_credential: bool,
    pub created_at: DateTime<Utc>,
}

impl Rider {
    /// New rider-role account on the default credential.
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            role: Role::Rider,
            uses_default_credential: true,
            created_at: Utc::now(),
        }
    }

    pub fn admin(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            role: Role::Admin,
            uses_default_credential: false,
            ..Self::new(username, email)
        }
    }

    pub fn is_rider(&self) -> bool {
        self.role == Role::Rider
    }
}

/// Identity extracted from a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub username: String,
    pub role: Role,
}

impl Principal {
    pub fn new(username: impl Into<String>, role: Role) -> Self {
        Self {
            username: username.into(),
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Admins may act on anyone; riders only on themselves.
    pub fn can_act_for(&self, username: &str) -> bool {
        self.is_admin() || self.username == username
    }
}
