//! Application configuration loaded from environment variables.

use crate::services::{AssignmentPolicy, ValidationStrictness};
use std::env;

const DEFAULT_MAIL_FROM: &str = "\"Riding School\" <no-reply@ridingschool.local>";

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// HS256 key that session tokens are signed with (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// Capacity rule applied by the assignment manager
    pub assignment_policy: AssignmentPolicy,
    /// How strictly lesson text fields are validated
    pub validation_strictness: ValidationStrictness,
    /// HTTP mail relay. Notifications are only logged when unset.
    pub mail_relay_url: Option<String>,
    /// Sender for outgoing notifications
    pub mail_from: String,
    /// Seeded admin account
    pub admin_username: String,
    pub admin_email: String,
}

impl Config {
    /// Load configuration from environment variables (and `.env` if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
            assignment_policy: parse_or_default("ASSIGNMENT_POLICY")?,
            validation_strictness: parse_or_default("LESSON_VALIDATION")?,
            mail_relay_url: env::var("MAIL_RELAY_URL")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            mail_from: env::var("MAIL_FROM").unwrap_or_else(|_| DEFAULT_MAIL_FROM.to_string()),
            admin_username: env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string()),
            admin_email: env::var("ADMIN_EMAIL")
                .unwrap_or_else(|_| "admin@ridingschool.com".to_string()),
        })
    }

    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            port: 8080,
            frontend_url: "http://localhost:5173".to_string(),
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            assignment_policy: AssignmentPolicy::Multi,
            validation_strictness: ValidationStrictness::Lenient,
            mail_relay_url: None,
            mail_from: DEFAULT_MAIL_FROM.to_string(),
            admin_username: "admin".to_string(),
            admin_email: "admin@ridingschool.com".to_string(),
        }
    }
}

fn parse_or_default<T>(name: &'static str) -> Result<T, ConfigError>
where
    T: std::str::FromStr<Err = String> + Default,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .parse()
            .map_err(|reason| ConfigError::Invalid { name, reason }),
        _ => Ok(T::default()),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}
