// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Riding School API Server
//!
//! Schedules lessons, assigns riders and serves role-scoped calendars.

use riding_school::{
    config::Config,
    services::{LogNotifier, NotificationQueue, RelayNotifier},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        assignment_policy = ?config.assignment_policy,
        validation = ?config.validation_strictness,
        "Starting Riding School API"
    );

    // Start the notification worker
    let notifications = match &config.mail_relay_url {
        Some(url) => {
            tracing::info!(relay = %url, "Mail relay configured");
            NotificationQueue::spawn(RelayNotifier::new(url.clone())?, config.mail_from.clone())
        }
        None => {
            tracing::warn!("MAIL_RELAY_URL not set, notifications will only be logged");
            NotificationQueue::spawn(LogNotifier, config.mail_from.clone())
        }
    };

    // Build shared state
    let state = Arc::new(AppState::in_memory(config.clone(), notifications));

    // Build router
    let app = riding_school::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("riding_school=debug,info")),
        )
        .with(format)
        .init();
}
