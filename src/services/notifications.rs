// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Best-effort outbound notifications.
//!
//! Callers enqueue a [`Notification`] and move on. A single background worker
//! renders each one into an [`OutgoingMail`] and makes one delivery attempt
//! through a [`Notifier`]. Failures are logged and dropped; nothing is
//! reported back to the operation that triggered the notification.

use crate::models::Lesson;
use anyhow::Context;
use serde::Serialize;
use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;

/// Upper bound on one relay delivery; the worker delivers in order.
const DEFAULT_RELAY_TIMEOUT: Duration = Duration::from_secs(10);

/// Something worth telling a rider about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    LessonAssigned { to: String, lesson: Lesson },
    RiderWelcome { to: String, username: String },
}

impl Notification {
    pub fn recipient(&self) -> &str {
        match self {
            Notification::LessonAssigned { to, .. } | Notification::RiderWelcome { to, .. } => to,
        }
    }

    pub fn subject(&self) -> String {
        match self {
            Notification::LessonAssigned { lesson, .. } => {
                format!("New Riding Lesson Assigned: {}", lesson.name)
            }
            Notification::RiderWelcome { .. } => "Welcome to Riding School!".to_string(),
        }
    }

    pub fn body(&self) -> String {
        match self {
            Notification::LessonAssigned { lesson, .. } => format!(
                "You have been assigned to a new riding lesson!\n\n\
                 Lesson: {}\n\
                 Description: {}\n\
                 Date: {}\n\
                 Time: {}\n\
                 Duration: {} minutes\n\n\
                 Please log in to your dashboard to view more details.\n\
                 If you need to make any changes, please contact the administrator.",
                lesson.name,
                lesson
                    .description
                    .as_deref()
                    .filter(|d| !d.trim().is_empty())
                    .unwrap_or("No description provided"),
                lesson.scheduled_start.format("%Y-%m-%d"),
                lesson.scheduled_start.format("%H:%M UTC"),
                lesson.duration,
            ),
            Notification::RiderWelcome { username, .. } => format!(
                "Hello {},\n\n\
                 Your account has been successfully created and you can now log in \
                 with the default password. Please change it after your first login.\n\n\
                 If you have any questions, please don't hesitate to contact us.",
                username
            ),
        }
    }

    /// Render for delivery.
    pub fn to_mail(&self, from: &str) -> OutgoingMail {
        OutgoingMail {
            from: from.to_string(),
            to: self.recipient().to_string(),
            subject: self.subject(),
            body: self.body(),
        }
    }
}

/// Rendered message handed to a transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingMail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Errors from a delivery attempt.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Mail relay request failed: {0}")]
    Transport(String),

    #[error("Mail relay rejected message with status {0}")]
    Rejected(u16),
}

/// Delivery transport.
pub trait Notifier: Send + Sync + 'static {
    fn deliver(&self, mail: &OutgoingMail) -> impl Future<Output = Result<(), NotifyError>> + Send;
}

/// Transport that only logs. Used when no relay is configured.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    async fn deliver(&self, mail: &OutgoingMail) -> Result<(), NotifyError> {
        tracing::info!(
            to = %mail.to,
            subject = %mail.subject,
            "Mail relay not configured, notification logged only"
        );
        Ok(())
    }
}

/// Transport that POSTs the rendered mail as JSON to an HTTP relay.
#[derive(Debug, Clone)]
pub struct RelayNotifier {
    http: reqwest::Client,
    url: String,
}

impl RelayNotifier {
    pub fn new(url: impl Into<String>) -> anyhow::Result<Self> {
        Self::with_timeout(url, DEFAULT_RELAY_TIMEOUT)
    }

    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed building mail relay HTTP client")?;

        Ok(Self {
            http,
            url: url.into(),
        })
    }
}

impl Notifier for RelayNotifier {
    async fn deliver(&self, mail: &OutgoingMail) -> Result<(), NotifyError> {
        let response = self
            .http
            .post(&self.url)
            .json(mail)
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Rejected(status.as_u16()));
        }
        Ok(())
    }
}

/// Sending half of the notification channel.
#[derive(Debug, Clone)]
pub struct NotificationQueue {
    tx: mpsc::UnboundedSender<Notification>,
}

impl NotificationQueue {
    /// Start the delivery worker on the current tokio runtime.
    pub fn spawn<N: Notifier>(notifier: N, from: impl Into<String>) -> Self {
        let (queue, rx) = Self::channel();
        tokio::spawn(run_worker(notifier, from.into(), rx));
        queue
    }

    /// Queue plus the raw receiver, with no worker attached.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Hand off a notification. Never fails the caller.
    pub fn enqueue(&self, notification: Notification) {
        let to = notification.recipient().to_string();
        if self.tx.send(notification).is_err() {
            tracing::warn!(to = %to, "Notification worker is gone, dropping notification");
        }
    }
}

/// Drain the channel, one delivery attempt per notification.
pub async fn run_worker<N: Notifier>(
    notifier: N,
    from: String,
    mut rx: mpsc::UnboundedReceiver<Notification>,
) {
    while let Some(notification) = rx.recv().await {
        let mail = notification.to_mail(&from);
        match notifier.deliver(&mail).await {
            Ok(()) => tracing::info!(to = %mail.to, subject = %mail.subject, "Notification sent"),
            Err(e) => tracing::error!(
                to = %mail.to,
                subject = %mail.subject,
                error = %e,
                "Failed to send notification"
            ),
        }
    }
    tracing::debug!("Notification worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeSet;
    use std::sync::{Arc, Mutex};

    /// Records deliveries and fails for one chosen recipient.
    #[derive(Clone, Default)]
    struct RecordingNotifier {
        sent: Arc<Mutex<Vec<OutgoingMail>>>,
        fail_for: Option<String>,
    }

    impl Notifier for RecordingNotifier {
        async fn deliver(&self, mail: &OutgoingMail) -> Result<(), NotifyError> {
            if self.fail_for.as_deref() == Some(mail.to.as_str()) {
                return Err(NotifyError::Rejected(503));
            }
            self.sent.lock().unwrap().push(mail.clone());
            Ok(())
        }
    }

    fn trot_basics() -> Lesson {
        let start = Utc.with_ymd_and_hms(2099, 1, 1, 10, 0, 0).unwrap();
        Lesson {
            id: "l1".to_string(),
            name: "Trot Basics".to_string(),
            description: None,
            scheduled_start: start,
            duration: 60,
            image_ref: None,
            assigned_riders: BTreeSet::new(),
            created_at: start,
            updated_at: start,
        }
    }

    #[test]
    fn test_assignment_mail_rendering() {
        let notification = Notification::LessonAssigned {
            to: "alice@example.com".to_string(),
            lesson: trot_basics(),
        };
        let mail = notification.to_mail("school@example.com");

        assert_eq!(mail.to, "alice@example.com");
        assert_eq!(mail.subject, "New Riding Lesson Assigned: Trot Basics");
        assert!(mail.body.contains("No description provided"));
        assert!(mail.body.contains("Date: 2099-01-01"));
        assert!(mail.body.contains("Time: 10:00 UTC"));
        assert!(mail.body.contains("Duration: 60 minutes"));
    }

    #[tokio::test]
    async fn test_worker_survives_failed_delivery() {
        let notifier = RecordingNotifier {
            fail_for: Some("broken@example.com".to_string()),
            ..Default::default()
        };
        let sent = notifier.sent.clone();
        let (queue, rx) = NotificationQueue::channel();

        queue.enqueue(Notification::RiderWelcome {
            to: "broken@example.com".to_string(),
            username: "broken".to_string(),
        });
        queue.enqueue(Notification::RiderWelcome {
            to: "alice@example.com".to_string(),
            username: "alice".to_string(),
        });
        drop(queue);

        run_worker(notifier, "school@example.com".to_string(), rx).await;

        let sent = sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "alice@example.com");
        assert_eq!(sent[0].subject, "Welcome to Riding School!");
    }

    #[test]
    fn test_enqueue_without_worker_does_not_panic() {
        let (queue, rx) = NotificationQueue::channel();
        drop(rx);
        queue.enqueue(Notification::RiderWelcome {
            to: "alice@example.com".to_string(),
            username: "alice".to_string(),
        });
    }

    #[tokio::test]
    async fn test_relay_gives_up_on_silent_server() {
        // Accepts connections and never answers.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let relay = RelayNotifier::with_timeout(
            format!("http://{}/send", addr),
            Duration::from_millis(200),
        )
        .unwrap();
        let mail = Notification::RiderWelcome {
            to: "carol@example.com".to_string(),
            username: "carol".to_string(),
        }
        .to_mail("school@example.com");

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            relay.deliver(&mail),
        )
        .await
        .expect("relay delivery should time out on its own");
        assert!(matches!(result, Err(NotifyError::Transport(_))));
    }
}
