//! User-visible notifications (toasts). Presentation is external; the controller
//! only decides what to say.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info};

use crate::models::results::ArtifactKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub description: String,
    pub issued_at: DateTime<Utc>,
}

impl Notification {
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            title: title.into(),
            description: description.into(),
            issued_at: Utc::now(),
        }
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            title: title.into(),
            description: description.into(),
            issued_at: Utc::now(),
        }
    }

    pub fn analysis_complete() -> Self {
        Self::success(
            "Analysis complete",
            "Resume analysis complete. Now enter your personal details.",
        )
    }

    pub fn cover_letter_ready() -> Self {
        Self::success("Cover letter ready", "Your cover letter has been generated.")
    }

    pub fn task_failed(kind: ArtifactKind) -> Self {
        Self::error("Error", kind.failure_message())
    }

    pub fn resume_uploaded() -> Self {
        Self::success(
            "Resume uploaded successfully",
            "We've extracted the text from your resume.",
        )
    }

    pub fn resume_unreadable() -> Self {
        Self::error(
            "Upload failed",
            "Error reading file. Please try again or paste the content manually.",
        )
    }

    pub fn download_succeeded() -> Self {
        Self::success("Download successful", "Cover letter downloaded as a text file.")
    }

    pub fn download_failed() -> Self {
        Self::error(
            "Download failed",
            "There was an error downloading your cover letter.",
        )
    }

    pub fn is_error(&self) -> bool {
        self.level == NotificationLevel::Error
    }
}

/// Sink for notifications. Implemented by the presentation layer.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Writes notifications to the log. Default sink when no UI is attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Success => {
                info!("{}: {}", notification.title, notification.description)
            }
            NotificationLevel::Error => {
                error!("{}: {}", notification.title, notification.description)
            }
        }
    }
}

/// Keeps every notification in memory, in order. Useful for headless front ends.
#[derive(Debug, Default, Clone)]
pub struct RecordingNotifier {
    seen: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.seen
            .lock()
            .map(|seen| seen.clone())
            .unwrap_or_default()
    }

    /// Removes and returns everything recorded so far.
    pub fn drain(&self) -> Vec<Notification> {
        self.seen
            .lock()
            .map(|mut seen| std::mem::take(&mut *seen))
            .unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(notification);
        }
    }
}
