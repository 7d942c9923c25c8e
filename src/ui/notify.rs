//! ui::notify
//!
//! Notification payloads and the sinks that display them.
//!
//! # Design
//!
//! A notification is a level, a short title and a longer description.
//! The core hands them to a [`Notifier`] and moves on; how they are shown
//! is up to the implementation.
//!
//! # Example
//!
//! ```
//! use gitsync::ui::notify::{Notification, Notifier, RecordingNotifier};
//!
//! let notifier = RecordingNotifier::new();
//! notifier.notify(&Notification::warning("Merge conflicts", "Resolve and commit."));
//! assert_eq!(notifier.titles(), vec!["Merge conflicts"]);
//! ```

use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;

use super::output::{self, Verbosity};

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Error,
    Warning,
}

/// A `(title, description)` pair with a level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub description: String,
}

impl Notification {
    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn warning(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Warning,
            title: title.into(),
            description: description.into(),
        }
    }
}

/// Receives notifications from the core.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; notifications may arrive from
/// any task.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: &Notification);
}

/// Prints notifications to stderr.
#[derive(Debug, Clone, Copy)]
pub struct TerminalNotifier {
    verbosity: Verbosity,
}

impl TerminalNotifier {
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }
}

impl Notifier for TerminalNotifier {
    fn notify(&self, notification: &Notification) {
        let message = output::notice(&notification.title, &notification.description);
        match notification.level {
            NotificationLevel::Error => output::error(message),
            NotificationLevel::Warning => output::warn(message, self.verbosity),
        }
    }
}

/// Keeps every notification in memory.
///
/// Clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    received: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.received
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn titles(&self) -> Vec<String> {
        self.notifications().into_iter().map(|n| n.title).collect()
    }

    pub fn clear(&self) {
        self.received
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: &Notification) {
        self.received
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification.clone());
    }
}
