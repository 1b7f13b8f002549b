//! User-facing notifications.
//!
//! Every message the emergency feature shows the user is a transient,
//! dismissible toast. The core never renders anything; it hands
//! [`Notification`] values to a [`Notifier`] and the UI shell displays them.

use std::collections::VecDeque;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

/// Visual weight of a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Severity {
    /// Informational
    #[default]
    Default,
    /// Failure the user should act on
    Destructive,
}

/// A toast raised by the emergency feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    /// Sharing was requested with an empty contact list.
    NoContacts,
    /// The device cannot track location.
    LocationUnsupported,
    /// The location watch reported an error.
    LocationError {
        /// Platform error message
        message: String,
    },
    /// Sharing was stopped.
    SharingStopped,
    /// No share sheet was available; the alert went to the clipboard.
    LocationCopied,
    /// A contact was saved.
    ContactAdded {
        /// Name of the new contact
        name: String,
    },
    /// The contact form was submitted without name or phone.
    MissingContactFields,
}

impl Notification {
    /// Toast title.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::NoContacts => "No contacts",
            Self::LocationUnsupported => "Geolocation not supported",
            Self::LocationError { .. } => "Location error",
            Self::SharingStopped => "Emergency sharing stopped",
            Self::LocationCopied => "Location copied!",
            Self::ContactAdded { .. } => "Contact added",
            Self::MissingContactFields => "Missing info",
        }
    }

    /// Toast body.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::NoContacts => "Please add at least one emergency contact first.".to_string(),
            Self::LocationUnsupported => {
                "Your browser does not support location tracking.".to_string()
            }
            Self::LocationError { message } => message.clone(),
            Self::SharingStopped => "Your location is no longer being shared.".to_string(),
            Self::LocationCopied => "Emergency location copied to clipboard.".to_string(),
            Self::ContactAdded { name } => format!("{name} added."),
            Self::MissingContactFields => "Provide a name and phone.".to_string(),
        }
    }

    /// Toast severity.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        match self {
            Self::NoContacts
            | Self::LocationUnsupported
            | Self::LocationError { .. }
            | Self::MissingContactFields => Severity::Destructive,
            Self::SharingStopped | Self::LocationCopied | Self::ContactAdded { .. } => {
                Severity::Default
            }
        }
    }
}

/// Receives notifications for display.
pub trait Notifier: Send + Sync {
    /// Shows a notification to the user.
    fn notify(&self, notification: Notification);
}

/// Most notifications kept while the UI shell is not draining.
pub const MAX_PENDING_NOTIFICATIONS: usize = 64;

/// FIFO of pending notifications, drained by the UI shell.
///
/// Holds at most [`MAX_PENDING_NOTIFICATIONS`]; the oldest is dropped first.
#[derive(Debug, Default)]
pub struct NotificationQueue {
    pending: Mutex<VecDeque<Notification>>,
}

impl NotificationQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns every pending notification, oldest first.
    #[must_use]
    pub fn drain(&self) -> Vec<Notification> {
        self.pending
            .lock()
            .map(|mut pending| pending.drain(..).collect())
            .unwrap_or_default()
    }

    /// Number of pending notifications.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.lock().map_or(0, |pending| pending.len())
    }

    /// Returns whether nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Notifier for NotificationQueue {
    fn notify(&self, notification: Notification) {
        log::debug!("notification: {}", notification.title());
        if let Ok(mut pending) = self.pending.lock() {
            if pending.len() == MAX_PENDING_NOTIFICATIONS {
                if let Some(dropped) = pending.pop_front() {
                    log::warn!("notification queue full, dropping: {}", dropped.title());
                }
            }
            pending.push_back(notification);
        }
    }
}
