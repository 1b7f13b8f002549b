//! Delivery of alert messages.
//!
//! The native share sheet is preferred. When the platform has none, the
//! message is copied to the clipboard and the user is told so. Which path is
//! taken is decided per message, at send time.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::error::TransmitError;
use super::message::SharePayload;
use super::notification::{Notification, Notifier};

/// The platform's native share action.
#[async_trait]
pub trait ShareSheet: Send + Sync {
    /// Returns whether a share sheet exists on this platform right now.
    fn is_available(&self) -> bool;

    /// Opens the share sheet with the payload.
    ///
    /// # Errors
    ///
    /// Returns [`TransmitError::Share`] if sharing fails or is dismissed.
    async fn share(&self, payload: &SharePayload) -> Result<(), TransmitError>;
}

/// The platform clipboard.
#[async_trait]
pub trait Clipboard: Send + Sync {
    /// Replaces the clipboard contents with `text`.
    ///
    /// # Errors
    ///
    /// Returns [`TransmitError::Clipboard`] if the write is refused.
    async fn write_text(&self, text: &str) -> Result<(), TransmitError>;
}

/// How a message left the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Delivery {
    /// Handed to the native share sheet.
    Shared,
    /// Copied to the clipboard.
    CopiedToClipboard,
}

/// Sends alert messages through the share sheet or the clipboard.
#[derive(Clone)]
pub struct Transmitter {
    share_sheet: Arc<dyn ShareSheet>,
    clipboard: Arc<dyn Clipboard>,
    notifier: Arc<dyn Notifier>,
}

impl Transmitter {
    /// Creates a transmitter over the given platform capabilities.
    #[must_use]
    pub fn new(
        share_sheet: Arc<dyn ShareSheet>,
        clipboard: Arc<dyn Clipboard>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            share_sheet,
            clipboard,
            notifier,
        }
    }

    /// Delivers one alert.
    ///
    /// Uses the share sheet if available, otherwise the clipboard followed
    /// by a [`Notification::LocationCopied`] toast.
    ///
    /// # Errors
    ///
    /// Returns the error of whichever path was taken. No fallback to the
    /// clipboard happens after a failed share.
    pub async fn transmit(&self, payload: &SharePayload) -> Result<Delivery, TransmitError> {
        if self.share_sheet.is_available() {
            self.share_sheet.share(payload).await?;
            return Ok(Delivery::Shared);
        }

        self.clipboard.write_text(&payload.text).await?;
        self.notifier.notify(Notification::LocationCopied);
        Ok(Delivery::CopiedToClipboard)
    }
}

impl std::fmt::Debug for Transmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transmitter")
            .field("share_available", &self.share_sheet.is_available())
            .finish_non_exhaustive()
    }
}

/// Most undelivered messages an [`Outbox`] keeps.
pub const MAX_PENDING_MESSAGES: usize = 32;

/// A message waiting for the UI shell to deliver it natively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutboundMessage {
    /// Open the share sheet with this payload.
    Share(SharePayload),
    /// Put this text on the clipboard.
    Clipboard(String),
}

/// Share sheet and clipboard backed by a queue the host drains.
///
/// Used when the real platform APIs live on the other side of an FFI
/// boundary. The host reports share sheet availability through
/// [`set_share_available`](Self::set_share_available). Only the newest
/// [`MAX_PENDING_MESSAGES`] are kept.
#[derive(Debug, Default)]
pub struct Outbox {
    share_available: AtomicBool,
    queue: Mutex<VecDeque<OutboundMessage>>,
}

impl Outbox {
    /// Creates an outbox; the share sheet starts out unavailable.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether the host can show a native share sheet.
    pub fn set_share_available(&self, available: bool) {
        self.share_available.store(available, Ordering::SeqCst);
    }

    /// Removes and returns every queued message, oldest first.
    #[must_use]
    pub fn drain(&self) -> Vec<OutboundMessage> {
        self.queue
            .lock()
            .map(|mut queue| queue.drain(..).collect())
            .unwrap_or_default()
    }

    fn enqueue(&self, message: OutboundMessage) -> Result<(), String> {
        let mut queue = self
            .queue
            .lock()
            .map_err(|e| format!("outbox lock poisoned: {e}"))?;
        if queue.len() == MAX_PENDING_MESSAGES {
            queue.pop_front();
            log::warn!("outbox full, dropped the oldest undelivered alert");
        }
        queue.push_back(message);
        Ok(())
    }
}

#[async_trait]
impl ShareSheet for Outbox {
    fn is_available(&self) -> bool {
        self.share_available.load(Ordering::SeqCst)
    }

    async fn share(&self, payload: &SharePayload) -> Result<(), TransmitError> {
        self.enqueue(OutboundMessage::Share(payload.clone()))
            .map_err(TransmitError::Share)
    }
}

#[async_trait]
impl Clipboard for Outbox {
    async fn write_text(&self, text: &str) -> Result<(), TransmitError> {
        self.enqueue(OutboundMessage::Clipboard(text.to_string()))
            .map_err(TransmitError::Clipboard)
    }
}
