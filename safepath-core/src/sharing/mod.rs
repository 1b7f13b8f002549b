//! Emergency location sharing.
//!
//! A single toggle starts and stops a sharing session. While a session is
//! active, every location update is turned into an alert and handed to the
//! platform's share sheet, or copied to the clipboard when there is none.
//!
//! # Flow
//!
//! ```text
//! LocationSubscription ──► resolve_address ──► SharePayload ──► Transmitter
//!        (watch)            (geocode or          (template)     ├── ShareSheet
//!                            "lat, lng")                        └── Clipboard
//! ```
//!
//! Failures inside a session are never fatal: geocoding falls back to the
//! coordinates, transmission errors are logged, location errors become a
//! toast. Only the pre-start checks (contacts, location capability) refuse
//! to change state.

mod controller;
mod error;
pub mod message;
pub mod notification;
pub mod transport;
pub mod types;

pub use controller::SharingController;
pub use error::{SharingError, SharingResult, TransmitError};
pub use message::{alert_message, map_link, SharePayload, DEFAULT_MAP_LINK_BASE, SHARE_TITLE};
pub use notification::{
    Notification, NotificationQueue, Notifier, Severity, MAX_PENDING_NOTIFICATIONS,
};
pub use transport::{
    Clipboard, Delivery, OutboundMessage, Outbox, ShareSheet, Transmitter, MAX_PENDING_MESSAGES,
};
pub use types::{SessionState, SharingSettings};
