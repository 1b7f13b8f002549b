//! API bridging layer that exposes safepath-core functionality.

use std::path::Path;
use std::sync::Arc;

use flutter_rust_bridge::frb;
use safepath_core::location::{ChannelLocationProvider, LocationError, RawPosition};
use safepath_core::sharing::{Notification, OutboundMessage, Outbox, SessionState};
use safepath_core::{Platform, SafepathCore};

/// Emergency feature handle held by the Flutter shell.
///
/// Owns a small tokio runtime for sharing sessions, since Dart calls arrive
/// on threads that are not part of any runtime.
#[frb(opaque)]
pub struct SafepathBridge {
    core: SafepathCore,
    location: Arc<ChannelLocationProvider>,
    outbox: Arc<Outbox>,
    // Declared last: the core cancels its session before the runtime shuts down.
    #[allow(dead_code)]
    runtime: tokio::runtime::Runtime,
}

impl SafepathBridge {
    /// Opens the core on the app's data directory.
    pub fn open(data_dir: String) -> Result<Self, String> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("safepath-sharing")
            .enable_all()
            .build()
            .map_err(|e| format!("Failed to start runtime: {e}"))?;

        let location = Arc::new(ChannelLocationProvider::new());
        let outbox = Arc::new(Outbox::new());
        let platform = Platform::new(location.clone(), outbox.clone(), outbox.clone());

        let core = SafepathCore::open(Path::new(&data_dir), platform, runtime.handle().clone())
            .map_err(|e| e.to_string())?;

        log::info!("safepath core opened at {data_dir}");
        Ok(Self {
            core,
            location,
            outbox,
            runtime,
        })
    }

    /// Reports whether the device has location and a native share sheet.
    #[frb(sync)]
    pub fn set_capabilities(&self, location_available: bool, share_available: bool) {
        self.location.set_available(location_available);
        self.outbox.set_share_available(share_available);
    }

    /// Returns the stored contacts.
    #[frb(sync)]
    pub fn contacts(&self) -> Vec<BridgeContact> {
        self.core
            .contacts()
            .into_iter()
            .map(|c| BridgeContact {
                name: c.name,
                phone: c.phone,
                email: c.email,
            })
            .collect()
    }

    /// Adds a contact from the contacts dialog.
    ///
    /// Validation failures also raise a toast; storage failures only come
    /// back as the error message.
    #[frb(sync)]
    pub fn add_contact(
        &self,
        name: String,
        phone: String,
        email: Option<String>,
    ) -> Result<(), String> {
        self.core
            .add_contact(&name, &phone, email.as_deref())
            .map_err(|e| {
                log::error!("failed to add contact: {e}");
                e.to_string()
            })
    }

    /// Removes the contact at `index`.
    #[frb(sync)]
    pub fn remove_contact(&self, index: usize) -> Result<(), String> {
        self.core
            .remove_contact(index)
            .map(|_| ())
            .map_err(|e| e.to_string())
    }

    /// Handles a press of the emergency button; returns whether sharing is on.
    #[frb(sync)]
    pub fn toggle_sharing(&mut self) -> bool {
        self.core.toggle_sharing() == SessionState::Active
    }

    /// Returns whether sharing is on.
    #[frb(sync)]
    pub fn is_sharing(&self) -> bool {
        self.core.is_sharing()
    }

    /// Forwards a position from the platform location stream.
    #[frb(sync)]
    pub fn push_position(&self, latitude: f64, longitude: f64, accuracy: Option<f64>) {
        let mut position = RawPosition::new(latitude, longitude);
        position.accuracy = accuracy;
        self.location.push_position(position);
    }

    /// Options the shell must apply to its platform location watch.
    ///
    /// `None` until a session has started.
    #[frb(sync)]
    pub fn watch_options(&self) -> Option<BridgeWatchOptions> {
        self.location.last_options().map(|options| BridgeWatchOptions {
            high_accuracy: options.high_accuracy,
            maximum_age_ms: u64::try_from(options.maximum_age.as_millis()).unwrap_or(u64::MAX),
            timeout_ms: u64::try_from(options.timeout.as_millis()).unwrap_or(u64::MAX),
        })
    }

    /// Forwards an error from the platform location stream.
    #[frb(sync)]
    pub fn push_location_error(&self, kind: BridgeLocationErrorKind, message: String) {
        let error = match kind {
            BridgeLocationErrorKind::PermissionDenied => LocationError::PermissionDenied,
            BridgeLocationErrorKind::Unavailable => LocationError::Unavailable(message),
            BridgeLocationErrorKind::Timeout => LocationError::Timeout,
        };
        self.location.push_error(error);
    }

    /// Pending toasts, oldest first.
    #[frb(sync)]
    pub fn drain_notifications(&self) -> Vec<BridgeNotification> {
        self.core
            .drain_notifications()
            .into_iter()
            .map(BridgeNotification::from)
            .collect()
    }

    /// Messages the shell must share or copy, oldest first.
    #[frb(sync)]
    pub fn drain_outbox(&self) -> Vec<BridgeOutbound> {
        self.outbox
            .drain()
            .into_iter()
            .map(|message| match message {
                OutboundMessage::Share(payload) => BridgeOutbound {
                    share: true,
                    title: payload.title,
                    text: payload.text,
                    url: Some(payload.url),
                },
                OutboundMessage::Clipboard(text) => BridgeOutbound {
                    share: false,
                    title: String::new(),
                    text,
                    url: None,
                },
            })
            .collect()
    }
}

/// Emergency contact (FFI mirror).
pub struct BridgeContact {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
}

/// Platform watch settings (FFI mirror).
pub struct BridgeWatchOptions {
    pub high_accuracy: bool,
    pub maximum_age_ms: u64,
    pub timeout_ms: u64,
}

/// Kind of error reported by the platform location stream.
pub enum BridgeLocationErrorKind {
    PermissionDenied,
    Unavailable,
    Timeout,
}

/// Toast to display (FFI mirror).
pub struct BridgeNotification {
    pub title: String,
    pub description: String,
    pub destructive: bool,
}

impl From<Notification> for BridgeNotification {
    fn from(notification: Notification) -> Self {
        Self {
            title: notification.title().to_string(),
            description: notification.description(),
            destructive: notification.severity() == safepath_core::sharing::Severity::Destructive,
        }
    }
}

/// Outgoing alert (FFI mirror). `share` selects share sheet vs clipboard.
pub struct BridgeOutbound {
    pub share: bool,
    pub title: String,
    pub text: String,
    pub url: Option<String>,
}
