//! The emergency sharing state machine.
//!
//! ```text
//!            start (contacts ≥ 1, location available)
//! Inactive ───────────────────────────────────────────► Active
//!    ▲                                                    │
//!    └──────────────────────── stop ──────────────────────┘
//! ```
//!
//! While active, one task per session consumes the location subscription.
//! Each update is geocoded and transmitted before the next one is pulled, so
//! alerts leave in the order fixes arrived. Every session has its own epoch
//! and `active` flag; a fix still being geocoded when the session stops is
//! dropped instead of sent. Platform timeouts raise one toast until the next
//! fix arrives.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::StreamExt;
use tokio::runtime::Handle;

use super::error::{SharingError, SharingResult};
use super::message::SharePayload;
use super::notification::{Notification, Notifier};
use super::transport::{Delivery, Transmitter};
use super::types::{SessionState, SharingSettings};
use crate::contacts::ContactStore;
use crate::location::{
    resolve_address, CancelHandle, LocationError, LocationFix, LocationProvider,
    LocationSubscription, RawPosition, ReverseGeocoder,
};

/// Handle to the running session.
struct ActiveSession {
    epoch: u64,
    active: Arc<AtomicBool>,
    cancel: CancelHandle,
}

impl ActiveSession {
    fn end(&self) {
        self.active.store(false, Ordering::SeqCst);
        self.cancel.cancel();
    }
}

/// Controls the emergency sharing toggle.
///
/// # Example
///
/// ```ignore
/// let mut controller = SharingController::new(
///     contacts, location, geocoder, transmitter, notifier,
///     SharingSettings::default(), Handle::current(),
/// );
///
/// controller.toggle(); // starts, if contacts exist
/// controller.toggle(); // stops
/// ```
pub struct SharingController {
    contacts: Arc<ContactStore>,
    location: Arc<dyn LocationProvider>,
    geocoder: Arc<dyn ReverseGeocoder>,
    transmitter: Transmitter,
    notifier: Arc<dyn Notifier>,
    settings: SharingSettings,
    runtime: Handle,
    session: Option<ActiveSession>,
    last_epoch: u64,
}

impl SharingController {
    /// Creates an inactive controller.
    ///
    /// Session tasks are spawned on `runtime`.
    #[must_use]
    pub fn new(
        contacts: Arc<ContactStore>,
        location: Arc<dyn LocationProvider>,
        geocoder: Arc<dyn ReverseGeocoder>,
        transmitter: Transmitter,
        notifier: Arc<dyn Notifier>,
        settings: SharingSettings,
        runtime: Handle,
    ) -> Self {
        Self {
            contacts,
            location,
            geocoder,
            transmitter,
            notifier,
            settings,
            runtime,
            session: None,
            last_epoch: 0,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        if self.session.is_some() {
            SessionState::Active
        } else {
            SessionState::Inactive
        }
    }

    /// Returns whether a session is running.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.state().is_active()
    }

    /// Epoch of the running session, if any.
    ///
    /// Epochs start at 1 and grow with every started session.
    #[must_use]
    pub fn epoch(&self) -> Option<u64> {
        self.session.as_ref().map(|session| session.epoch)
    }

    /// Settings used for the next session.
    #[must_use]
    pub const fn settings(&self) -> &SharingSettings {
        &self.settings
    }

    /// Replaces the settings. A running session is not affected.
    pub fn set_settings(&mut self, settings: SharingSettings) {
        self.settings = settings;
    }

    /// Starts sharing.
    ///
    /// Starting while active is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`SharingError::NoContacts`] when no contact is stored and
    /// [`SharingError::LocationUnsupported`] when the device cannot track
    /// location. Both raise a notification and leave the state
    /// [`Inactive`](SessionState::Inactive). Any other refusal from the
    /// platform is returned as [`SharingError::Location`].
    pub fn start(&mut self) -> SharingResult<()> {
        if self.session.is_some() {
            log::debug!("start requested while already sharing");
            return Ok(());
        }

        if self.contacts.is_empty() {
            self.notifier.notify(Notification::NoContacts);
            return Err(SharingError::NoContacts);
        }

        if !self.location.is_available() {
            self.notifier.notify(Notification::LocationUnsupported);
            return Err(SharingError::LocationUnsupported);
        }

        let subscription = match self.location.watch(&self.settings.watch) {
            Ok(subscription) => subscription,
            Err(LocationError::Unsupported) => {
                self.notifier.notify(Notification::LocationUnsupported);
                return Err(SharingError::LocationUnsupported);
            }
            Err(e) => {
                self.notifier.notify(Notification::LocationError {
                    message: e.to_string(),
                });
                return Err(e.into());
            }
        };

        self.last_epoch += 1;
        let epoch = self.last_epoch;
        let active = Arc::new(AtomicBool::new(true));
        let cancel = subscription.cancel_handle();

        let worker = SessionWorker {
            epoch,
            active: active.clone(),
            contacts: self.contacts.clone(),
            geocoder: self.geocoder.clone(),
            transmitter: self.transmitter.clone(),
            notifier: self.notifier.clone(),
            map_link_base: self.settings.map_link_base.clone(),
        };
        self.runtime.spawn(worker.run(subscription));

        self.session = Some(ActiveSession {
            epoch,
            active,
            cancel,
        });
        log::info!("emergency sharing started (session {epoch})");
        Ok(())
    }

    /// Stops sharing and confirms with a notification.
    ///
    /// Stopping while inactive is a no-op and raises nothing.
    pub fn stop(&mut self) {
        let Some(session) = self.session.take() else {
            log::debug!("stop requested while not sharing");
            return;
        };

        session.end();
        self.notifier.notify(Notification::SharingStopped);
        log::info!("emergency sharing stopped (session {})", session.epoch);
    }

    /// Flips the toggle and returns the resulting state.
    ///
    /// A failed start is already reported through the notifier, so the
    /// error itself is only logged here.
    pub fn toggle(&mut self) -> SessionState {
        if self.is_active() {
            self.stop();
        } else if let Err(e) = self.start() {
            log::info!("emergency sharing not started: {e}");
        }
        self.state()
    }
}

impl Drop for SharingController {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            session.end();
        }
    }
}

impl std::fmt::Debug for SharingController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharingController")
            .field("state", &self.state())
            .field("epoch", &self.epoch())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

/// Everything one session task needs.
struct SessionWorker {
    epoch: u64,
    active: Arc<AtomicBool>,
    contacts: Arc<ContactStore>,
    geocoder: Arc<dyn ReverseGeocoder>,
    transmitter: Transmitter,
    notifier: Arc<dyn Notifier>,
    map_link_base: String,
}

impl SessionWorker {
    fn is_current(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    async fn run(self, subscription: LocationSubscription) {
        let mut updates = Box::pin(subscription.into_stream());
        let mut timeout_reported = false;

        while let Some(update) = updates.next().await {
            match update {
                Ok(position) => {
                    timeout_reported = false;
                    self.handle_position(position).await;
                }
                Err(LocationError::Timeout) if timeout_reported => {
                    log::debug!("session {} still waiting for a fix", self.epoch);
                }
                Err(e) => {
                    timeout_reported |= e == LocationError::Timeout;
                    self.handle_error(&e);
                }
            }
        }

        log::debug!("session {} location stream ended", self.epoch);
    }

    async fn handle_position(&self, position: RawPosition) {
        let address =
            resolve_address(self.geocoder.as_ref(), position.latitude, position.longitude).await;
        let fix = LocationFix::new(position.latitude, position.longitude, address);

        if !self.is_current() {
            log::debug!("dropping fix for stopped session {}", self.epoch);
            return;
        }

        let payload = SharePayload::for_fix(&fix, &self.map_link_base);
        match self.transmitter.transmit(&payload).await {
            Ok(delivery) => {
                let via = match delivery {
                    Delivery::Shared => "share sheet",
                    Delivery::CopiedToClipboard => "clipboard",
                };
                log::info!(
                    "live location sent to {} contacts via {via}",
                    self.contacts.len()
                );
            }
            Err(e) => log::error!("share failed: {e}"),
        }
    }

    fn handle_error(&self, error: &LocationError) {
        if !self.is_current() {
            return;
        }
        log::error!("location watch error in session {}: {error}", self.epoch);
        self.notifier.notify(Notification::LocationError {
            message: error.to_string(),
        });
    }
}
