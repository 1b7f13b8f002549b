//! High-level API consumed by the UI shell.
//!
//! [`SafepathCore`] wires the contact store, the sharing controller and the
//! notification queue together. The shell calls it from the emergency button
//! and the contacts dialog, then drains notifications to show as toasts.

use std::path::Path;
use std::sync::Arc;

use tokio::runtime::Handle;

use crate::config::SafepathConfig;
use crate::contacts::{
    ContactError, ContactStore, EmergencyContact, KeyValueStore, SqliteKeyValueStore,
};
use crate::location::{LocationProvider, NominatimGeocoder, ReverseGeocoder};
use crate::sharing::{
    Clipboard, Notification, NotificationQueue, Notifier, SessionState, ShareSheet,
    SharingController, SharingResult, SharingSettings, Transmitter,
};

/// File name of the local database inside the data directory.
pub const DATABASE_FILE_NAME: &str = "safepath.db";

/// Platform capabilities the core depends on.
pub struct Platform {
    /// Device location
    pub location: Arc<dyn LocationProvider>,
    /// Native share action
    pub share_sheet: Arc<dyn ShareSheet>,
    /// Clipboard used when sharing is unavailable
    pub clipboard: Arc<dyn Clipboard>,
    /// Reverse geocoder; `None` builds a [`NominatimGeocoder`] from config
    pub geocoder: Option<Arc<dyn ReverseGeocoder>>,
}

impl Platform {
    /// Bundles platform capabilities, using the configured HTTP geocoder.
    #[must_use]
    pub fn new(
        location: Arc<dyn LocationProvider>,
        share_sheet: Arc<dyn ShareSheet>,
        clipboard: Arc<dyn Clipboard>,
    ) -> Self {
        Self {
            location,
            share_sheet,
            clipboard,
            geocoder: None,
        }
    }

    /// Replaces the reverse geocoder.
    #[must_use]
    pub fn with_geocoder(mut self, geocoder: Arc<dyn ReverseGeocoder>) -> Self {
        self.geocoder = Some(geocoder);
        self
    }
}

/// Core interface for SafePath functionality.
///
/// This struct serves as the main entry point for the emergency feature:
/// contact management, the sharing toggle, and pending toasts.
pub struct SafepathCore {
    contacts: Arc<ContactStore>,
    notifications: Arc<NotificationQueue>,
    controller: SharingController,
}

impl SafepathCore {
    /// Opens the core on a data directory.
    ///
    /// Reads `config.json` if present and stores contacts in
    /// `safepath.db`. Both live in `data_dir`, which is created if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or database cannot be created, or
    /// if the HTTP geocoder cannot be built.
    pub fn open(data_dir: &Path, platform: Platform, runtime: Handle) -> SharingResult<Self> {
        std::fs::create_dir_all(data_dir).map_err(|e| {
            ContactError::Storage(format!("Failed to create data directory: {e}"))
        })?;

        let config = SafepathConfig::load_or_default(data_dir);
        let storage = SqliteKeyValueStore::new(&data_dir.join(DATABASE_FILE_NAME))?;

        Self::with_storage(Arc::new(storage), &config, platform, runtime)
    }

    /// Builds the core over any key-value storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP geocoder cannot be built.
    pub fn with_storage(
        storage: Arc<dyn KeyValueStore>,
        config: &SafepathConfig,
        platform: Platform,
        runtime: Handle,
    ) -> SharingResult<Self> {
        let contacts = Arc::new(ContactStore::new(storage));
        let notifications = Arc::new(NotificationQueue::new());

        let geocoder: Arc<dyn ReverseGeocoder> = match platform.geocoder {
            Some(geocoder) => geocoder,
            None => Arc::new(NominatimGeocoder::new(&config.geocoder)?),
        };
        let transmitter = Transmitter::new(
            platform.share_sheet,
            platform.clipboard,
            notifications.clone(),
        );
        let controller = SharingController::new(
            contacts.clone(),
            platform.location,
            geocoder,
            transmitter,
            notifications.clone(),
            config.sharing.clone(),
            runtime,
        );

        Ok(Self {
            contacts,
            notifications,
            controller,
        })
    }

    /// Returns the stored emergency contacts in order.
    #[must_use]
    pub fn contacts(&self) -> Vec<EmergencyContact> {
        self.contacts.load()
    }

    /// Adds a contact from the contacts form.
    ///
    /// Raises [`Notification::ContactAdded`] on success and
    /// [`Notification::MissingContactFields`] when name or phone is blank.
    ///
    /// # Errors
    ///
    /// Returns [`ContactError::MissingField`] for blank input, or a storage
    /// error if the list cannot be saved.
    pub fn add_contact(
        &self,
        name: &str,
        phone: &str,
        email: Option<&str>,
    ) -> Result<(), ContactError> {
        let contact = EmergencyContact::new(name, phone, email);
        let name = contact.name.clone();

        match self.contacts.add(contact) {
            Ok(()) => {
                self.notifications.notify(Notification::ContactAdded { name });
                Ok(())
            }
            Err(e @ ContactError::MissingField(_)) => {
                self.notifications.notify(Notification::MissingContactFields);
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    /// Removes the contact at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`ContactError::IndexOutOfBounds`] for an invalid index, or a
    /// storage error if the list cannot be saved.
    pub fn remove_contact(&self, index: usize) -> Result<EmergencyContact, ContactError> {
        self.contacts.remove(index)
    }

    /// Starts emergency sharing.
    ///
    /// # Errors
    ///
    /// See [`SharingController::start`].
    pub fn start_sharing(&mut self) -> SharingResult<()> {
        self.controller.start()
    }

    /// Stops emergency sharing.
    pub fn stop_sharing(&mut self) {
        self.controller.stop();
    }

    /// Handles a press of the emergency button.
    pub fn toggle_sharing(&mut self) -> SessionState {
        self.controller.toggle()
    }

    /// Returns whether emergency sharing is active.
    #[must_use]
    pub const fn is_sharing(&self) -> bool {
        self.controller.is_active()
    }

    /// Removes and returns pending toasts, oldest first.
    #[must_use]
    pub fn drain_notifications(&self) -> Vec<Notification> {
        self.notifications.drain()
    }

    /// Settings used for the next sharing session.
    #[must_use]
    pub const fn settings(&self) -> &SharingSettings {
        self.controller.settings()
    }

    /// Replaces the sharing settings.
    pub fn set_settings(&mut self, settings: SharingSettings) {
        self.controller.set_settings(settings);
    }
}

impl std::fmt::Debug for SafepathCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SafepathCore")
            .field("controller", &self.controller)
            .finish_non_exhaustive()
    }
}
