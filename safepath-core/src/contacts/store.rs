//! The emergency contact list.
//!
//! The whole list lives under a single storage key as a JSON array and is
//! rewritten after every mutation. Reads never fail: a missing or corrupt
//! entry is treated as an empty list.

use std::sync::{Arc, Mutex};

use super::error::{ContactError, Result};
use super::storage::KeyValueStore;
use super::types::EmergencyContact;

/// Storage key holding the serialized contact list.
pub const CONTACTS_KEY: &str = "emergencyContacts";

/// Ordered, persisted list of emergency contacts.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use safepath_core::contacts::{ContactStore, EmergencyContact, MemoryKeyValueStore};
///
/// let store = ContactStore::new(Arc::new(MemoryKeyValueStore::new()));
/// store.add(EmergencyContact::new("Jane", "555-0100", None)).unwrap();
/// assert_eq!(store.load().len(), 1);
///
/// store.remove(0).unwrap();
/// assert!(store.is_empty());
/// ```
pub struct ContactStore {
    storage: Arc<dyn KeyValueStore>,
    // Serializes read-modify-write cycles.
    write_lock: Mutex<()>,
}

impl ContactStore {
    /// Creates a store persisting through `storage`.
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            storage,
            write_lock: Mutex::new(()),
        }
    }

    /// Returns the stored contacts in insertion order.
    ///
    /// Absent, unreadable, or corrupt data yields an empty list.
    #[must_use]
    pub fn load(&self) -> Vec<EmergencyContact> {
        let raw = match self.storage.get(CONTACTS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                log::warn!("could not read emergency contacts: {e}");
                return Vec::new();
            }
        };

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            log::warn!("stored emergency contacts are corrupt, treating as empty: {e}");
            Vec::new()
        })
    }

    /// Number of stored contacts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.load().len()
    }

    /// Returns whether no contacts are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.load().is_empty()
    }

    /// Appends a contact and persists the list.
    ///
    /// # Errors
    ///
    /// Returns [`ContactError::MissingField`] if name or phone is empty, in
    /// which case nothing is written. Returns a storage error if the list
    /// cannot be persisted.
    pub fn add(&self, contact: EmergencyContact) -> Result<()> {
        contact.validate()?;

        let _guard = self.lock()?;
        let mut contacts = self.load();
        contacts.push(contact);
        self.persist(&contacts)?;

        log::info!("emergency contact added ({} stored)", contacts.len());
        Ok(())
    }

    /// Removes the contact at `index` and persists the list.
    ///
    /// Returns the removed contact.
    ///
    /// # Errors
    ///
    /// Returns [`ContactError::IndexOutOfBounds`] if `index` is not a valid
    /// position, in which case nothing is written. Returns a storage error if
    /// the list cannot be persisted.
    pub fn remove(&self, index: usize) -> Result<EmergencyContact> {
        let _guard = self.lock()?;
        let mut contacts = self.load();
        if index >= contacts.len() {
            return Err(ContactError::IndexOutOfBounds {
                index,
                len: contacts.len(),
            });
        }

        let removed = contacts.remove(index);
        self.persist(&contacts)?;

        log::info!("emergency contact removed ({} stored)", contacts.len());
        Ok(removed)
    }

    /// Deletes the stored list entirely.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage entry cannot be removed.
    pub fn clear(&self) -> Result<()> {
        let _guard = self.lock()?;
        self.storage.remove(CONTACTS_KEY)
    }

    fn persist(&self, contacts: &[EmergencyContact]) -> Result<()> {
        let json = serde_json::to_string(contacts)?;
        self.storage.set(CONTACTS_KEY, &json)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|e| ContactError::Storage(format!("Failed to acquire contact lock: {e}")))
    }
}

impl std::fmt::Debug for ContactStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContactStore").finish_non_exhaustive()
    }
}
