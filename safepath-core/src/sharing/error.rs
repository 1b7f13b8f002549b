//! Error types for emergency sharing.

use thiserror::Error;

use crate::contacts::ContactError;
use crate::location::{GeocodeError, LocationError};

/// Errors that prevent a sharing session from starting.
#[derive(Debug, Error)]
pub enum SharingError {
    /// No emergency contacts are stored.
    #[error("No emergency contacts configured")]
    NoContacts,

    /// The device cannot report its location.
    #[error("Location tracking is not supported on this device")]
    LocationUnsupported,

    /// The platform refused to open a location watch.
    #[error("Location error: {0}")]
    Location(#[from] LocationError),

    /// Contact storage failed.
    #[error("Contact error: {0}")]
    Contacts(#[from] ContactError),

    /// The reverse geocoder could not be set up.
    #[error("Geocoder setup failed: {0}")]
    Geocoder(#[from] GeocodeError),
}

/// Errors delivering one alert message.
///
/// These never end a session; the failure is logged and the next update is
/// processed normally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransmitError {
    /// The native share sheet failed or was dismissed.
    #[error("Share failed: {0}")]
    Share(String),

    /// Writing to the clipboard failed.
    #[error("Clipboard write failed: {0}")]
    Clipboard(String),
}

/// Result type for sharing operations.
pub type SharingResult<T> = Result<T, SharingError>;
