//! Error types for location operations.
//!
//! Covers failures reported by the platform location watch and by the
//! reverse geocoding lookup.

use thiserror::Error;

/// Errors reported while watching device location.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    /// The device has no location capability.
    #[error("Location tracking is not supported on this device")]
    Unsupported,

    /// The user denied location access.
    #[error("Location permission denied")]
    PermissionDenied,

    /// The platform could not determine a position.
    #[error("Position unavailable: {0}")]
    Unavailable(String),

    /// The platform could not produce a reading within the watch timeout.
    #[error("Timed out waiting for a location update")]
    Timeout,
}

/// Errors from a reverse geocoding lookup.
///
/// None of these reach the user; the caller falls back to the raw
/// coordinate pair.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// The HTTP request failed or the body was not valid JSON.
    #[error("Geocoding request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("Geocoding service returned status {0}")]
    Status(u16),

    /// The response had no usable `display_name`.
    #[error("Geocoding response has no display name")]
    MissingDisplayName,
}

/// Result type for location operations.
pub type LocationResult<T> = Result<T, LocationError>;
