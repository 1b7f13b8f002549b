//! Location data types.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-update timeout used by emergency sharing.
pub const DEFAULT_WATCH_TIMEOUT: Duration = Duration::from_secs(10);

/// A single reading of device position as delivered by the platform.
///
/// Only latitude and longitude flow into the alert message. Accuracy and
/// timestamp are kept for logging.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawPosition {
    /// Latitude in degrees
    pub latitude: f64,

    /// Longitude in degrees
    pub longitude: f64,

    /// Reported horizontal accuracy in meters, if the platform knows it
    pub accuracy: Option<f64>,

    /// When the platform took the reading (UTC)
    pub timestamp: DateTime<Utc>,
}

impl RawPosition {
    /// Creates a position stamped with the current time and no accuracy.
    ///
    /// # Examples
    ///
    /// ```
    /// use safepath_core::location::RawPosition;
    ///
    /// let position = RawPosition::new(1.0, 2.0);
    /// assert_eq!(position.latitude, 1.0);
    /// assert!(position.accuracy.is_none());
    /// ```
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy: None,
            timestamp: Utc::now(),
        }
    }

    /// Sets the reported accuracy in meters.
    #[must_use]
    pub const fn with_accuracy(mut self, accuracy: f64) -> Self {
        self.accuracy = Some(accuracy);
        self
    }
}

/// A position resolved to a human-readable address.
///
/// Produced once per location update while sharing is active and never
/// stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationFix {
    /// Latitude in degrees, unrounded
    pub latitude: f64,

    /// Longitude in degrees, unrounded
    pub longitude: f64,

    /// Display address, or the `"lat, lng"` fallback
    pub address: String,
}

impl LocationFix {
    /// Creates a fix from raw coordinates and a resolved address.
    #[must_use]
    pub fn new(latitude: f64, longitude: f64, address: impl Into<String>) -> Self {
        Self {
            latitude,
            longitude,
            address: address.into(),
        }
    }

    /// Returns the coordinate pair formatted as `"lat, lng"`.
    ///
    /// This is the address used when reverse geocoding fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use safepath_core::location::LocationFix;
    ///
    /// assert_eq!(LocationFix::coordinate_label(1.0, 2.5), "1, 2.5");
    /// ```
    #[must_use]
    pub fn coordinate_label(latitude: f64, longitude: f64) -> String {
        format!("{latitude}, {longitude}")
    }
}

/// Options passed to the platform when opening a location watch.
///
/// Durations are serialized as whole milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchOptions {
    /// Ask the platform for its most accurate source (GPS over network)
    pub high_accuracy: bool,

    /// Oldest cached reading the platform may hand back
    #[serde(with = "millis")]
    pub maximum_age: Duration,

    /// How long the platform may take for a single reading before it reports
    /// a timeout
    #[serde(with = "millis")]
    pub timeout: Duration,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            maximum_age: Duration::ZERO,
            timeout: DEFAULT_WATCH_TIMEOUT,
        }
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::cast_possible_truncation)]
    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
