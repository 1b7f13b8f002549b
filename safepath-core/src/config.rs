//! Configuration for SafePath.
//!
//! Configuration is a small JSON document, normally `config.json` in the
//! app's data directory. Every field has a default, so a missing file or a
//! partial document is fine.
//!
//! ```json
//! {
//!   "sharing": {
//!     "watch": { "high_accuracy": true, "maximum_age": 0, "timeout": 10000 },
//!     "map_link_base": "https://maps.google.com/?q="
//!   },
//!   "geocoder": {
//!     "base_url": "https://nominatim.openstreetmap.org",
//!     "user_agent": "safepath/0.1.0",
//!     "timeout_ms": 5000
//!   }
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::location::GeocoderSettings;
use crate::sharing::SharingSettings;

/// File name of the configuration inside the data directory.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SafepathConfig {
    /// Emergency sharing settings
    pub sharing: SharingSettings,

    /// Reverse geocoding service
    pub geocoder: GeocoderSettings,
}

impl SafepathConfig {
    /// Parses a configuration document.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a field has the wrong type.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serializes this configuration as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (extremely rare).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Loads `config.json` from `data_dir`, falling back to defaults.
    ///
    /// A missing file is expected. An unreadable or malformed file is logged
    /// and ignored.
    #[must_use]
    pub fn load_or_default(data_dir: &Path) -> Self {
        let path = data_dir.join(CONFIG_FILE_NAME);
        let json = match std::fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Self::default(),
            Err(e) => {
                log::warn!("could not read {}: {e}", path.display());
                return Self::default();
            }
        };

        Self::from_json(&json).unwrap_or_else(|e| {
            log::warn!("ignoring malformed {}: {e}", path.display());
            Self::default()
        })
    }
}
