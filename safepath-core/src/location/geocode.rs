//! Reverse geocoding.
//!
//! Turns a coordinate pair into a display address. Lookups are best-effort:
//! [`resolve_address`] never fails and falls back to the raw `"lat, lng"`
//! pair.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::error::GeocodeError;
use super::types::LocationFix;

/// Public Nominatim instance.
pub const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org";

/// Resolves coordinates to a human-readable address.
#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    /// Looks up the display address for a coordinate pair.
    ///
    /// # Errors
    ///
    /// Returns a [`GeocodeError`] if the lookup fails for any reason.
    async fn reverse(&self, latitude: f64, longitude: f64) -> Result<String, GeocodeError>;
}

/// Settings for the HTTP geocoder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocoderSettings {
    /// Base URL of a Nominatim-compatible service, without trailing slash
    pub base_url: String,

    /// `User-Agent` sent with every lookup (Nominatim rejects anonymous clients)
    pub user_agent: String,

    /// Request timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for GeocoderSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GEOCODER_URL.to_string(),
            user_agent: concat!("safepath/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_ms: 5_000,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    display_name: Option<String>,
}

/// Reverse geocoder backed by a Nominatim-compatible HTTP API.
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
}

impl NominatimGeocoder {
    /// Creates a geocoder from settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(settings: &GeocoderSettings) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent.clone())
            .timeout(Duration::from_millis(settings.timeout_ms))
            .build()?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Returns the lookup URL for a coordinate pair.
    #[must_use]
    pub fn reverse_url(&self, latitude: f64, longitude: f64) -> String {
        format!(
            "{}/reverse?format=json&lat={latitude}&lon={longitude}",
            self.base_url
        )
    }
}

#[async_trait]
impl ReverseGeocoder for NominatimGeocoder {
    async fn reverse(&self, latitude: f64, longitude: f64) -> Result<String, GeocodeError> {
        let url = self.reverse_url(latitude, longitude);
        log::debug!("reverse geocoding via {url}");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::Status(status.as_u16()));
        }

        let body: ReverseResponse = response.json().await?;
        body.display_name
            .filter(|name| !name.is_empty())
            .ok_or(GeocodeError::MissingDisplayName)
    }
}

/// Resolves an address, falling back to the coordinate pair on any failure.
pub async fn resolve_address(
    geocoder: &dyn ReverseGeocoder,
    latitude: f64,
    longitude: f64,
) -> String {
    match geocoder.reverse(latitude, longitude).await {
        Ok(address) => address,
        Err(e) => {
            log::warn!("reverse geocoding failed, using coordinates: {e}");
            LocationFix::coordinate_label(latitude, longitude)
        }
    }
}
