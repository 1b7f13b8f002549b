//! Alert message formatting.

use serde::{Deserialize, Serialize};

use crate::location::LocationFix;

/// Default map link prefix; coordinates are appended as `lat,lng`.
pub const DEFAULT_MAP_LINK_BASE: &str = "https://maps.google.com/?q=";

/// Title passed to the native share sheet.
pub const SHARE_TITLE: &str = "Emergency Location Share";

/// Builds the map link for a coordinate pair.
///
/// Coordinates are not rounded.
///
/// # Examples
///
/// ```
/// use safepath_core::sharing::{map_link, DEFAULT_MAP_LINK_BASE};
///
/// assert_eq!(
///     map_link(DEFAULT_MAP_LINK_BASE, 1.0, 2.0),
///     "https://maps.google.com/?q=1,2"
/// );
/// ```
#[must_use]
pub fn map_link(base: &str, latitude: f64, longitude: f64) -> String {
    format!("{base}{latitude},{longitude}")
}

/// Builds the alert text sent to contacts.
#[must_use]
pub fn alert_message(address: &str, map_link: &str) -> String {
    format!(
        "🚨 EMERGENCY 🚨\nI need help!\nMy location: {address}\nView on map: {map_link}\nShared via your app"
    )
}

/// Content handed to the native share sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharePayload {
    /// Share sheet title
    pub title: String,
    /// Full alert message
    pub text: String,
    /// Map link
    pub url: String,
}

impl SharePayload {
    /// Builds the payload for a resolved fix.
    #[must_use]
    pub fn for_fix(fix: &LocationFix, map_link_base: &str) -> Self {
        let url = map_link(map_link_base, fix.latitude, fix.longitude);
        Self {
            title: SHARE_TITLE.to_string(),
            text: alert_message(&fix.address, &url),
            url,
        }
    }
}
