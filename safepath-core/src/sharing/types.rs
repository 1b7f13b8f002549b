//! Sharing session types and settings.

use serde::{Deserialize, Serialize};

use super::message::DEFAULT_MAP_LINK_BASE;
use crate::location::WatchOptions;

/// State of the emergency sharing toggle.
///
/// Starts [`Inactive`](Self::Inactive) on every launch and is never
/// persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SessionState {
    /// Not sharing.
    #[default]
    Inactive,
    /// Watching location and sending alerts.
    Active,
}

impl SessionState {
    /// Returns whether this is [`SessionState::Active`].
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }
}

/// Settings for emergency sharing.
///
/// Changes apply to the next session; a running session keeps the settings
/// it started with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SharingSettings {
    /// Options for the location watch
    pub watch: WatchOptions,

    /// Prefix of the map link embedded in each alert
    pub map_link_base: String,
}

impl Default for SharingSettings {
    fn default() -> Self {
        Self {
            watch: WatchOptions::default(),
            map_link_base: DEFAULT_MAP_LINK_BASE.to_string(),
        }
    }
}
