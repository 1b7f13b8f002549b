//! Location module for SafePath.
//!
//! Provides everything emergency sharing needs from the device position:
//! - Raw readings and resolved fixes
//! - Watch options (high accuracy, no cached fixes, 10 second timeout)
//! - A cancellable subscription over the platform's update stream
//! - Best-effort reverse geocoding with a coordinate fallback
//!
//! # Example Usage
//!
//! ```
//! use safepath_core::location::{ChannelLocationProvider, LocationProvider, RawPosition, WatchOptions};
//!
//! let provider = ChannelLocationProvider::new();
//! let subscription = provider.watch(&WatchOptions::default()).unwrap();
//!
//! // The host forwards each platform reading.
//! assert!(provider.push_position(RawPosition::new(1.0, 2.0)));
//!
//! // Stopping severs delivery of anything not yet handed out.
//! subscription.cancel_handle().cancel();
//! ```

mod error;
pub mod geocode;
pub mod types;
mod watch;

pub use error::{GeocodeError, LocationError, LocationResult};
pub use geocode::{resolve_address, GeocoderSettings, NominatimGeocoder, ReverseGeocoder};
pub use types::{LocationFix, RawPosition, WatchOptions, DEFAULT_WATCH_TIMEOUT};
pub use watch::{CancelHandle, ChannelLocationProvider, LocationProvider, LocationSubscription};
