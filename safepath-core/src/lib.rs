//! SafePath Core Library
//!
//! Core functionality for SafePath's emergency feature: a persisted list of
//! emergency contacts and a live location sharing session that sends an
//! alert with an address and map link on every location update.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![deny(unsafe_code)]

mod api;
pub mod config;
pub mod contacts;
pub mod location;
pub mod sharing;

pub use api::{Platform, SafepathCore, DATABASE_FILE_NAME};
pub use config::SafepathConfig;
