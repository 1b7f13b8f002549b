//! Flutter-Rust bridge wrapper for safepath-core.
//!
//! This crate serves as a thin wrapper that exposes `safepath-core` to the
//! Flutter shell via Cargokit. Platform capabilities that only exist on the
//! Dart side (geolocation, share sheet, clipboard) cross the boundary as
//! pushed positions and a drained outbox.

pub mod api;

pub use safepath_core::*;
