//! Error types for emergency contact operations.
//!
//! This module defines errors that can occur while validating, storing,
//! or removing emergency contacts.

use thiserror::Error;

/// Error type for contact operations.
#[derive(Error, Debug)]
pub enum ContactError {
    /// A required field was empty.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// Removal index outside the stored sequence.
    #[error("Contact index {index} out of bounds (have {len})")]
    IndexOutOfBounds {
        /// The requested index.
        index: usize,
        /// Number of stored contacts.
        len: usize,
    },

    /// Storage operation failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Database error from `SQLite`.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The contact list could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for contact operations.
pub type Result<T> = std::result::Result<T, ContactError>;
