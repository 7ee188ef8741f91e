//! Error types for unisweep library.
//!
//! Sanitization itself is infallible. Only the configuration surface
//! (loading profiles, parsing preset and form names) can fail.

use std::io;
use thiserror::Error;

/// Result type alias for unisweep operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for unisweep library.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error while reading a profile file.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The profile document could not be deserialized.
    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    /// The preset name is not one of the built-in presets.
    #[error("Unknown preset: {0}")]
    UnknownPreset(String),

    /// The normalization form name is not NFC, NFD, NFKC or NFKD.
    #[error("Unknown normalization form: {0}")]
    UnknownNormalizationForm(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::InvalidProfile(err.to_string())
    }
}
