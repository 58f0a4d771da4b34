//! Core error types for fitcue-core.
//!
//! The timer engines themselves never fail during a session. Errors only
//! come from validating configuration up front, from loading/saving the
//! config file, and from the audio layer (where they are logged and
//! swallowed rather than propagated).

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for fitcue-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Audio/speech errors
    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),

    /// The session is active and the requested change is only allowed
    /// while idle or finished.
    #[error("Session is active; stop or finish it before changing {what}")]
    SessionActive { what: &'static str },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    /// Home/config directory could not be prepared
    #[error("Config directory unavailable: {0}")]
    DirectoryUnavailable(String),
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A duration or count that must be at least 1 was 0
    #[error("'{field}' must be at least 1")]
    NonPositive { field: &'static str },

    /// Empty collection
    #[error("Empty collection: {0}")]
    EmptyCollection(String),

    /// Out of bounds
    #[error("Index {index} out of bounds for {collection} (length: {len})")]
    OutOfBounds {
        collection: String,
        index: usize,
        len: usize,
    },
}

/// Audio output and speech errors.
///
/// These never reach the timer: the router logs them and falls back or
/// drops the cue.
#[derive(Error, Debug)]
pub enum AudioError {
    /// Another session holds the shared output device
    #[error("Audio output is held by session {owner}")]
    OutputBusy { owner: uuid::Uuid },

    /// Remote synthesis failed
    #[error("Remote speech synthesis failed: {0}")]
    Remote(String),

    /// Remote synthesis did not answer in time
    #[error("Remote speech synthesis timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    /// Local speech failed
    #[error("Local speech failed: {0}")]
    Local(String),

    /// Playback of a synthesized clip failed
    #[error("Playback failed: {0}")]
    PlaybackFailed(String),
}

impl From<reqwest::Error> for AudioError {
    fn from(err: reqwest::Error) -> Self {
        AudioError::Remote(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
