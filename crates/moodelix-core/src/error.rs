//! Core error types for moodelix-core.
//!
//! This module defines the error hierarchy using thiserror. The taxonomy
//! follows the dashboard's failure modes: missing authentication, remote
//! (network/database) failure, and malformed user input.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for moodelix-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Persistence backend errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by a [`DashboardStore`](crate::storage::DashboardStore) backend.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No session, or the session token was rejected
    #[error("Unauthorized")]
    Unauthorized,

    /// Row does not exist (or is not owned by the caller)
    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },

    /// Transport-level failure talking to the hosted backend
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status
    #[error("Remote error ({status}): {message}")]
    Remote { status: u16, message: String },

    /// Local SQLite failure
    #[error("Database error: {0}")]
    Sqlite(String),

    /// Failed to open the local database file
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Backend row could not be decoded
    #[error("Malformed row: {0}")]
    Malformed(String),
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

    /// Missing required configuration key
    #[error("Missing required configuration key: {0}")]
    MissingKey(String),

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),
}

/// Validation errors for user input.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// Value outside its permitted range
    #[error("{field} must be between {min} and {max} (got {value})")]
    OutOfRange {
        field: &'static str,
        min: u32,
        max: u32,
        value: u32,
    },

    /// Edit attempted while the countdown is running
    #[error("Cannot change durations while the timer is running")]
    TimerRunning,

    /// Required text was empty or whitespace
    #[error("{0} must not be empty")]
    Empty(&'static str),

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Failures while turning a storage key into a signed URL.
#[derive(Error, Debug)]
pub enum WallpaperError {
    #[error("S3 key is required")]
    EmptyKey,

    #[error("Presign request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Signing service answered with a non-success status
    #[error("Presign rejected ({status})")]
    Rejected { status: u16 },
}

/// A pasted URL matched neither the YouTube nor the Spotify patterns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid URL. Please enter a valid YouTube or Spotify link: {url}")]
pub struct MediaParseError {
    pub url: String,
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Sqlite(err.to_string())
    }
}

impl StoreError {
    /// Whether this error means the caller has no valid session.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, StoreError::Unauthorized)
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
