//! Domain error types

use thiserror::Error;

/// Error when parsing a duration string
#[derive(Debug, Clone, Error)]
#[error("Invalid duration format: \"{input}\". Expected format: <number>s, <number>m, or <number>m<number>s (e.g., 5s, 1m, 2m30s)")]
pub struct DurationParseError {
    pub input: String,
}

/// Error when a string cannot name an artifact
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid artifact id: \"{input}\". Expected a plain file name such as recording_1700000000.m4a")]
pub struct InvalidArtifactIdError {
    pub input: String,
}

/// Error when a sync status name is unknown
#[derive(Debug, Clone, Error)]
#[error("Invalid sync status: \"{input}\". Valid statuses are: not_synced, pending, syncing, synced, failed")]
pub struct InvalidSyncStatusError {
    pub input: String,
}

/// Error when configuration fails
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(String),

    #[error("Failed to parse config file: {0}")]
    ParseError(String),

    #[error("Failed to write config file: {0}")]
    WriteError(String),

    #[error("Invalid config value for '{key}': {message}")]
    ValidationError { key: String, message: String },

    #[error("Config file already exists at: {0}")]
    AlreadyExists(String),
}
