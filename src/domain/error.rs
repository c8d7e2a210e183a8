//! Domain error types

use thiserror::Error;

/// Error when parsing a byte size string
#[derive(Debug, Clone, Error)]
#[error("Invalid size format: \"{input}\". Expected format: <number>[K|M|G|T] (e.g., 512M, 1G, 1048576)")]
pub struct ByteSizeParseError {
    pub input: String,
}

/// Error when an invalid quality preset is provided
#[derive(Debug, Clone, Error)]
#[error("Invalid quality: \"{input}\". Valid qualities are: uhd, fhd, hd, sd")]
pub struct QualityParseError {
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
