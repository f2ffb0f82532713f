//! Error handling module for vedit

use thiserror::Error;

use crate::domain::errors::DomainError;

/// Crate-level error type for setup and configuration
#[derive(Error, Debug)]
pub enum VeditError {
    /// Configuration file or override is invalid
    #[error("Invalid configuration: {message}")]
    Config { message: String },

    /// Time argument could not be parsed
    #[error("Invalid time format: {time}. Expected HH:MM:SS.ms, MM:SS.ms, or seconds")]
    InvalidTimeFormat { time: String },

    /// Domain operation failed
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parse error
    #[error("Failed to parse configuration file: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result type alias for vedit setup operations
pub type VeditResult<T> = std::result::Result<T, VeditError>;
