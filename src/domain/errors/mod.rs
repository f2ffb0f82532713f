// Domain errors - Error types for the domain layer

use std::fmt;

/// Domain-specific error types
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Operation parameters failed validation
    Validation(String),
    /// A required upload has not been provided yet
    MissingUpload(String),
    /// Upload extension is not accepted for its media kind
    UnsupportedFormat(String),
    /// Numeric parameter outside its allowed range
    OutOfRange(String),
    /// Media handle was closed more than once
    AlreadyClosed(String),
    /// File system failure
    Io(String),
    /// Media probing failed
    Probe(String),
    /// Encoding backend failed
    Backend(String),
    /// Session state could not be loaded or saved
    Session(String),
    /// Configuration is invalid
    Config(String),
}

impl DomainError {
    /// Validation-class errors are reported inline and leave session state untouched
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            DomainError::Validation(_)
                | DomainError::MissingUpload(_)
                | DomainError::UnsupportedFormat(_)
                | DomainError::OutOfRange(_)
        )
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainError::Validation(msg) => write!(f, "Validation failed: {}", msg),
            DomainError::MissingUpload(msg) => write!(f, "Missing upload: {}", msg),
            DomainError::UnsupportedFormat(msg) => write!(f, "Unsupported format: {}", msg),
            DomainError::OutOfRange(msg) => write!(f, "Out of range: {}", msg),
            DomainError::AlreadyClosed(msg) => write!(f, "Already closed: {}", msg),
            DomainError::Io(msg) => write!(f, "I/O error: {}", msg),
            DomainError::Probe(msg) => write!(f, "Probe failed: {}", msg),
            DomainError::Backend(msg) => write!(f, "Media backend failed: {}", msg),
            DomainError::Session(msg) => write!(f, "Session error: {}", msg),
            DomainError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}

impl From<std::io::Error> for DomainError {
    fn from(err: std::io::Error) -> Self {
        DomainError::Io(err.to_string())
    }
}
