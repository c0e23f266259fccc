//! Error types for voxform

use std::fmt;
use std::io;
use thiserror::Error;

/// Main error type for voxform
#[derive(Error, Debug)]
pub enum VoxError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Speech unavailable: {0}")]
    SpeechUnavailable(String),

    #[error("Speech synthesis error: {0}")]
    Speech(String),

    #[error("Validation failed: {0}")]
    Validation(ValidationFailure),

    #[error("Relay error: {0}")]
    Relay(String),

    #[error("Unknown form field: {0}")]
    UnknownField(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("INI parse error: {0}")]
    IniParse(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for voxform operations
pub type Result<T> = std::result::Result<T, VoxError>;

/// Reasons a form is blocked locally before anything reaches the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationFailure {
    /// Personal data consent was not given
    MissingConsent,
    /// A required field has no value
    MissingRequired { field: String },
    /// A value does not fit the widget's type or pattern
    Malformed { field: String, expected: String },
    /// A select value is not one of the declared options
    UnknownOption { field: String, value: String },
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationFailure::MissingConsent => {
                write!(f, "You must accept the personal data processing terms.")
            }
            ValidationFailure::MissingRequired { field } => {
                write!(f, "Field {} is required.", field)
            }
            ValidationFailure::Malformed { field, expected } => {
                write!(f, "Field {} expects {}.", field, expected)
            }
            ValidationFailure::UnknownOption { field, value } => {
                write!(f, "Field {} has no option {}.", field, value)
            }
        }
    }
}

impl From<ValidationFailure> for VoxError {
    fn from(failure: ValidationFailure) -> Self {
        VoxError::Validation(failure)
    }
}

impl From<reqwest::Error> for VoxError {
    fn from(e: reqwest::Error) -> Self {
        VoxError::Network(e.to_string())
    }
}

impl From<String> for VoxError {
    fn from(s: String) -> Self {
        VoxError::Other(s)
    }
}

impl From<&str> for VoxError {
    fn from(s: &str) -> Self {
        VoxError::Other(s.to_string())
    }
}
