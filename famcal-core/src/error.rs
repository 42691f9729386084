//! Error types for famcal-core.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors that can occur in core operations.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid date '{0}'. Expected YYYY-MM-DD or an ISO 8601 datetime")]
    InvalidDate(String),

    #[error("Moving from {0} leaves the supported date range")]
    DateOutOfRange(NaiveDate),

    #[error("Unknown {kind} '{value}'. Expected one of: {expected}")]
    UnknownVariant {
        kind: &'static str,
        value: String,
        expected: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
