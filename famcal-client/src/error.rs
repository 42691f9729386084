//! Error types for the REST client.

use famcal_core::validation::ValidationErrors;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not logged in. Run `famcal login` first")]
    NotLoggedIn,

    #[error("Session expired or was rejected by the server. Run `famcal login` again")]
    Unauthorized,

    #[error("{0}")]
    Validation(ValidationErrors),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Could not reach {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Unexpected response from server: {0}")]
    Decode(String),

    #[error("Invalid API URL '{0}'")]
    InvalidUrl(String),

    #[error("Session file error: {0}")]
    Session(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    /// Whether the stored session should be dropped.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(errors)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
