//! Error handling for the ShotGrid client

use thiserror::Error;

/// Result type used across sgquery
pub type Result<T> = std::result::Result<T, ShotGridError>;

/// Errors raised while talking to ShotGrid
#[derive(Error, Debug)]
pub enum ShotGridError {
    /// Authentication failed (bad script name / API key, or expired grant)
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// Entity type or endpoint not found
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Configuration access error
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),

    /// Invalid ShotGrid connection settings (site URL, proxy, ...)
    #[error("ShotGrid configuration error: {0}")]
    Configuration(String),

    /// Error reported by the ShotGrid API
    #[error("ShotGrid API error (code {code}): {message}")]
    ApiError { code: u16, message: String },

    /// The connection handle could not be constructed
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    #[error("ShotGrid error: {0}")]
    Other(String),
}

impl ShotGridError {
    /// Builds an error from an HTTP status code and a message
    pub fn from_status_code(code: u16, message: impl Into<String>) -> Self {
        match code {
            401 | 403 => Self::Unauthorized(message.into()),
            404 => Self::NotFound(message.into()),
            _ => Self::ApiError {
                code,
                message: message.into(),
            },
        }
    }

    /// True for credential errors (401/403, or a 400 `invalid_client` grant rejection)
    pub fn is_auth_error(&self) -> bool {
        match self {
            ShotGridError::Unauthorized(_) => true,
            ShotGridError::ApiError { code: 400, message } => message.contains("invalid_client"),
            _ => false,
        }
    }
}
