//! Error types for the Entra ID directory client.

use devsweep_core::DirectoryError;
use thiserror::Error;

/// Result type alias using `EntraError`.
pub type EntraResult<T> = Result<T, EntraError>;

/// Errors that can occur when interacting with Entra ID.
#[derive(Debug, Error)]
pub enum EntraError {
    /// Configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// `OAuth2` authentication error.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Microsoft Graph API error.
    #[error("Graph API error: {code} - {message}")]
    GraphApi {
        status: u16,
        code: String,
        message: String,
        inner_error: Option<String>,
    },

    /// HTTP request error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// A Graph object lacked a required property.
    #[error("Invalid {object}: {message}")]
    InvalidObject { object: &'static str, message: String },
}

impl From<EntraError> for DirectoryError {
    fn from(err: EntraError) -> Self {
        match err {
            EntraError::Auth(message) => DirectoryError::Authentication(message),
            EntraError::GraphApi {
                status: 401,
                message,
                ..
            } => DirectoryError::Authentication(message),
            EntraError::GraphApi {
                status: 403,
                code,
                message,
                ..
            } => DirectoryError::PermissionDenied {
                operation: code,
                message,
            },
            EntraError::GraphApi {
                status: 404,
                message,
                ..
            } => DirectoryError::NotFound(message),
            EntraError::GraphApi { code, message, .. } => DirectoryError::Service { code, message },
            EntraError::Http(e) => DirectoryError::Transport(e.to_string()),
            EntraError::Json(e) => DirectoryError::InvalidResponse(e.to_string()),
            EntraError::InvalidObject { object, message } => {
                DirectoryError::InvalidResponse(format!("{object}: {message}"))
            }
            other => DirectoryError::Transport(other.to_string()),
        }
    }
}
