//! Directory error types
//!
//! Errors returned by the directory capability traits. Per-item failures are
//! carried inside reports as strings, so only batch-level reads ever surface
//! these to a caller.

use thiserror::Error;

/// Result type alias using `DirectoryError`.
pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Error that can occur while talking to the directory service.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Authentication with the directory failed.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The session lacks the scope required for the operation.
    #[error("permission denied for {operation}: {message}")]
    PermissionDenied { operation: String, message: String },

    /// The addressed object does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The service answered with an error.
    #[error("directory service error ({code}): {message}")]
    Service { code: String, message: String },

    /// The request never produced a usable response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The response could not be interpreted.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl DirectoryError {
    /// Builds a service error from a code and message.
    pub fn service(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Service {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Returns true if the error comes from missing credentials or scopes.
    #[must_use]
    pub fn is_authorization(&self) -> bool {
        matches!(
            self,
            Self::Authentication(_) | Self::PermissionDenied { .. }
        )
    }
}
