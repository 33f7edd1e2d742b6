//! CLI error types and exit codes

use std::path::PathBuf;

use devsweep_core::DirectoryError;
use devsweep_entra::EntraError;
use thiserror::Error;

use crate::config::ConfigError;

/// Exit codes for the CLI
/// - 0: Success (per-item failures and a declined prompt included)
/// - 1: I/O or CSV error
/// - 2: Authentication or authorization failure
/// - 3: Network error
/// - 4: Validation or precondition failure
/// - 5: Directory service error
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Directory error: {0}")]
    Directory(String),

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Io(_) | CliError::Csv(_) => 1,
            CliError::AuthenticationFailed(_) | CliError::PermissionDenied(_) => 2,
            CliError::Network(_) => 3,
            CliError::Config(_) | CliError::InputNotFound(_) | CliError::Validation(_) => 4,
            CliError::Directory(_) => 5,
        }
    }

    /// Print the error to stderr with appropriate formatting
    pub fn print(&self) {
        let use_color = std::env::var("NO_COLOR").is_err();

        if use_color {
            eprintln!("\x1b[31mError:\x1b[0m {}", self);
        } else {
            eprintln!("Error: {}", self);
        }

        if let Some(suggestion) = self.suggestion() {
            if use_color {
                eprintln!("\n\x1b[33mSuggestion:\x1b[0m {}", suggestion);
            } else {
                eprintln!("\nSuggestion: {}", suggestion);
            }
        }
    }

    fn suggestion(&self) -> Option<&'static str> {
        match self {
            CliError::Config(_) => Some(
                "Set AZURE_TENANT_ID, AZURE_CLIENT_ID and AZURE_CLIENT_SECRET in the environment or a .env file.",
            ),
            CliError::AuthenticationFailed(_) => {
                Some("Check the tenant id and the app registration's client secret.")
            }
            CliError::PermissionDenied(_) => Some(
                "Grant the app registration the Graph application permissions for this command and admin consent.",
            ),
            _ => None,
        }
    }
}

impl From<DirectoryError> for CliError {
    fn from(e: DirectoryError) -> Self {
        match e {
            DirectoryError::Authentication(msg) => CliError::AuthenticationFailed(msg),
            DirectoryError::PermissionDenied { .. } => CliError::PermissionDenied(e.to_string()),
            DirectoryError::Transport(msg) => CliError::Network(msg),
            other => CliError::Directory(other.to_string()),
        }
    }
}

impl From<EntraError> for CliError {
    fn from(e: EntraError) -> Self {
        match e {
            EntraError::Config(msg) => CliError::Config(msg),
            EntraError::Url(e) => CliError::Config(format!("Invalid endpoint URL: {}", e)),
            other => DirectoryError::from(other).into(),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e.to_string())
    }
}

impl From<csv::Error> for CliError {
    fn from(e: csv::Error) -> Self {
        CliError::Csv(e.to_string())
    }
}

impl From<dialoguer::Error> for CliError {
    fn from(e: dialoguer::Error) -> Self {
        CliError::Io(format!("Prompt error: {}", e))
    }
}
