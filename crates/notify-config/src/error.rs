//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration error type.
///
/// Credential problems are fatal for a dispatch and surface before any
/// store or provider access.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No credential file configured
    #[error(
        "Push service account not configured. Set NOTIFYD_SERVICE_ACCOUNT_PATH or \
         GOOGLE_APPLICATION_CREDENTIALS to the path of your service account JSON file."
    )]
    CredentialsNotConfigured,

    /// Configured credential file does not exist
    #[error("Service account file not found: {}", .0.display())]
    CredentialFileNotFound(PathBuf),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Path error (e.g., home directory not found)
    #[error("Path error: {0}")]
    Path(String),
}

/// Result type alias using ConfigError.
pub type ConfigResult<T> = Result<T, ConfigError>;
