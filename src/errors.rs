/*!
 * Error types for the briefly application.
 *
 * This module contains custom error types for the summarization capability and
 * the application shell, using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when talking to a summarization capability
#[derive(Error, Debug)]
pub enum CapabilityError {
    /// The capability reported that summarization cannot be used at all
    #[error("AI Summarization is not supported")]
    NotSupported,

    /// Error when making a request to the host fails
    #[error("Capability request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing a host response fails
    #[error("Failed to parse capability response: {0}")]
    ParseError(String),

    /// Error returned by the host itself
    #[error("Capability responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the host
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The model could not be acquired
    #[error("Model download failed: {0}")]
    DownloadFailed(String),

    /// The session was already destroyed
    #[error("Summarization session has been destroyed")]
    SessionClosed,
}

impl From<reqwest::Error> for CapabilityError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_connect() || error.is_timeout() {
            Self::ConnectionError(error.to_string())
        } else if error.is_decode() {
            Self::ParseError(error.to_string())
        } else {
            Self::RequestFailed(error.to_string())
        }
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from the summarization capability
    #[error("Capability error: {0}")]
    Capability(#[from] CapabilityError),
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::Config(error.to_string())
    }
}
