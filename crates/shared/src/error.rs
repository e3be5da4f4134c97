//! Application-wide error types.

use thiserror::Error;

/// Application error types.
///
/// The message is the text shown to the client, so it never carries
/// filesystem paths or OS error details.
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or malformed request input.
    #[error("{0}")]
    ClientError(String),

    /// Referenced file does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Request body exceeds the configured limit.
    #[error("{0}")]
    PayloadTooLarge(String),

    /// Filesystem operation failed.
    #[error("{0}")]
    Storage(String),
}

impl AppError {
    /// Create a client error.
    #[must_use]
    pub fn client(msg: impl Into<String>) -> Self {
        Self::ClientError(msg.into())
    }

    /// Create a not found error.
    #[must_use]
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a payload too large error.
    #[must_use]
    pub fn payload_too_large(msg: impl Into<String>) -> Self {
        Self::PayloadTooLarge(msg.into())
    }

    /// Create a storage error.
    #[must_use]
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::ClientError(_) => 400,
            Self::NotFound(_) => 404,
            Self::PayloadTooLarge(_) => 413,
            Self::Storage(_) => 500,
        }
    }

    /// Returns the client-facing message.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::ClientError(msg)
            | Self::NotFound(msg)
            | Self::PayloadTooLarge(msg)
            | Self::Storage(msg) => msg,
        }
    }
}
