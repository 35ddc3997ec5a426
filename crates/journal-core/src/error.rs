//! Error types for journal-core

use thiserror::Error;

/// Result type alias using journal-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Fallback message when neither the server nor the transport explains a failure
pub const GENERIC_FAILURE: &str = "Request failed";

/// Errors that can occur in journal-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// The server rejected the session credential (HTTP 401)
    #[error("{0}")]
    Unauthorized(String),

    /// The server answered with a non-success status
    #[error("{message}")]
    Api { status: u16, message: String },

    /// Transport failure (timeout, connection refused, TLS, ...)
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("Failed to parse JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid input rejected before any request was made
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Invalid client configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Session persistence failure
    #[error("Session storage error: {0}")]
    SessionStorage(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// HTTP status reported by the server, if the failure came from a response.
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized(_) => Some(401),
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }

    /// Human-readable message for store error slots.
    ///
    /// Uses `fallback` only when the rendered error is empty.
    pub fn user_message(&self, fallback: &str) -> String {
        let rendered = self.to_string();
        let trimmed = rendered.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
        if fallback.trim().is_empty() {
            GENERIC_FAILURE.to_string()
        } else {
            fallback.to_string()
        }
    }
}
