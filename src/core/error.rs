//! Error types for the chat core.

use thiserror::Error;

/// Fatal configuration problem, raised once at construction time.
/// A session is never partially constructed.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} is not set. {hint}")]
    MissingKey { key: String, hint: String },

    #[error("{key} is invalid ('{value}'): {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    pub fn missing(key: &str, hint: &str) -> Self {
        ConfigError::MissingKey {
            key: key.to_string(),
            hint: hint.to_string(),
        }
    }

    pub fn invalid(key: &str, value: impl ToString, reason: &str) -> Self {
        ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Completion-call failure. Recoverable: it aborts the current turn only
/// and the session stays usable. The core never retries.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API error {status}: {detail}")]
    Status {
        status: reqwest::StatusCode,
        detail: String,
    },

    #[error("API response contained no completion choices")]
    EmptyResponse,
}
