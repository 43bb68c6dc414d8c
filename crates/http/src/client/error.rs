//! Client error types

use crate::storage::StorageError;
use thiserror::Error;

/// Client error types
#[derive(Debug, Error)]
pub enum ClientError {
    /// The transport could not reach the endpoint or the request could not be built
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// Credential rejected or token expired (401)
    #[error("Authentication failed: {0}")]
    AuthRejected(String),

    /// Any other client error status
    #[error("Request rejected {status}: {message}")]
    Validation { status: u16, message: String },

    /// Server error or unexpected status
    #[error("Server error {status}: {message}")]
    Server { status: u16, message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Token could not be encoded as a header value
    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    /// Durable token slot failed
    #[error("Token storage error: {0}")]
    Storage(#[from] StorageError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Caller input rejected before sending
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl ClientError {
    /// Create error from HTTP status code and response body
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let message = extract_message(body).unwrap_or_else(|| {
            if body.trim().is_empty() {
                status.to_string()
            } else {
                body.trim().to_string()
            }
        });

        match status.as_u16() {
            401 => Self::AuthRejected(message),
            code @ 400..=499 => Self::Validation {
                status: code,
                message,
            },
            code => Self::Server {
                status: code,
                message,
            },
        }
    }

    /// Whether the backend rejected the credential
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::AuthRejected(_))
    }

    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::AuthRejected(_) => Some(401),
            Self::Validation { status, .. } | Self::Server { status, .. } => Some(*status),
            Self::Network(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Pull the human readable message out of a JSON error body.
///
/// Application errors use `error`, the token layer uses `msg`.
fn extract_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["error", "msg", "message"]
        .iter()
        .find_map(|key| value.get(key).and_then(|v| v.as_str()))
        .map(str::to_string)
}
