//! Outbound HTTP error types

use thiserror::Error;

/// Maximum response body size for provider HTTP calls (16 MB).
pub const MAX_RESPONSE_SIZE: usize = 16 * 1024 * 1024;

/// Error returned by [`super::HttpClient`] implementations.
///
/// `Clone` so a single failed fetch can be handed to every coalesced waiter.
#[derive(Debug, Clone, Error)]
pub enum HttpError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP error {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Response too large ({size} bytes, max {MAX_RESPONSE_SIZE})")]
    ResponseTooLarge { size: u64 },

    #[error("Request cancelled")]
    Cancelled,
}

impl HttpError {
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }
}

impl From<reqwest::Error> for HttpError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for HttpError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<reqwest::header::InvalidHeaderValue> for HttpError {
    fn from(err: reqwest::header::InvalidHeaderValue) -> Self {
        Self::InvalidRequest(err.to_string())
    }
}

impl From<reqwest::header::InvalidHeaderName> for HttpError {
    fn from(err: reqwest::header::InvalidHeaderName) -> Self {
        Self::InvalidRequest(err.to_string())
    }
}
