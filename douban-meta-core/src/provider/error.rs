// Provider Error Types

use crate::cache::CacheError;
use crate::http::HttpError;

/// Image provider errors
///
/// Everything except [`ProviderError::Cancelled`] is recovered by the
/// resolution engine: the provider is skipped and the next one is queried.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Missing credential for {0}")]
    MissingCredential(&'static str),

    #[error("HTTP error: {0}")]
    Http(HttpError),

    #[error("Cache error: {0}")]
    Cache(CacheError),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Request cancelled")]
    Cancelled,
}

impl ProviderError {
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// The provider is not set up for this deployment or user; a routine skip.
    #[must_use]
    pub const fn is_unconfigured(&self) -> bool {
        matches!(self, Self::MissingCredential(_))
    }
}

impl From<HttpError> for ProviderError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::Cancelled => Self::Cancelled,
            other => Self::Http(other),
        }
    }
}

impl From<CacheError> for ProviderError {
    fn from(err: CacheError) -> Self {
        match err {
            CacheError::Cancelled | CacheError::Upstream(HttpError::Cancelled) => Self::Cancelled,
            CacheError::Upstream(http) => Self::Http(http),
            other => Self::Cache(other),
        }
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancellation_survives_conversion() {
        assert!(ProviderError::from(HttpError::Cancelled).is_cancelled());
        assert!(ProviderError::from(CacheError::Cancelled).is_cancelled());
        assert!(ProviderError::from(CacheError::Upstream(HttpError::Cancelled)).is_cancelled());
        assert!(!ProviderError::from(CacheError::WorkerFailed).is_cancelled());
        assert!(matches!(
            ProviderError::from(CacheError::Upstream(HttpError::Network("reset".into()))),
            ProviderError::Http(HttpError::Network(_))
        ));
    }

    #[test]
    fn test_only_missing_credential_is_unconfigured() {
        assert!(ProviderError::MissingCredential("tmdb").is_unconfigured());
        assert!(!ProviderError::Parse("bad".into()).is_unconfigured());
        assert!(!ProviderError::Cancelled.is_unconfigured());
    }
}
