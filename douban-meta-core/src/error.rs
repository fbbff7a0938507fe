use thiserror::Error;

use crate::cache::CacheError;
use crate::http::HttpError;
use crate::provider::ProviderError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    #[error("Request cancelled")]
    Cancelled,
}

impl Error {
    /// Whether this error only means the owning request went away.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(
            self,
            Self::Cancelled
                | Self::Provider(ProviderError::Cancelled)
                | Self::Cache(CacheError::Cancelled)
                | Self::Http(HttpError::Cancelled)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
