// Raw HTTP capability used by the provider API clients.
//
// The engine never talks to reqwest directly: every outbound call goes through
// `HttpClient`, so tests can swap in a fake and every call can be cancelled.

pub mod client;
pub mod error;

pub use client::ReqwestHttpClient;
pub use error::{HttpError, MAX_RESPONSE_SIZE};

use async_trait::async_trait;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

/// Query parameters and headers for one GET request.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub params: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
}

impl RequestOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn param(mut self, name: &str, value: impl ToString) -> Self {
        self.params.push((name.to_string(), value.to_string()));
        self
    }

    #[must_use]
    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }
}

#[async_trait]
pub trait HttpClient: Send + Sync {
    /// GET `url` and decode the body as JSON.
    ///
    /// Returns [`HttpError::Cancelled`] as soon as `cancel` fires; the
    /// in-flight request is dropped.
    async fn get_json(
        &self,
        url: &str,
        options: &RequestOptions,
        cancel: &CancellationToken,
    ) -> Result<Value, HttpError>;
}
