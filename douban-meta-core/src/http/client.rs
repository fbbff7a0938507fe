//! reqwest-backed [`HttpClient`]

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use super::{HttpClient, HttpError, RequestOptions, MAX_RESPONSE_SIZE};
use crate::config::HttpConfig;

/// Shared connection pool for all provider requests.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: Client,
}

impl ReqwestHttpClient {
    pub fn new(config: &HttpConfig) -> Result<Self, HttpError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .timeout(Duration::from_secs(config.timeout_seconds))
            .pool_max_idle_per_host(10)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| HttpError::InvalidRequest(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }

    fn build_headers(options: &RequestOptions) -> Result<HeaderMap, HttpError> {
        let mut headers = HeaderMap::new();
        for (name, value) in &options.headers {
            headers.insert(
                HeaderName::from_bytes(name.as_bytes())?,
                HeaderValue::from_str(value)?,
            );
        }
        Ok(headers)
    }

    async fn send(&self, url: &str, options: &RequestOptions) -> Result<Value, HttpError> {
        let response = self
            .client
            .get(url)
            .query(&options.params)
            .headers(Self::build_headers(options)?)
            .send()
            .await?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(HttpError::Status {
                status: status.as_u16(),
                url: response.url().to_string(),
            });
        }

        json_with_limit(response).await
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get_json(
        &self,
        url: &str,
        options: &RequestOptions,
        cancel: &CancellationToken,
    ) -> Result<Value, HttpError> {
        tracing::debug!(method = "GET", url = %url, params = ?options.params, "Outbound request");

        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(HttpError::Cancelled),
            result = self.send(url, options) => result,
        }
    }
}

/// Read a response body with size limit and deserialize as JSON.
async fn json_with_limit(response: reqwest::Response) -> Result<Value, HttpError> {
    if let Some(cl) = response.content_length() {
        if cl as usize > MAX_RESPONSE_SIZE {
            return Err(HttpError::ResponseTooLarge { size: cl });
        }
    }
    let bytes = response.bytes().await?;
    if bytes.len() > MAX_RESPONSE_SIZE {
        return Err(HttpError::ResponseTooLarge {
            size: bytes.len() as u64,
        });
    }
    serde_json::from_slice(&bytes).map_err(Into::into)
}
