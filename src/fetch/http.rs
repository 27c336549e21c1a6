//! HTTP transport for JSON documents
//!
//! The fetcher only needs "GET this URL and give me JSON". That is expressed
//! as the [`HttpClient`] trait so it can be swapped for a scripted fake.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use super::FetchError;

/// Transport used by the content fetcher
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Fetches `url` and parses the body as JSON
    ///
    /// Non-success statuses, transport errors and unparseable bodies are all
    /// reported as `Err`.
    async fn get_json(&self, url: &str) -> Result<Value, FetchError>;
}

/// [`HttpClient`] backed by reqwest
#[derive(Debug, Clone, Default)]
pub struct ReqwestClient {
    http_client: Client,
}

impl ReqwestClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an already configured reqwest client
    pub fn with_client(http_client: Client) -> Self {
        Self { http_client }
    }
}

/// Connection failures and timeouts mean the host could not be reached
fn transport_error(err: reqwest::Error) -> FetchError {
    if err.is_connect() || err.is_timeout() {
        FetchError::Network(err.to_string())
    } else {
        FetchError::Http(err)
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn get_json(&self, url: &str) -> Result<Value, FetchError> {
        let response = self.http_client.get(url).send().await.map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}
