//! HTTP fetch collaborator for provider endpoints

use async_trait::async_trait;
use dashmap::DashMap;
use reqwest::{Client, header};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Charset assumed when the response does not declare one (RFC 2616 §3.7.1)
const DEFAULT_CHARSET: &str = "iso-8859-1";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("Connection timeout")]
    Timeout,

    #[error("HTTP {0}")]
    Status(u16),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

pub type Result<T> = std::result::Result<T, FetchError>;

/// Per-request HTTP settings carried by each provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpConfig {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(3),
            user_agent: default_user_agent(),
        }
    }
}

pub fn default_user_agent() -> String {
    format!("linkembed/{}", env!("CARGO_PKG_VERSION"))
}

/// Performs a single timed GET and returns the decoded body
///
/// Non-2xx statuses are failures. There is no retry: one failed attempt is
/// final for the call.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str, config: &HttpConfig) -> Result<String>;
}

/// reqwest-backed fetcher
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| FetchError::RequestFailed(e.to_string()))?;

        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, config: &HttpConfig) -> Result<String> {
        debug!(url, "Fetching provider endpoint");

        let parsed = reqwest::Url::parse(url).map_err(|e| FetchError::InvalidUrl(e.to_string()))?;

        let response = self
            .client
            .get(parsed)
            .timeout(config.timeout)
            .header(header::USER_AGENT, &config.user_agent)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response
            .text_with_charset(DEFAULT_CHARSET)
            .await
            .map_err(map_reqwest_error)?;

        debug!(url, size = body.len(), "Fetch completed");

        Ok(body)
    }
}

fn map_reqwest_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::RequestFailed(e.to_string())
    }
}

/// Fetcher answering from a fixed URL -> body table
///
/// Unknown URLs fail with `404`. Every call is counted, hits or not.
#[derive(Debug, Clone, Default)]
pub struct StaticFetcher {
    responses: Arc<DashMap<String, String>>,
    calls: Arc<AtomicUsize>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.insert(url, body);
        self
    }

    pub fn insert(&self, url: impl Into<String>, body: impl Into<String>) {
        self.responses.insert(url.into(), body.into());
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for StaticFetcher {
    async fn fetch(&self, url: &str, _config: &HttpConfig) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .get(url)
            .map(|body| body.value().clone())
            .ok_or(FetchError::Status(404))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_config_defaults() {
        let config = HttpConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert!(config.user_agent.starts_with("linkembed/"));
    }

    #[tokio::test]
    async fn test_static_fetcher_counts_calls() {
        let fetcher = StaticFetcher::new().with_response("http://a", "{}");
        let config = HttpConfig::default();

        assert_eq!(fetcher.fetch("http://a", &config).await.unwrap(), "{}");
        assert!(matches!(
            fetcher.fetch("http://b", &config).await,
            Err(FetchError::Status(404))
        ));
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn test_http_fetcher_rejects_invalid_url() {
        let fetcher = HttpFetcher::new().unwrap();
        let result = fetcher.fetch("not a url", &HttpConfig::default()).await;
        assert!(matches!(result, Err(FetchError::InvalidUrl(_))));
    }
}
