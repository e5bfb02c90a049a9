use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::traits::{Provider, ProviderError};
use super::types::{Metadata, Params};
use crate::fetch::{Fetcher, HttpConfig};

/// Provider backed by a remote oEmbed endpoint
///
/// Every request carries `format=json`, the provider's base parameters, the
/// caller's extra parameters and finally `url`. Parameters are serialized
/// sorted by key so identical requests always produce identical endpoint URLs.
#[derive(Clone)]
pub struct EndpointProvider {
    endpoint: String,
    http: HttpConfig,
    base_params: Params,
    fetcher: Arc<dyn Fetcher>,
}

impl EndpointProvider {
    pub fn new(endpoint: impl Into<String>, fetcher: Arc<dyn Fetcher>) -> Self {
        let mut base_params = Params::new();
        base_params.insert("format".to_string(), "json".to_string());

        Self {
            endpoint: endpoint.into(),
            http: HttpConfig::default(),
            base_params,
            fetcher,
        }
    }

    pub fn with_http(mut self, http: HttpConfig) -> Self {
        self.http = http;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.http.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.http.user_agent = user_agent.into();
        self
    }

    /// Add fixed parameters sent with every request (API keys and the like)
    pub fn with_params(mut self, params: &Params) -> Self {
        self.base_params
            .extend(params.iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }

    pub fn http(&self) -> &HttpConfig {
        &self.http
    }

    pub fn base_params(&self) -> &Params {
        &self.base_params
    }

    /// Query string for `url`, sorted by key
    pub fn encode_params(&self, url: &str, extra: &Params) -> String {
        let mut params = self.base_params.clone();
        params.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
        params.insert("url".to_string(), url.to_string());

        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(params.iter())
            .finish()
    }

    /// Full endpoint URL, appending to an existing query string if present
    pub fn endpoint_url(&self, url: &str, extra: &Params) -> String {
        let encoded = self.encode_params(url, extra);
        if self.endpoint.contains('?') {
            format!("{}&{}", self.endpoint.trim_end_matches('&'), encoded)
        } else {
            format!("{}?{}", self.endpoint, encoded)
        }
    }

    fn handle_response(&self, body: &str, url: &str) -> Result<Metadata, ProviderError> {
        let value: Value = serde_json::from_str(body)
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        let mut metadata = Metadata::from_value(value).ok_or_else(|| {
            ProviderError::InvalidResponse("expected a JSON object".to_string())
        })?;
        metadata.normalize(url);

        Ok(metadata)
    }
}

#[async_trait]
impl Provider for EndpointProvider {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn request(&self, url: &str, params: &Params) -> Result<Metadata, ProviderError> {
        let endpoint_url = self.endpoint_url(url, params);

        let body = match self.fetcher.fetch(&endpoint_url, &self.http).await {
            Ok(body) => body,
            Err(e) => {
                warn!(url, endpoint = %endpoint_url, error = %e, "Provider fetch failed");
                return Err(ProviderError::Fetch {
                    url: endpoint_url,
                    reason: e.to_string(),
                });
            }
        };

        debug!(url, endpoint = %endpoint_url, "Provider responded");
        self.handle_response(&body, url)
    }
}

impl std::fmt::Debug for EndpointProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EndpointProvider")
            .field("endpoint", &self.endpoint)
            .field("http", &self.http)
            .field("base_params", &self.base_params)
            .finish_non_exhaustive()
    }
}
