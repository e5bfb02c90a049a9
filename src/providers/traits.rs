use async_trait::async_trait;
use thiserror::Error;

use super::types::{Metadata, Params};

/// Per-URL resolution errors
///
/// None of these abort an extract or rewrite pass; they only leave the URL
/// unresolved.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider not found for \"{0}\"")]
    NotFound(String),
    #[error("error fetching \"{url}\": {reason}")]
    Fetch { url: String, reason: String },
    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
}

/// Converts a URL into an oEmbed metadata record
///
/// Implementations are immutable once built and shared behind `Arc` by the
/// registry, so concurrent lookups need no locking.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Endpoint the provider queries (empty for providers that never fetch)
    fn endpoint(&self) -> &str;

    /// Resolve `url`, merging `params` into the request
    async fn request(&self, url: &str, params: &Params) -> Result<Metadata, ProviderError>;
}
