use dashmap::DashMap;
use regex::Regex;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;

use super::traits::{Provider, ProviderError};
use super::types::{Metadata, Params};
use crate::cache::{Cache, make_key};
use crate::observability::Metrics;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("pattern not registered: {0}")]
    PatternNotRegistered(String),
    #[error("invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

#[derive(Clone)]
struct Binding {
    pattern: String,
    matcher: Regex,
    provider: Arc<dyn Provider>,
}

/// Ordered URL-pattern -> provider bindings
///
/// Lookup walks bindings from the most recently registered to the oldest and
/// picks the first pattern matching at the start of the URL, so later
/// registrations override earlier ones. Re-registering an existing pattern
/// swaps its provider in place without changing its position.
///
/// Lookups take `&self` and are safe to share across tasks once the registry
/// is populated. `register`/`unregister` need `&mut self`. Concurrent
/// cache misses on one key wait for a single provider request.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    bindings: Vec<Binding>,
    cache: Option<Arc<dyn Cache>>,
    metrics: Arc<Metrics>,
    in_flight: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cache(cache: Arc<dyn Cache>) -> Self {
        Self {
            cache: Some(cache),
            ..Self::default()
        }
    }

    pub fn set_cache(&mut self, cache: Option<Arc<dyn Cache>>) {
        self.cache = cache;
    }

    pub fn cache(&self) -> Option<&Arc<dyn Cache>> {
        self.cache.as_ref()
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Bind `pattern` to `provider`, replacing any provider already bound to it
    ///
    /// The pattern is compiled eagerly; an invalid expression is rejected here
    /// rather than at lookup time.
    pub fn register(
        &mut self,
        pattern: impl Into<String>,
        provider: Arc<dyn Provider>,
    ) -> Result<(), RegistryError> {
        let pattern = pattern.into();
        let matcher = Regex::new(&format!("^(?:{pattern})")).map_err(|source| {
            RegistryError::InvalidPattern {
                pattern: pattern.clone(),
                source,
            }
        })?;

        match self.bindings.iter_mut().find(|b| b.pattern == pattern) {
            Some(binding) => {
                debug!(pattern = %binding.pattern, "Replacing provider binding");
                binding.matcher = matcher;
                binding.provider = provider;
            }
            None => {
                debug!(%pattern, endpoint = provider.endpoint(), "Registering provider");
                self.bindings.push(Binding {
                    pattern,
                    matcher,
                    provider,
                });
            }
        }

        Ok(())
    }

    /// Remove the binding for `pattern`
    ///
    /// Removing a pattern that is not bound is an error, including a second
    /// removal of the same pattern.
    pub fn unregister(&mut self, pattern: &str) -> Result<Arc<dyn Provider>, RegistryError> {
        let index = self
            .bindings
            .iter()
            .position(|b| b.pattern == pattern)
            .ok_or_else(|| RegistryError::PatternNotRegistered(pattern.to_string()))?;

        Ok(self.bindings.remove(index).provider)
    }

    /// Provider of the most recently registered pattern matching `url`
    pub fn provider_for(&self, url: &str) -> Option<Arc<dyn Provider>> {
        self.bindings
            .iter()
            .rev()
            .find(|b| b.matcher.is_match(url))
            .map(|b| b.provider.clone())
    }

    pub fn has_pattern(&self, pattern: &str) -> bool {
        self.bindings.iter().any(|b| b.pattern == pattern)
    }

    /// Patterns in registration order
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.bindings.iter().map(|b| b.pattern.as_str())
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Resolve `url` through its provider, consulting the cache first
    ///
    /// A cache hit never reaches the provider. Only successful responses are
    /// cached.
    pub async fn request(&self, url: &str, params: &Params) -> Result<Metadata, ProviderError> {
        self.metrics.lookup();

        let Some(cache) = &self.cache else {
            return self.request_provider(url, params).await;
        };
        let key = make_key(url, params);
        if let Some(metadata) = cached(cache.as_ref(), &key) {
            debug!(url, "Cache hit");
            self.metrics.cache_hit();
            return Ok(metadata);
        }

        let lock = self.in_flight.entry(key.clone()).or_default().clone();
        let guard = lock.lock().await;

        // Filled by a concurrent request while waiting for the lock
        let result = match cached(cache.as_ref(), &key) {
            Some(metadata) => {
                debug!(url, "Cache hit after wait");
                self.metrics.cache_hit();
                Ok(metadata)
            }
            None => {
                self.metrics.cache_miss();
                let result = self.request_provider(url, params).await;
                if let Ok(metadata) = &result {
                    cache.set(&key, metadata.clone().into_value());
                }
                result
            }
        };

        drop(guard);
        drop(lock);
        self.in_flight
            .remove_if(&key, |_, lock| Arc::strong_count(lock) == 1);

        result
    }

    async fn request_provider(&self, url: &str, params: &Params) -> Result<Metadata, ProviderError> {
        let Some(provider) = self.provider_for(url) else {
            self.metrics.unresolved();
            return Err(ProviderError::NotFound(url.to_string()));
        };

        provider.request(url, params).await.inspect_err(|_| {
            self.metrics.fetch_failed();
        })
    }
}

/// Cached metadata under `key`; an empty object counts as a miss
fn cached(cache: &dyn Cache, key: &str) -> Option<Metadata> {
    cache
        .get(key)
        .and_then(Metadata::from_value)
        .filter(|m| !m.as_map().is_empty())
}
