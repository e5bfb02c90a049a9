//! Wiring from [`Config`] to a ready registry and render options

use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::cache::{Cache, CacheError, FjallCache, MemoryCache};
use crate::config::{BootstrapSource, CacheBackend, Config};
use crate::fetch::{FetchError, Fetcher, HttpFetcher};
use crate::parsers::{self, DocumentKind, Extraction, RenderOptions, RewriteError};
use crate::providers::{
    BootstrapError, BootstrapOptions, EndpointProvider, GoogleMapsProvider, ImageProvider,
    ProviderRegistry, RegistryError, bootstrap_basic, bootstrap_embedly, bootstrap_noembed,
    bootstrap_oembed,
};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("HTTP client error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Bootstrap failed: {0}")]
    Bootstrap(#[from] BootstrapError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Rewrite(#[from] RewriteError),
}

/// Registry plus render defaults built from configuration
pub struct App {
    pub registry: ProviderRegistry,
    pub options: RenderOptions,
}

impl App {
    /// Build with the reqwest-backed fetcher
    pub async fn from_config(config: &Config) -> Result<Self, AppError> {
        let fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::new()?);
        Self::with_fetcher(config, fetcher).await
    }

    pub async fn with_fetcher(config: &Config, fetcher: Arc<dyn Fetcher>) -> Result<Self, AppError> {
        let registry = build_registry(config, fetcher).await?;
        Ok(Self {
            registry,
            options: config.render.to_options(),
        })
    }

    pub async fn rewrite(&self, document: &str, kind: DocumentKind) -> Result<String, AppError> {
        Ok(parsers::rewrite(document, &self.registry, kind, &self.options).await?)
    }

    pub async fn extract(&self, document: &str, kind: DocumentKind) -> Result<Extraction, AppError> {
        Ok(parsers::extract_all(document, &self.registry, kind, &self.options.params).await?)
    }
}

pub fn open_cache(config: &Config) -> Result<Option<Arc<dyn Cache>>, AppError> {
    let cache: Option<Arc<dyn Cache>> = match config.cache.backend {
        CacheBackend::None => None,
        CacheBackend::Memory => Some(Arc::new(MemoryCache::new())),
        CacheBackend::Fjall => Some(Arc::new(FjallCache::open(&config.cache.path)?)),
    };
    Ok(cache)
}

/// Bootstrap the configured table, then add contrib and custom providers
///
/// Custom providers are registered last so their patterns take precedence.
pub async fn build_registry(
    config: &Config,
    fetcher: Arc<dyn Fetcher>,
) -> Result<ProviderRegistry, AppError> {
    let mut registry = ProviderRegistry::new();
    registry.set_cache(open_cache(config)?);

    let mut options = BootstrapOptions::new(fetcher.clone());
    options.http = config.http.to_http_config();
    options.params = config.providers.params.clone();
    options.refresh = config.providers.refresh;

    match config.providers.bootstrap {
        BootstrapSource::Basic => bootstrap_basic(&mut registry, &options)?,
        BootstrapSource::Oembed => {
            bootstrap_oembed(&mut registry, &options).await?;
        }
        BootstrapSource::Noembed => {
            bootstrap_noembed(&mut registry, &options).await?;
        }
        BootstrapSource::Embedly => {
            bootstrap_embedly(&mut registry, &options).await?;
        }
        BootstrapSource::None => {}
    }

    if config.providers.contrib {
        registry.register(ImageProvider::PATTERN, Arc::new(ImageProvider))?;
        registry.register(GoogleMapsProvider::PATTERN, Arc::new(GoogleMapsProvider))?;
    }

    for custom in &config.providers.custom {
        let provider = EndpointProvider::new(&custom.endpoint, fetcher.clone())
            .with_http(options.http.clone())
            .with_params(&options.params);
        registry.register(custom.pattern.as_str(), Arc::new(provider))?;
    }

    info!(
        providers = registry.len(),
        bootstrap = ?config.providers.bootstrap,
        "Provider registry ready"
    );
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CustomProvider;
    use crate::fetch::StaticFetcher;
    use serde_json::json;
    use tempfile::TempDir;

    fn custom_config() -> Config {
        let mut config = Config::default();
        config.providers.bootstrap = BootstrapSource::None;
        config.providers.custom.push(CustomProvider {
            pattern: r"http://media\.example/\S+".to_string(),
            endpoint: "http://media.example/oembed".to_string(),
        });
        config
    }

    fn media_fetcher() -> Arc<StaticFetcher> {
        Arc::new(StaticFetcher::new().with_response(
            "http://media.example/oembed?format=json&url=http%3A%2F%2Fmedia.example%2F1",
            json!({"title": "one", "type": "video", "html": "<video>1</video>"}).to_string(),
        ))
    }

    #[tokio::test]
    async fn test_basic_bootstrap_from_defaults() {
        let fetcher = Arc::new(StaticFetcher::new());
        let registry = build_registry(&Config::default(), fetcher.clone()).await.unwrap();

        assert!(!registry.is_empty());
        assert!(registry.provider_for("https://www.youtube.com/watch?v=abc").is_some());
        assert!(registry.cache().is_some());
        assert_eq!(fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn test_custom_providers_and_rewrite() {
        let app = App::with_fetcher(&custom_config(), media_fetcher()).await.unwrap();
        assert_eq!(app.registry.len(), 1);

        let output = app
            .rewrite("http://media.example/1\nsee http://media.example/1", DocumentKind::Text)
            .await
            .unwrap();
        assert_eq!(
            output,
            "<video>1</video>\nsee <a href=\"http://media.example/1\" title=\"one\">one</a>"
        );
    }

    #[tokio::test]
    async fn test_contrib_providers() {
        let mut config = custom_config();
        config.providers.contrib = true;
        config.cache.backend = CacheBackend::None;

        let app = App::with_fetcher(&config, media_fetcher()).await.unwrap();
        assert_eq!(app.registry.len(), 3);
        assert!(app.registry.cache().is_none());

        let extraction = app
            .extract("http://img.example/cat.png", DocumentKind::Text)
            .await
            .unwrap();
        assert_eq!(
            extraction.get("http://img.example/cat.png").and_then(|m| m.media_type()),
            Some(crate::providers::MediaType::Photo)
        );
    }

    #[tokio::test]
    async fn test_fjall_cache_backend() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = custom_config();
        config.cache.backend = CacheBackend::Fjall;
        config.cache.path = temp_dir.path().join("cache");

        let fetcher = media_fetcher();
        let app = App::with_fetcher(&config, fetcher.clone()).await.unwrap();

        app.rewrite("http://media.example/1", DocumentKind::Text).await.unwrap();
        app.rewrite("http://media.example/1", DocumentKind::Text).await.unwrap();

        assert_eq!(fetcher.calls(), 1);
        assert_eq!(app.registry.metrics().snapshot().cache_hits, 1);
    }
}
