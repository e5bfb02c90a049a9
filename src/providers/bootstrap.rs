//! Registry bootstraps: a hand-maintained table and third-party directories
//!
//! Directory bootstraps fetch a provider directory once, optionally through
//! the registry's cache, and register one provider per discovered pattern.
//! Patterns the regex engine cannot compile are logged and skipped.

use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use super::endpoint::EndpointProvider;
use super::registry::{ProviderRegistry, RegistryError};
use super::types::Params;
use crate::fetch::{FetchError, Fetcher, HttpConfig};

pub const OEMBED_DIRECTORY_URL: &str = "https://oembed.com/providers.json";
pub const NOEMBED_DIRECTORY_URL: &str = "http://noembed.com/providers";
pub const NOEMBED_ENDPOINT: &str = "http://noembed.com/embed";
pub const EMBEDLY_DIRECTORY_URL: &str = "http://api.embed.ly/1/services/python";
pub const EMBEDLY_ENDPOINT: &str = "http://api.embed.ly/1/oembed";

const YOUTUBE_HTTP: &str = r"http://(\S*\.)?youtu(\.be/|be\.com/watch)\S+";
const YOUTUBE_HTTPS: &str = r"https://(\S*\.)?youtu(\.be/|be\.com/watch)\S+";

/// Well-known (pattern, endpoint) pairs, complements of oembed.com
const BASIC_PROVIDERS: &[(&str, &str)] = &[
    (r"http://chirb\.it/\S+", "http://chirb.it/oembed.json"),
    (r"https?://www\.circuitlab\.com/circuit/\S+", "https://www.circuitlab.com/circuit/oembed"),
    (r"https?://(?:www\.)?dailymotion\.com/\S+", "http://www.dailymotion.com/services/oembed"),
    (r"https?://\S*?flickr\.com/\S+", "https://www.flickr.com/services/oembed/"),
    (r"https?://flic\.kr/\S*", "https://www.flickr.com/services/oembed/"),
    (r"https?://(?:www\.)?funnyordie\.com/videos/\S+", "http://www.funnyordie.com/oembed"),
    (r"http://(?:www\.)hulu\.com/watch/\S+", "http://www.hulu.com/api/oembed.json"),
    (r"https?://\S*imgur\.com/\S+", "https://api.imgur.com/oembed"),
    (r"https?://(www\.)?instagr(\.am|am\.com)/p/\S+", "http://api.instagram.com/oembed"),
    (r"http://www\.mobypicture\.com/user/\S*?/view/\S*", "http://api.mobypicture.com/oEmbed"),
    (r"http://moby\.to/\S*", "http://api.mobypicture.com/oEmbed"),
    (r"http://i\S*\.photobucket\.com/albums/\S+", "http://photobucket.com/oembed"),
    (r"http://gi\S*\.photobucket\.com/groups/\S+", "http://photobucket.com/oembed"),
    (
        r"http://www\.polleverywhere\.com/(polls|multiple_choice_polls|free_text_polls)/\S+",
        "http://www.polleverywhere.com/services/oembed/",
    ),
    (r"https?://(.+\.)?polldaddy\.com/\S*", "http://polldaddy.com/oembed/"),
    (r"https?://(?:www\.)?slideshare\.net/[^/]+/\S+", "http://www.slideshare.net/api/oembed/2"),
    (r"https?://slidesha\.re/\S*", "http://www.slideshare.net/api/oembed/2"),
    (r"http://\S*\.smugmug\.com/\S*", "http://api.smugmug.com/services/oembed/"),
    (r"https://\S*?soundcloud\.com/\S+", "http://soundcloud.com/oembed"),
    (r"https?://speakerdeck\.com/\S*", "https://speakerdeck.com/oembed.json"),
    (r"https?://(?:www\.)?scribd\.com/\S*", "http://www.scribd.com/services/oembed"),
    (r"https?://(www\.)tiktok\.com/\S+", "https://www.tiktok.com/oembed"),
    (r"https?://(www\.)?twitter\.com/\S+/status(es)?/\S+", "https://publish.twitter.com/oembed"),
    (r"http://(?:player\.)?vimeo\.com/\S+", "http://vimeo.com/api/oembed.json"),
    (r"https://(?:player\.)?vimeo\.com/\S+", "https://vimeo.com/api/oembed.json"),
    (r"http://\S+\.wordpress\.com/\S+", "http://public-api.wordpress.com/oembed/"),
    (r"https?://wordpress\.tv/\S+", "http://wordpress.tv/oembed/"),
    (YOUTUBE_HTTP, "https://www.youtube.com/oembed"),
    (YOUTUBE_HTTPS, "https://www.youtube.com/oembed?scheme=https&"),
];

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("failed to fetch provider directory {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: FetchError,
    },
    #[error("failed to decode provider directory {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Shared settings for building bootstrapped providers
#[derive(Clone)]
pub struct BootstrapOptions {
    pub fetcher: Arc<dyn Fetcher>,
    pub http: HttpConfig,
    /// Base parameters added to every provider (e.g. an embedly `key`)
    pub params: Params,
    /// Ignore a cached copy of the directory document
    pub refresh: bool,
}

impl BootstrapOptions {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            fetcher,
            http: HttpConfig::default(),
            params: Params::new(),
            refresh: false,
        }
    }

    fn provider(&self, endpoint: &str) -> Arc<EndpointProvider> {
        Arc::new(
            EndpointProvider::new(endpoint, self.fetcher.clone())
                .with_http(self.http.clone())
                .with_params(&self.params),
        )
    }
}

/// Register the hand-maintained provider table
pub fn bootstrap_basic(
    registry: &mut ProviderRegistry,
    options: &BootstrapOptions,
) -> Result<(), RegistryError> {
    for (pattern, endpoint) in BASIC_PROVIDERS {
        registry.register(*pattern, options.provider(endpoint))?;
    }
    info!(count = BASIC_PROVIDERS.len(), "Registered basic providers");
    Ok(())
}

#[derive(Debug, Deserialize)]
struct OEmbedEntry {
    #[serde(default)]
    endpoints: Vec<OEmbedEndpoint>,
}

#[derive(Debug, Deserialize)]
struct OEmbedEndpoint {
    url: String,
    schemes: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct NoembedEntry {
    #[serde(default)]
    patterns: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct EmbedlyEntry {
    #[serde(default)]
    regex: Vec<String>,
}

/// Turn an oembed.com URL scheme (`https://*.example.com/v/*`) into a pattern
pub fn scheme_to_pattern(scheme: &str) -> String {
    scheme.replace('?', r"\?").replace('*', r"[^/\s?&]+?")
}

/// Register every provider listed by oembed.com
///
/// Endpoints without `schemes` only support discovery and are skipped.
/// YouTube is appended last since the directory does not list its schemes.
pub async fn bootstrap_oembed(
    registry: &mut ProviderRegistry,
    options: &BootstrapOptions,
) -> Result<usize, BootstrapError> {
    let entries: Vec<OEmbedEntry> = fetch_directory(registry, options, OEMBED_DIRECTORY_URL).await?;

    let mut count = 0;
    for entry in &entries {
        for endpoint in entry.endpoints.iter().rev() {
            let Some(schemes) = &endpoint.schemes else {
                continue;
            };

            let provider = options.provider(&endpoint.url.replace("{format}", "json"));
            for scheme in schemes {
                let pattern = scheme_to_pattern(scheme);
                match registry.register(pattern, provider.clone()) {
                    Ok(()) => count += 1,
                    Err(e) => warn!(endpoint = %endpoint.url, error = %e, "Skipping provider pattern"),
                }
            }
        }
    }

    let youtube = options.provider("https://www.youtube.com/oembed");
    registry.register(YOUTUBE_HTTP, youtube)?;
    let youtube_https = options.provider("https://www.youtube.com/oembed?scheme=https&");
    registry.register(YOUTUBE_HTTPS, youtube_https)?;
    count += 2;

    info!(count, "Registered oembed.com providers");
    Ok(count)
}

/// Register every pattern listed by noembed, all served by its endpoint
pub async fn bootstrap_noembed(
    registry: &mut ProviderRegistry,
    options: &BootstrapOptions,
) -> Result<usize, BootstrapError> {
    let entries: Vec<NoembedEntry> =
        fetch_directory(registry, options, NOEMBED_DIRECTORY_URL).await?;
    let patterns = entries.into_iter().flat_map(|e| e.patterns);
    let count = register_all(registry, options.provider(NOEMBED_ENDPOINT), patterns);

    info!(count, "Registered noembed providers");
    Ok(count)
}

/// Register every pattern listed by embedly, all served by its endpoint
pub async fn bootstrap_embedly(
    registry: &mut ProviderRegistry,
    options: &BootstrapOptions,
) -> Result<usize, BootstrapError> {
    let entries: Vec<EmbedlyEntry> =
        fetch_directory(registry, options, EMBEDLY_DIRECTORY_URL).await?;
    let patterns = entries.into_iter().flat_map(|e| e.regex);
    let count = register_all(registry, options.provider(EMBEDLY_ENDPOINT), patterns);

    info!(count, "Registered embedly providers");
    Ok(count)
}

fn register_all(
    registry: &mut ProviderRegistry,
    provider: Arc<EndpointProvider>,
    patterns: impl Iterator<Item = String>,
) -> usize {
    let mut count = 0;
    for pattern in patterns {
        match registry.register(pattern, provider.clone()) {
            Ok(()) => count += 1,
            Err(e) => warn!(error = %e, "Skipping provider pattern"),
        }
    }
    count
}

/// Fetch and decode a directory document, going through the registry cache
async fn fetch_directory<T>(
    registry: &ProviderRegistry,
    options: &BootstrapOptions,
    url: &str,
) -> Result<T, BootstrapError>
where
    T: serde::de::DeserializeOwned,
{
    let key = format!("linkembed.{url}");
    let cached = match (registry.cache(), options.refresh) {
        (Some(cache), false) => cache.get(&key).and_then(|v| match v {
            Value::String(contents) => Some(contents),
            _ => None,
        }),
        _ => None,
    };

    let contents = match cached {
        Some(contents) => contents,
        None => {
            info!(url, "Fetching provider directory");
            let contents = options
                .fetcher
                .fetch(url, &options.http)
                .await
                .map_err(|source| BootstrapError::Fetch {
                    url: url.to_string(),
                    source,
                })?;
            if let Some(cache) = registry.cache() {
                cache.set(&key, Value::String(contents.clone()));
            }
            contents
        }
    };

    serde_json::from_str(&contents).map_err(|source| BootstrapError::Decode {
        url: url.to_string(),
        source,
    })
}
