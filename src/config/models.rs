use crate::fetch::{HttpConfig, default_user_agent};
use crate::humanize::HumanDuration;
use crate::parsers::{Handler, HandlerMode, RenderOptions};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub http: HttpSettings,
    #[serde(default)]
    pub render: RenderSettings,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Provider endpoint request settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpSettings {
    #[serde(default = "default_timeout")]
    pub timeout: HumanDuration,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl HttpSettings {
    pub fn to_http_config(&self) -> HttpConfig {
        HttpConfig {
            timeout: self.timeout.as_duration(),
            user_agent: self.user_agent.clone(),
        }
    }
}

fn default_timeout() -> HumanDuration {
    HumanDuration::from_secs(3)
}

/// Handler used for URLs embedded among other text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockHandlerMode {
    #[default]
    Inline,
    Full,
    None,
}

impl BlockHandlerMode {
    pub fn handler(self) -> Option<Arc<dyn Handler>> {
        match self {
            BlockHandlerMode::Inline => Some(HandlerMode::Inline.handler()),
            BlockHandlerMode::Full => Some(HandlerMode::Full.handler()),
            BlockHandlerMode::None => None,
        }
    }
}

/// Rendering defaults
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RenderSettings {
    #[serde(default = "default_true")]
    pub urlize_all: bool,
    #[serde(default)]
    pub handler: HandlerMode,
    #[serde(default)]
    pub block_handler: BlockHandlerMode,
    /// Extra attributes on urlized anchors (e.g. `rel = "nofollow"`)
    #[serde(default)]
    pub urlize_attributes: BTreeMap<String, String>,
    /// Extra query parameters sent to every provider (e.g. `maxwidth`)
    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            urlize_all: true,
            handler: HandlerMode::default(),
            block_handler: BlockHandlerMode::default(),
            urlize_attributes: BTreeMap::new(),
            params: BTreeMap::new(),
        }
    }
}

impl RenderSettings {
    pub fn to_options(&self) -> RenderOptions {
        RenderOptions {
            handler: self.handler.handler(),
            block_handler: self.block_handler.handler(),
            urlize_all: self.urlize_all,
            urlize_attributes: self.urlize_attributes.clone(),
            params: self.params.clone(),
        }
    }
}

fn default_true() -> bool {
    true
}

/// Initial provider table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BootstrapSource {
    #[default]
    Basic,
    Oembed,
    Noembed,
    Embedly,
    None,
}

/// Provider registered on top of the bootstrapped table
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CustomProvider {
    pub pattern: String,
    pub endpoint: String,
}

/// Provider registry configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub bootstrap: BootstrapSource,
    /// Refetch directory documents instead of using a cached copy
    #[serde(default)]
    pub refresh: bool,
    /// Base parameters of bootstrapped providers (e.g. the embedly `key`)
    #[serde(default)]
    pub params: BTreeMap<String, String>,
    /// Also register the built-in image and Google Maps providers
    #[serde(default)]
    pub contrib: bool,
    #[serde(default)]
    pub custom: Vec<CustomProvider>,
}

/// Cache backend type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    None,
    #[default]
    Memory,
    Fjall,
}

/// Response cache configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    #[serde(default)]
    pub backend: CacheBackend,
    #[serde(default = "default_cache_path")]
    pub path: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::default(),
            path: default_cache_path(),
        }
    }
}

fn default_cache_path() -> PathBuf {
    PathBuf::from("data/oembed-cache")
}
