//! Providers that build records locally instead of querying an endpoint

use async_trait::async_trait;
use regex::Regex;
use std::sync::LazyLock;

use super::traits::{Provider, ProviderError};
use super::types::{Metadata, Params};

/// Renders any image URL as a `photo` record pointing at itself
///
/// ```rust,ignore
/// registry.register(ImageProvider::PATTERN, Arc::new(ImageProvider))?;
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageProvider;

impl ImageProvider {
    pub const PATTERN: &'static str = r"http://.+?\.(jpg|gif|png)";
}

#[async_trait]
impl Provider for ImageProvider {
    fn endpoint(&self) -> &str {
        ""
    }

    async fn request(&self, url: &str, _params: &Params) -> Result<Metadata, ProviderError> {
        let mut metadata = Metadata::new();
        metadata
            .insert("url", url)
            .insert("type", "photo")
            .insert("title", "");
        Ok(metadata)
    }
}

static MAPS_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(GoogleMapsProvider::PATTERN).expect("maps pattern compiles")
});

/// Renders a Google Maps URL as an embedded map iframe
///
/// Only the `q` and `z` query parameters are carried over. The frame size
/// follows `maxwidth`/`maxheight`, defaulting to 640x480.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoogleMapsProvider;

impl GoogleMapsProvider {
    pub const PATTERN: &'static str = r"^https?://maps.google.com/maps\?([^\s]+)";
    const VALID_PARAMS: [&'static str; 2] = ["q", "z"];
}

fn dimension(params: &Params, key: &str, default: u32) -> Result<u32, ProviderError> {
    match params.get(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ProviderError::InvalidResponse(format!("invalid {key}: {value:?}"))),
        None => Ok(default),
    }
}

#[async_trait]
impl Provider for GoogleMapsProvider {
    fn endpoint(&self) -> &str {
        ""
    }

    async fn request(&self, url: &str, params: &Params) -> Result<Metadata, ProviderError> {
        let query = MAPS_URL
            .captures(url)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
            .ok_or_else(|| ProviderError::InvalidResponse(format!("not a maps URL: {url}")))?;

        let mut map_params = vec!["output=embed".to_string()];
        for pair in query.replace("&amp;", "&").split('&') {
            if let Some((key, _)) = pair.split_once('=') {
                if Self::VALID_PARAMS.contains(&key) {
                    map_params.push(pair.to_string());
                }
            }
        }

        let width = dimension(params, "maxwidth", 640)?;
        let height = dimension(params, "maxheight", 480)?;
        let html = format!(
            "<iframe width=\"{width}\" height=\"{height}\" frameborder=\"0\" scrolling=\"no\" \
             marginheight=\"0\" marginwidth=\"0\" src=\"http://maps.google.com/maps?{}\"></iframe>",
            map_params.join("&amp;")
        );

        let mut metadata = Metadata::new();
        metadata
            .insert("height", height)
            .insert("html", html)
            .insert("provider_name", "Google maps")
            .insert("title", "")
            .insert("type", "rich")
            .insert("version", "1.0")
            .insert("width", width);
        Ok(metadata)
    }
}
