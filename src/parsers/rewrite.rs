use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::extract::extract;
use super::handlers::{FullHandler, Handler, InlineHandler, urlize};
use super::matcher::{find_spans, standalone_url};
use crate::providers::{Params, ProviderRegistry};

/// Named built-in handler, as selected from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HandlerMode {
    #[default]
    Full,
    Inline,
}

impl HandlerMode {
    pub fn handler(self) -> Arc<dyn Handler> {
        match self {
            HandlerMode::Full => Arc::new(FullHandler),
            HandlerMode::Inline => Arc::new(InlineHandler),
        }
    }
}

/// Rendering settings for one rewrite
///
/// `handler` renders standalone URLs; `block_handler` renders URLs embedded
/// in surrounding text (inline URLs are left untouched when it is `None`).
/// With `urlize_all`, URLs without metadata still become plain anchors
/// carrying `urlize_attributes`. `params` is forwarded to every provider
/// request and handler.
#[derive(Clone)]
pub struct RenderOptions {
    pub handler: Arc<dyn Handler>,
    pub block_handler: Option<Arc<dyn Handler>>,
    pub urlize_all: bool,
    pub urlize_attributes: Params,
    pub params: Params,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            handler: Arc::new(FullHandler),
            block_handler: Some(Arc::new(InlineHandler)),
            urlize_all: true,
            urlize_attributes: Params::new(),
            params: Params::new(),
        }
    }
}

impl RenderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_handler(mut self, handler: Arc<dyn Handler>) -> Self {
        self.handler = handler;
        self
    }

    pub fn with_block_handler(mut self, handler: Option<Arc<dyn Handler>>) -> Self {
        self.block_handler = handler;
        self
    }

    pub fn with_urlize_all(mut self, urlize_all: bool) -> Self {
        self.urlize_all = urlize_all;
        self
    }

    pub fn with_urlize_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.urlize_attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

impl fmt::Debug for RenderOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderOptions")
            .field("block_handler", &self.block_handler.is_some())
            .field("urlize_all", &self.urlize_all)
            .field("urlize_attributes", &self.urlize_attributes)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// Replace every occurrence of a URL that has a replacement, left to right
///
/// Replacements differ in length from the URLs they replace, so after each
/// splice all pending spans are shifted by the length difference.
pub(crate) fn splice(text: &str, replacements: &HashMap<String, String>) -> String {
    let mut spans: Vec<_> = find_spans(text)
        .into_iter()
        .filter(|span| replacements.contains_key(&span.url))
        .collect();

    let mut buffer = text.to_string();
    for index in 0..spans.len() {
        let (start, end) = (spans[index].start, spans[index].end);
        let Some(replacement) = replacements.get(&spans[index].url) else {
            continue;
        };

        buffer.replace_range(start..end, replacement);

        let delta = replacement.len() as isize - (end - start) as isize;
        for pending in &mut spans[index + 1..] {
            pending.start = pending.start.saturating_add_signed(delta);
            pending.end = pending.end.saturating_add_signed(delta);
        }
    }

    buffer
}

/// Rewrite every URL in `text` with `handler`, without line splitting
///
/// Resolved URLs are rendered by `handler`; unresolved ones are urlized
/// when `urlize_all` is set and left alone otherwise.
pub async fn rewrite_line(
    text: &str,
    registry: &ProviderRegistry,
    handler: &dyn Handler,
    options: &RenderOptions,
) -> String {
    let extraction = extract(text, registry, &options.params).await;
    if extraction.is_empty() {
        return text.to_string();
    }

    let mut replacements = HashMap::new();
    for url in &extraction.urls {
        if let Some(metadata) = extraction.get(url) {
            replacements.insert(url.clone(), handler.render(url, metadata, &options.params));
        } else if options.urlize_all {
            replacements.insert(url.clone(), urlize(url, &options.urlize_attributes));
        }
    }

    splice(text, &replacements)
}

/// Rewrite every URL in `text` with the full handler, inline or not
pub async fn parse_text_full(
    text: &str,
    registry: &ProviderRegistry,
    options: &RenderOptions,
) -> String {
    rewrite_line(text, registry, options.handler.as_ref(), options).await
}

/// Rewrite plain text line by line
///
/// A line holding nothing but one URL is replaced by the full rendering of
/// that URL. URLs inside other lines go through the block handler. Line
/// terminators are preserved as found.
pub async fn parse_text(text: &str, registry: &ProviderRegistry, options: &RenderOptions) -> String {
    let mut output = String::with_capacity(text.len());

    for raw in text.split_inclusive('\n') {
        let (line, terminator) = split_terminator(raw);

        if let Some(url) = standalone_url(line) {
            match registry.request(url, &options.params).await {
                Ok(metadata) => output.push_str(&options.handler.render(url, &metadata, &options.params)),
                Err(_) if options.urlize_all => {
                    output.push_str(&urlize(url, &options.urlize_attributes))
                }
                Err(_) => output.push_str(line),
            }
        } else if let Some(block_handler) = &options.block_handler {
            output.push_str(&rewrite_line(line, registry, block_handler.as_ref(), options).await);
        } else {
            output.push_str(line);
        }

        output.push_str(terminator);
    }

    output
}

fn split_terminator(raw: &str) -> (&str, &str) {
    if let Some(line) = raw.strip_suffix("\r\n") {
        (line, "\r\n")
    } else if let Some(line) = raw.strip_suffix('\n') {
        (line, "\n")
    } else {
        (raw, "")
    }
}
