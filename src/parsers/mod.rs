//! URL discovery and rewriting
//!
//! Text is scanned for URLs, each distinct URL is resolved once through a
//! [`ProviderRegistry`], and the rendered markup is spliced back into the
//! document.
//!
//! ## Key Components
//!
//! - [`matcher`] - URL recognition and standalone detection
//! - [`Handler`] - Renders a resolved URL ([`FullHandler`], [`InlineHandler`])
//! - [`extract`] - Distinct URLs and their metadata
//! - [`parse_text`] / [`parse_text_full`] - Plain text rewriting
//! - `parse_html` / `extract_html` - HTML rewriting (feature `html`)
//!
//! ## Example
//!
//! ```rust,ignore
//! use linkembed::parsers::{DocumentKind, RenderOptions, rewrite};
//!
//! let html = rewrite(text, &registry, DocumentKind::Text, &RenderOptions::default()).await?;
//! ```

mod extract;
mod handlers;
#[cfg(feature = "html")]
mod html;
pub mod matcher;
mod rewrite;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::providers::{Params, ProviderRegistry};

pub use extract::{Extraction, extract};
pub use handlers::{FullHandler, Handler, InlineHandler, urlize};
#[cfg(feature = "html")]
pub use html::{BLOCK_ELEMENTS, SKIP_ELEMENTS, extract_html, parse_html};
pub use matcher::{MatchSpan, URL_PATTERN};
pub use rewrite::{HandlerMode, RenderOptions, parse_text, parse_text_full, rewrite_line};

#[derive(Error, Debug)]
pub enum RewriteError {
    #[error("HTML documents are not supported without the `html` feature")]
    UnsupportedDocument,
}

/// How the input document should be interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    #[default]
    Text,
    Html,
}

/// Rewrite a document of the given kind
pub async fn rewrite(
    document: &str,
    registry: &ProviderRegistry,
    kind: DocumentKind,
    options: &RenderOptions,
) -> Result<String, RewriteError> {
    match kind {
        DocumentKind::Text => Ok(parse_text(document, registry, options).await),
        #[cfg(feature = "html")]
        DocumentKind::Html => Ok(parse_html(document, registry, options).await),
        #[cfg(not(feature = "html"))]
        DocumentKind::Html => Err(RewriteError::UnsupportedDocument),
    }
}

/// Distinct URLs of a document of the given kind with their metadata
pub async fn extract_all(
    document: &str,
    registry: &ProviderRegistry,
    kind: DocumentKind,
    params: &Params,
) -> Result<Extraction, RewriteError> {
    match kind {
        DocumentKind::Text => Ok(extract(document, registry, params).await),
        #[cfg(feature = "html")]
        DocumentKind::Html => Ok(extract_html(document, registry, params).await),
        #[cfg(not(feature = "html"))]
        DocumentKind::Html => Err(RewriteError::UnsupportedDocument),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::fixture_registry;

    #[tokio::test]
    async fn test_rewrite_text() {
        let registry = fixture_registry(None);
        let output = rewrite(
            "http://video-test1",
            &registry,
            DocumentKind::Text,
            &RenderOptions::default(),
        )
        .await
        .unwrap();
        assert_eq!(output, "<test1>video</test1>");
    }

    #[cfg(feature = "html")]
    #[tokio::test]
    async fn test_rewrite_html() {
        let registry = fixture_registry(None);
        let output = rewrite(
            "<p>http://video-test1</p>",
            &registry,
            DocumentKind::Html,
            &RenderOptions::default(),
        )
        .await
        .unwrap();
        assert_eq!(output, "<p><test1>video</test1></p>");
    }

    #[cfg(not(feature = "html"))]
    #[tokio::test]
    async fn test_html_unsupported() {
        let registry = fixture_registry(None);
        let result = rewrite("<p></p>", &registry, DocumentKind::Html, &RenderOptions::default()).await;
        assert!(matches!(result, Err(RewriteError::UnsupportedDocument)));
    }

    #[tokio::test]
    async fn test_extract_all_text() {
        let registry = fixture_registry(None);
        let extraction = extract_all(
            "http://link-test1 http://nothing.example",
            &registry,
            DocumentKind::Text,
            &Params::new(),
        )
        .await
        .unwrap();
        assert_eq!(extraction.urls, vec!["http://link-test1", "http://nothing.example"]);
        assert_eq!(extraction.resolved.len(), 1);
    }
}
