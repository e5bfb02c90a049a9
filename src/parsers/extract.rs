use std::collections::{BTreeMap, HashSet};
use tracing::debug;

use super::matcher::find_urls;
use crate::providers::{Metadata, Params, ProviderRegistry};

/// Distinct URLs found in a document and the metadata of those that resolved
///
/// `urls` keeps first-seen order. A URL may be listed without an entry in
/// `resolved` when no provider matched or the provider failed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    pub urls: Vec<String>,
    pub resolved: BTreeMap<String, Metadata>,
}

impl Extraction {
    pub fn get(&self, url: &str) -> Option<&Metadata> {
        self.resolved.get(url)
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn into_parts(self) -> (Vec<String>, BTreeMap<String, Metadata>) {
        (self.urls, self.resolved)
    }

    /// Append URLs from `other` not already listed, with their metadata
    pub fn merge(&mut self, other: Extraction) {
        self.merge_all([other]);
    }

    /// [`merge`](Self::merge) each of `others` in order
    pub fn merge_all(&mut self, others: impl IntoIterator<Item = Extraction>) {
        let mut seen: HashSet<String> = self.urls.iter().cloned().collect();

        for Extraction { urls, mut resolved } in others {
            for url in urls {
                if !seen.insert(url.clone()) {
                    continue;
                }
                if let Some(metadata) = resolved.remove(&url) {
                    self.resolved.insert(url.clone(), metadata);
                }
                self.urls.push(url);
            }
        }
    }
}

/// Find every distinct URL in `text` and resolve each once through `registry`
pub async fn extract(text: &str, registry: &ProviderRegistry, params: &Params) -> Extraction {
    let mut seen = HashSet::new();
    let mut extraction = Extraction::default();

    for url in find_urls(text) {
        if !seen.insert(url) {
            continue;
        }
        extraction.urls.push(url.to_string());

        match registry.request(url, params).await {
            Ok(metadata) => {
                extraction.resolved.insert(url.to_string(), metadata);
            }
            Err(e) => debug!(url, error = %e, "URL left unresolved"),
        }
    }

    extraction
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::fixture_registry;
    use serde_json::json;

    #[tokio::test]
    async fn test_extract_first_seen_order() {
        let registry = fixture_registry(None);
        let blank = "http://fapp.io/foo/";
        let text = format!("test http://link-test1\n{blank}\nhttp://link-test1\n{blank} at last");

        let extraction = extract(&text, &registry, &Params::new()).await;

        assert_eq!(extraction.urls, vec!["http://link-test1", blank]);
        assert_eq!(extraction.resolved.len(), 1);
        assert_eq!(
            extraction.get("http://link-test1").cloned().map(Metadata::into_value),
            Some(json!({"title": "test1", "type": "link", "url": "http://link-test1"}))
        );
        assert!(extraction.get(blank).is_none());
    }

    #[tokio::test]
    async fn test_extract_resolves_each_url_once() {
        let registry = fixture_registry(None);
        let text = "http://photo-notitle http://photo-notitle http://photo-notitle";

        let extraction = extract(text, &registry, &Params::new()).await;

        assert_eq!(extraction.urls.len(), 1);
        assert_eq!(registry.metrics().snapshot().lookups, 1);
        assert_eq!(
            extraction.get("http://photo-notitle").cloned().map(Metadata::into_value),
            Some(json!({"url": "notitle.jpg", "title": "notitle.jpg", "type": "photo"}))
        );
    }

    #[test]
    fn test_merge_keeps_first_occurrence() {
        let mut first = Extraction {
            urls: vec!["http://a".to_string()],
            resolved: BTreeMap::new(),
        };
        let mut metadata = Metadata::new();
        metadata.insert("title", "b");
        let second = Extraction {
            urls: vec!["http://a".to_string(), "http://b".to_string()],
            resolved: [("http://b".to_string(), metadata)].into(),
        };

        first.merge(second);
        assert_eq!(first.urls, vec!["http://a", "http://b"]);
        assert_eq!(first.get("http://b").map(Metadata::title).as_deref(), Some("b"));
    }

    #[test]
    fn test_merge_all_dedups_across_parts() {
        let part = |urls: &[&str]| Extraction {
            urls: urls.iter().map(|url| url.to_string()).collect(),
            resolved: urls
                .iter()
                .map(|url| {
                    let mut metadata = Metadata::new();
                    metadata.insert("title", *url);
                    (url.to_string(), metadata)
                })
                .collect(),
        };

        let mut extraction = part(&["http://a"]);
        extraction.merge_all([
            part(&["http://b", "http://a"]),
            part(&["http://c", "http://b"]),
            part(&["http://a", "http://d"]),
        ]);

        assert_eq!(extraction.urls, vec!["http://a", "http://b", "http://c", "http://d"]);
        assert_eq!(extraction.resolved.len(), 4);
        assert_eq!(extraction.get("http://a").map(Metadata::title).as_deref(), Some("http://a"));
    }
}
