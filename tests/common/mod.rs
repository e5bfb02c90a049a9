//! Shared fixtures for integration tests

use linkembed::fetch::StaticFetcher;
use linkembed::providers::{EndpointProvider, ProviderRegistry};
use serde_json::json;
use std::sync::Arc;

/// Responses of the `link`, `photo`, `video` and `rich` test endpoints
pub fn fixture_fetcher() -> Arc<StaticFetcher> {
    let fetcher = StaticFetcher::new();
    for (kind, id, body) in [
        ("link", "test1", json!({"title": "test1", "type": "link"})),
        ("link", "test2", json!({"title": "test2", "type": "link"})),
        ("photo", "test1", json!({"title": "ptest1", "url": "test1.jpg", "type": "photo"})),
        ("photo", "test2", json!({"title": "ptest2", "url": "test2.jpg", "type": "photo"})),
        ("video", "test1", json!({"title": "vtest1", "html": "<test1>video</test1>", "type": "video"})),
        ("video", "test2", json!({"title": "vtest2", "html": "<test2>video</test2>", "type": "video"})),
        ("rich", "test1", json!({"title": "rtest1", "html": "<test1>rich</test1>", "type": "rich"})),
        ("rich", "test2", json!({"title": "rtest2", "html": "<test2>rich</test2>", "type": "rich"})),
    ] {
        fetcher.insert(
            format!("{kind}?format=json&url=http%3A%2F%2F{kind}-{id}"),
            body.to_string(),
        );
    }
    Arc::new(fetcher)
}

pub fn fixture_registry(fetcher: Arc<StaticFetcher>) -> ProviderRegistry {
    let mut registry = ProviderRegistry::new();
    for kind in ["link", "photo", "video", "rich"] {
        registry
            .register(
                format!(r"http://{kind}\S*"),
                Arc::new(EndpointProvider::new(kind, fetcher.clone())),
            )
            .unwrap();
    }
    registry
}
