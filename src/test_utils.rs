//! Deterministic provider fixtures for unit tests

use serde_json::json;
use std::sync::Arc;

use crate::cache::Cache;
use crate::fetch::StaticFetcher;
use crate::providers::{EndpointProvider, ProviderRegistry};

pub fn fixture_fetcher() -> StaticFetcher {
    let responses = [
        ("link?format=json&url=http%3A%2F%2Flink-test1", json!({"title": "test1", "type": "link"})),
        ("link?format=json&url=http%3A%2F%2Flink-test2", json!({"title": "test2", "type": "link"})),
        (
            "photo?format=json&url=http%3A%2F%2Fphoto-test1",
            json!({"title": "ptest1", "url": "test1.jpg", "type": "photo"}),
        ),
        (
            "photo?format=json&url=http%3A%2F%2Fphoto-test2",
            json!({"title": "ptest2", "url": "test2.jpg", "type": "photo"}),
        ),
        (
            "video?format=json&url=http%3A%2F%2Fvideo-test1",
            json!({"title": "vtest1", "html": "<test1>video</test1>", "type": "video"}),
        ),
        (
            "video?format=json&url=http%3A%2F%2Fvideo-test2",
            json!({"title": "vtest2", "html": "<test2>video</test2>", "type": "video"}),
        ),
        (
            "rich?format=json&url=http%3A%2F%2Frich-test1",
            json!({"title": "rtest1", "html": "<test1>rich</test1>", "type": "rich"}),
        ),
        (
            "rich?format=json&url=http%3A%2F%2Frich-test2",
            json!({"title": "rtest2", "html": "<test2>rich</test2>", "type": "rich"}),
        ),
        (
            "link?format=json&url=http%3A%2F%2Flink-test1&width=100",
            json!({"title": "test1", "type": "link", "width": 99}),
        ),
        (
            "photo?format=json&url=http%3A%2F%2Fphoto-notitle",
            json!({"url": "notitle.jpg", "type": "photo"}),
        ),
    ];

    let fetcher = StaticFetcher::new();
    for (url, body) in responses {
        fetcher.insert(url, body.to_string());
    }
    fetcher
}

/// Registry with `link`, `photo`, `video` and `rich` test endpoints
pub fn fixture_registry(cache: Option<Arc<dyn Cache>>) -> ProviderRegistry {
    let fetcher = Arc::new(fixture_fetcher());
    let mut registry = ProviderRegistry::new();
    registry.set_cache(cache);

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
