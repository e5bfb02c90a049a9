//! Response caches shared by provider registries
//!
//! A cache maps a deterministic key to a previously decoded JSON document.
//! Registries store metadata records here; directory bootstraps store the raw
//! provider directory under a `linkembed.<url>` key. Eviction and TTL are left
//! to the backend.
//!
//! - [`MemoryCache`] - concurrent in-process map
//! - [`FjallCache`] - persistent cache on a fjall keyspace

mod persistent;

pub use persistent::{CacheError, FjallCache};

use dashmap::DashMap;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::providers::Params;

/// Cache collaborator
///
/// Implementations must tolerate concurrent `get`/`set` from many callers.
pub trait Cache: Send + Sync {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&self, key: &str, value: Value);
}

/// Cache key for a `(url, params)` request
///
/// `Params` iterates in key order, so the key does not depend on the order
/// the caller inserted parameters.
pub fn make_key(url: &str, params: &Params) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    for (key, value) in params {
        hasher.update([0u8]);
        hasher.update(key.as_bytes());
        hasher.update(b"=");
        hasher.update(value.as_bytes());
    }
    hex::encode(hasher.finalize())
}

/// In-memory cache without eviction
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: DashMap<String, Value>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}

impl Cache for MemoryCache {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    fn set(&self, key: &str, value: Value) {
        self.entries.insert(key.to_string(), value);
    }
}
