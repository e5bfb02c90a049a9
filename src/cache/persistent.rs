use std::path::Path;

use fjall::{Config, Keyspace, PartitionCreateOptions, PartitionHandle};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::Cache;

const PARTITION: &str = "oembed";

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Fjall error: {0}")]
    Fjall(#[from] fjall::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Fjall-backed persistent response cache
///
/// Read and write failures after opening are logged and degrade to a miss or
/// a dropped write, so a broken disk never fails a rewrite.
#[derive(Clone)]
pub struct FjallCache {
    keyspace: Keyspace,
    entries: PartitionHandle,
}

impl FjallCache {
    /// Open or create a cache at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, CacheError> {
        let path = path.as_ref();
        info!("Opening Fjall cache at: {}", path.display());

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let keyspace = Config::new(path).open()?;
        let entries = keyspace.open_partition(PARTITION, PartitionCreateOptions::default())?;

        Ok(Self { keyspace, entries })
    }

    fn try_get(&self, key: &str) -> Result<Option<Value>, CacheError> {
        match self.entries.get(key.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn try_set(&self, key: &str, value: &Value) -> Result<(), CacheError> {
        let bytes = serde_json::to_vec(value)?;
        self.entries.insert(key.as_bytes(), bytes)?;
        Ok(())
    }

    /// Persist all pending writes to disk
    pub fn persist(&self) -> Result<(), CacheError> {
        self.keyspace.persist(fjall::PersistMode::SyncAll)?;
        Ok(())
    }

    pub fn len(&self) -> Result<usize, CacheError> {
        let mut count = 0;
        for item in self.entries.iter() {
            item?;
            count += 1;
        }
        Ok(count)
    }
}

impl Cache for FjallCache {
    fn get(&self, key: &str) -> Option<Value> {
        match self.try_get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "Cache read failed, treating as miss");
                None
            }
        }
    }

    fn set(&self, key: &str, value: Value) {
        match self.try_set(key, &value) {
            Ok(()) => debug!(key, "Cached response"),
            Err(e) => warn!(key, error = %e, "Cache write failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn create_test_cache() -> (FjallCache, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let cache = FjallCache::open(temp_dir.path().join("cache")).unwrap();
        (cache, temp_dir)
    }

    #[test]
    fn test_get_set_roundtrip() {
        let (cache, _temp) = create_test_cache();
        assert!(cache.get("missing").is_none());

        cache.set("k", json!({"title": "t", "type": "link"}));
        assert_eq!(cache.get("k"), Some(json!({"title": "t", "type": "link"})));
        assert_eq!(cache.len().unwrap(), 1);
    }

    #[test]
    fn test_persist() {
        let (cache, _temp) = create_test_cache();
        cache.set("linkembed.https://oembed.com/providers.json", json!("[]"));

        cache.persist().unwrap();
        assert_eq!(
            cache.get("linkembed.https://oembed.com/providers.json"),
            Some(json!("[]"))
        );
    }
}
