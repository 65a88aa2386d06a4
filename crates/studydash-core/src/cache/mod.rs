//! Local caching module for instant rendering.
//!
//! The local cache is synchronous and string-valued. Structured values are
//! stored as JSON strings via the `LocalStoreExt` helpers.
//!
//! Two stores are provided:
//! - `CacheManager`: one JSON file per key under the cache directory
//! - `MemoryCache`: in-process map, for tests and embedding

pub mod manager;
pub mod memory;

use anyhow::Result;
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

pub use manager::{CacheManager, CachedData};
pub use memory::MemoryCache;

/// Synchronous key/value store. Each call is atomic per key; there are no
/// cross-key transactions.
pub trait LocalStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;

    /// How long ago `key` was written, for stores that record it.
    fn age(&self, _key: &str) -> Option<String> {
        None
    }
}

/// JSON helpers on top of any `LocalStore`.
pub trait LocalStoreExt: LocalStore {
    /// Decode a JSON value, treating malformed entries as absent.
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!(key, error = %e, "Discarding malformed cached JSON");
                None
            }
        }
    }

    fn set_json<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.set(key, &raw)
    }
}

impl<S: LocalStore + ?Sized> LocalStoreExt for S {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_json_helpers_round_trip() {
        let cache = MemoryCache::new();
        let mut map = BTreeMap::new();
        map.insert("Monday".to_string(), 2);
        cache.set_json("k", &map).unwrap();
        let back: BTreeMap<String, i32> = cache.get_json("k").unwrap();
        assert_eq!(back, map);
    }

    #[test]
    fn test_get_json_malformed_is_none() {
        let cache = MemoryCache::new();
        cache.set("k", "{not json").unwrap();
        assert!(cache.get_json::<Vec<String>>("k").is_none());
        // Raw value is still there
        assert_eq!(cache.get("k").as_deref(), Some("{not json"));
    }

    #[test]
    fn test_helpers_work_through_trait_object() {
        let cache: Box<dyn LocalStore> = Box::new(MemoryCache::new());
        cache.set_json("n", &42).unwrap();
        assert_eq!(cache.get_json::<i32>("n"), Some(42));
        assert!(cache.age("n").is_none());
    }
}
