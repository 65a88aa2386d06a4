use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::{anyhow, Result};

use super::LocalStore;

/// In-process cache. Contents are lost when dropped.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LocalStore for MemoryCache {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().map_err(|_| anyhow!("cache lock poisoned"))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock().map_err(|_| anyhow!("cache lock poisoned"))?;
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let cache = MemoryCache::new();
        assert!(cache.is_empty());
        cache.set("a", "1").unwrap();
        assert_eq!(cache.get("a").as_deref(), Some("1"));
        cache.set("a", "2").unwrap();
        assert_eq!(cache.get("a").as_deref(), Some("2"));
        cache.remove("a").unwrap();
        assert!(cache.get("a").is_none());
        // Removing a missing key is fine
        cache.remove("a").unwrap();
    }
}
