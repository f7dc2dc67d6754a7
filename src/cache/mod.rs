//! Response cache for Alma API data.
//!
//! The cache is an opaque keyed store owned by the deployment, not by this
//! crate: entries are raw decoded API responses keyed by the most specific
//! identifier used in the fetch (course id, list id, or citation id).
//! Cached data is fallback material, never the source of truth, so the
//! contract is deliberately weak - idempotent get/set with no transactional
//! guarantee, and a failed write is non-fatal (the caller logs and moves
//! on).
//!
//! [`MemoryCache`] is the in-process implementation used by the CLI and the
//! test suite; hosts with their own cache infrastructure implement
//! [`ListCache`] over it.

use dashmap::DashMap;
use serde_json::Value;

/// A keyed store of raw Alma API responses.
pub trait ListCache: Send + Sync {
    /// Fetch the cached response for `key`, if any.
    fn get(&self, key: &str) -> Option<Value>;

    /// Store `value` under `key`, returning `false` when the write failed.
    ///
    /// Concurrent writers racing on the same key may leave either value.
    fn set(&self, key: &str, value: &Value) -> bool;
}

/// A process-local [`ListCache`] backed by a concurrent map.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: DashMap<String, Value>,
}

impl MemoryCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached responses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ListCache for MemoryCache {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    fn set(&self, key: &str, value: &Value) -> bool {
        self.entries.insert(key.to_string(), value.clone());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn set_then_get_round_trips() {
        let cache = MemoryCache::new();
        assert!(cache.is_empty());
        assert!(cache.get("123").is_none());

        assert!(cache.set("123", &json!({"id": "123"})));
        assert_eq!(cache.get("123"), Some(json!({"id": "123"})));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn set_overwrites_existing_entry() {
        let cache = MemoryCache::new();
        cache.set("k", &json!(1));
        cache.set("k", &json!(2));
        assert_eq!(cache.get("k"), Some(json!(2)));
        assert_eq!(cache.len(), 1);
    }
}
