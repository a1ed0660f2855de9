//! In-memory byte cache for fetched resources

use crate::utils::lock;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

/// Size-bounded in-memory cache keyed by URL
///
/// Holds at most `capacity_bytes` of payload. When an insert would exceed the
/// bound, the oldest entries are evicted first. Payloads larger than the whole
/// capacity are never stored.
#[derive(Clone)]
pub struct ResponseCache {
    capacity_bytes: u64,
    inner: Arc<Mutex<CacheState>>,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<String, Arc<[u8]>>,
    /// Insertion order, oldest first
    order: VecDeque<String>,
    total_bytes: u64,
}

impl CacheState {
    fn remove(&mut self, key: &str) {
        if let Some(old) = self.entries.remove(key) {
            self.total_bytes = self.total_bytes.saturating_sub(old.len() as u64);
            self.order.retain(|k| k != key);
        }
    }
}

impl ResponseCache {
    /// Create an empty cache bounded to `capacity_bytes`
    pub fn new(capacity_bytes: u64) -> Self {
        Self {
            capacity_bytes,
            inner: Arc::new(Mutex::new(CacheState::default())),
        }
    }

    /// Look up a cached payload
    pub fn get(&self, key: &str) -> Option<Arc<[u8]>> {
        lock(&self.inner).entries.get(key).cloned()
    }

    /// Store a payload, evicting older entries as needed
    ///
    /// Returns false if the payload is larger than the cache capacity.
    pub fn insert(&self, key: &str, bytes: &[u8]) -> bool {
        let size = bytes.len() as u64;
        if size > self.capacity_bytes {
            tracing::debug!(
                key,
                size,
                capacity = self.capacity_bytes,
                "Payload larger than cache capacity, not cached"
            );
            return false;
        }

        let mut state = lock(&self.inner);
        state.remove(key);

        while state.total_bytes + size > self.capacity_bytes {
            let Some(oldest) = state.order.pop_front() else {
                break;
            };
            if let Some(evicted) = state.entries.remove(&oldest) {
                state.total_bytes = state.total_bytes.saturating_sub(evicted.len() as u64);
                tracing::trace!(key = %oldest, "Evicted cached payload");
            }
        }

        state.entries.insert(key.to_string(), Arc::from(bytes));
        state.order.push_back(key.to_string());
        state.total_bytes += size;
        true
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        lock(&self.inner).entries.len()
    }

    /// Returns true if nothing is cached
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total payload bytes currently held
    pub fn total_bytes(&self) -> u64 {
        lock(&self.inner).total_bytes
    }

    /// Configured capacity in bytes
    pub fn capacity_bytes(&self) -> u64 {
        self.capacity_bytes
    }

    /// Drop every cached entry
    pub fn clear(&self) {
        *lock(&self.inner) = CacheState::default();
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let cache = ResponseCache::new(100);
        assert!(cache.insert("a", b"hello"));
        assert_eq!(cache.get("a").as_deref(), Some(&b"hello"[..]));
        assert_eq!(cache.total_bytes(), 5);
        assert!(cache.get("b").is_none());
    }

    #[test]
    fn test_evicts_oldest_first() {
        let cache = ResponseCache::new(10);
        cache.insert("a", &[0; 4]);
        cache.insert("b", &[0; 4]);
        cache.insert("c", &[0; 4]);

        assert!(cache.get("a").is_none(), "oldest entry should be evicted");
        assert!(cache.get("b").is_some());
        assert!(cache.get("c").is_some());
        assert_eq!(cache.total_bytes(), 8);
    }

    #[test]
    fn test_replacing_key_updates_size() {
        let cache = ResponseCache::new(10);
        cache.insert("a", &[0; 6]);
        cache.insert("a", &[1; 2]);

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.total_bytes(), 2);
        assert_eq!(cache.get("a").as_deref(), Some(&[1u8, 1][..]));
    }

    #[test]
    fn test_oversized_payload_not_stored() {
        let cache = ResponseCache::new(3);
        cache.insert("small", &[0; 2]);
        assert!(!cache.insert("big", &[0; 4]));
        assert!(cache.get("big").is_none());
        assert!(cache.get("small").is_some(), "existing entries survive");
    }

    #[test]
    fn test_clear() {
        let cache = ResponseCache::new(10);
        cache.insert("a", &[0; 3]);
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.total_bytes(), 0);
    }
}
