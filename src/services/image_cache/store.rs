//! Recency-evicting key/value stores backing the image cache

use bytes::Bytes;
use lru::LruCache;
use std::num::NonZeroUsize;

/// Fixed-capacity store with recency-based eviction.
///
/// Callers hold the cache lock around every call, so implementations need
/// no synchronization of their own.
pub trait CacheStore: Send {
    /// Read a value, marking it as recently used
    fn get(&mut self, key: &str) -> Option<Bytes>;

    /// Check presence without touching recency
    fn contains(&self, key: &str) -> bool;

    /// Insert or replace a value. Returns the key evicted to make room, if any.
    fn add(&mut self, key: String, value: Bytes) -> Option<String>;

    fn remove(&mut self, key: &str) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Default store on top of the `lru` crate
pub struct LruStore {
    entries: LruCache<String, Bytes>,
}

impl LruStore {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }
}

impl CacheStore for LruStore {
    fn get(&mut self, key: &str) -> Option<Bytes> {
        self.entries.get(key).cloned()
    }

    fn contains(&self, key: &str) -> bool {
        self.entries.contains(key)
    }

    fn add(&mut self, key: String, value: Bytes) -> Option<String> {
        // push hands back the old pair on replacement too, which is not an eviction
        match self.entries.push(key.clone(), value) {
            Some((evicted, _)) if evicted != key => Some(evicted),
            _ => None,
        }
    }

    fn remove(&mut self, key: &str) -> bool {
        self.entries.pop(key).is_some()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_reports_capacity_eviction() {
        let mut store = LruStore::new(2);
        assert_eq!(store.add("a".into(), Bytes::from_static(b"1")), None);
        assert_eq!(store.add("b".into(), Bytes::from_static(b"2")), None);

        // Touch "a" so "b" is the least recently used
        assert!(store.get("a").is_some());
        assert_eq!(
            store.add("c".into(), Bytes::from_static(b"3")),
            Some("b".to_string())
        );
        assert!(!store.contains("b"));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_replacing_a_key_is_not_an_eviction() {
        let mut store = LruStore::new(1);
        store.add("a".into(), Bytes::from_static(b"old"));
        assert_eq!(store.add("a".into(), Bytes::from_static(b"new")), None);
        assert_eq!(store.get("a"), Some(Bytes::from_static(b"new")));
    }

    #[test]
    fn test_remove_missing_key_is_noop() {
        let mut store = LruStore::new(4);
        assert!(!store.remove("missing"));
        store.add("a".into(), Bytes::from_static(b"1"));
        assert!(store.remove("a"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        assert_eq!(LruStore::new(0).capacity(), 1);
    }
}
