//! Short-lived cache of GET response bodies, keyed by URL.
//!
//! Entries are served while younger than the configured freshness window.
//! Any mutating request clears the whole cache.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

#[derive(Debug)]
struct CachedBody {
    fetched_at: Instant,
    body: Vec<u8>,
}

/// URL-keyed cache of response bodies.
#[derive(Debug)]
pub struct ResponseCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, CachedBody>>,
}

impl ResponseCache {
    /// Create an empty cache. A zero `ttl` disables caching.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// A fresh body for `url`. Stale entries are evicted.
    #[must_use]
    pub fn get(&self, url: &str) -> Option<Vec<u8>> {
        let mut entries = self.entries.lock();
        match entries.get(url) {
            Some(cached) if cached.fetched_at.elapsed() < self.ttl => Some(cached.body.clone()),
            Some(_) => {
                entries.remove(url);
                None
            }
            None => None,
        }
    }

    /// Store a body fetched just now.
    pub fn insert(&self, url: impl Into<String>, body: Vec<u8>) {
        if self.ttl.is_zero() {
            return;
        }
        self.entries.lock().insert(
            url.into(),
            CachedBody {
                fetched_at: Instant::now(),
                body,
            },
        );
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Number of entries, fresh or stale.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_serve_fresh_entry() {
        let cache = ResponseCache::new(Duration::from_secs(60));
        cache.insert("http://h/rest/workspaces.xml", b"<workspaces/>".to_vec());
        assert_eq!(
            cache.get("http://h/rest/workspaces.xml").as_deref(),
            Some(&b"<workspaces/>"[..])
        );
        assert!(cache.get("http://h/rest/layers.xml").is_none());
    }

    #[test]
    fn test_should_evict_stale_entry() {
        let cache = ResponseCache::new(Duration::from_millis(10));
        cache.insert("u", b"x".to_vec());
        std::thread::sleep(Duration::from_millis(30));
        assert!(cache.get("u").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_should_not_store_with_zero_ttl() {
        let cache = ResponseCache::new(Duration::ZERO);
        cache.insert("u", b"x".to_vec());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_should_clear_all_entries() {
        let cache = ResponseCache::new(Duration::from_secs(60));
        cache.insert("a", b"1".to_vec());
        cache.insert("b", b"2".to_vec());
        assert_eq!(cache.len(), 2);
        cache.clear();
        assert!(cache.is_empty());
    }
}
