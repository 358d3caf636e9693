//! TTL'd LRU cache for generation outcomes
//!
//! Keys hash the full provider/model/prompt/params tuple, so two prompts
//! sharing a prefix can never collide. Expired entries are evicted on
//! access; capacity eviction is the LRU's.

use lru::LruCache;
use sha2::{Digest, Sha256};
use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::config::CacheConfig;

struct Entry<V> {
    inserted_at: Instant,
    value: V,
}

/// Thread-safe response cache
pub struct ResponseCache<V> {
    entries: Mutex<LruCache<String, Entry<V>>>,
    ttl: Duration,
    enabled: bool,
}

impl<V: Clone> ResponseCache<V> {
    pub fn new(config: &CacheConfig) -> Self {
        let capacity = NonZeroUsize::new(config.max_entries.max(1))
            .unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl: Duration::from_secs(config.ttl_seconds),
            enabled: config.enabled,
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Fresh value for `key`, if present and within the TTL
    pub fn get(&self, key: &str) -> Option<V> {
        if !self.enabled {
            return None;
        }
        let mut entries = match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        match entries.get(key) {
            Some(entry) if entry.inserted_at.elapsed() < self.ttl => Some(entry.value.clone()),
            Some(_) => {
                entries.pop(key);
                None
            }
            None => None,
        }
    }

    pub fn insert(&self, key: String, value: V) {
        if !self.enabled {
            return;
        }
        let mut entries = match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries.put(
            key,
            Entry {
                inserted_at: Instant::now(),
                value,
            },
        );
    }

    pub fn len(&self) -> usize {
        match self.entries.lock() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Build the cache key for a generation request.
///
/// `params` is a caller-built canonical string of the sampling parameters;
/// unit separators keep fields from bleeding into each other.
pub fn cache_key(provider: &str, model: &str, prompt: &str, params: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(provider.as_bytes());
    hasher.update([0x1f]);
    hasher.update(model.as_bytes());
    hasher.update([0x1f]);
    hasher.update(prompt.as_bytes());
    hasher.update([0x1f]);
    hasher.update(params.as_bytes());
    format!("{:x}", hasher.finalize())
}
