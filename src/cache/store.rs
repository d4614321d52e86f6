//! Cache Store Module
//!
//! In-memory projection of the durable store, keyed by record key.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::cache::CacheStats;

// == Cache Store ==
/// Unbounded key-to-value cache with hit/miss accounting.
///
/// Entries never expire and nothing is evicted: the record universe is
/// bounded by the durable store, and every entry can be rebuilt from it.
/// A bounded deployment would need an eviction policy here.
///
/// Lookups take `&self` so callers can serve hits under a shared read lock;
/// the hit and miss counters are atomics for that reason.
#[derive(Debug, Default)]
pub struct CacheStore {
    /// Key-value storage
    entries: HashMap<String, String>,
    /// Lookups answered from the cache
    hits: AtomicU64,
    /// Lookups that found nothing
    misses: AtomicU64,
    /// Number of `set` calls
    writes: u64,
}

impl CacheStore {
    // == Constructor ==
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    // == Get ==
    /// Returns the cached value, or `None` on a miss.
    pub fn get(&self, key: &str) -> Option<String> {
        match self.entries.get(key) {
            Some(value) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(value.clone())
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    // == Peek ==
    /// Like [`get`](Self::get) but leaves the statistics untouched.
    pub fn peek(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    // == Set ==
    /// Stores `value` under `key`, overwriting whatever was there.
    pub fn set(&mut self, key: String, value: String) {
        self.entries.insert(key, value);
        self.writes += 1;
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            writes: self.writes,
            total_entries: self.entries.len(),
        }
    }

    // == Length ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
