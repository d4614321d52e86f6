//! Record Service
//!
//! Read-through / write-through coordination between the cache and the
//! durable store.
//!
//! Cache hits are served under the shared read lock. Store calls run on the
//! blocking pool. Misses and mutations on the same key are serialised by a
//! striped key lock, and a miss re-checks the cache once it holds that lock,
//! so a reader can never put a value older than a concurrent write back into
//! the cache.

use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{Mutex, MutexGuard, RwLock};
use tracing::{debug, info};

use crate::cache::{CacheStats, CacheStore};
use crate::error::{Result, ServiceError};
use crate::store::{run_blocking, Record, RecordStore};

/// Number of stripes in the per-key lock table.
const KEY_LOCK_STRIPES: usize = 64;

/// Where a looked-up value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Cache,
    Database,
}

/// A successful single-key lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lookup {
    pub value: String,
    pub source: Source,
}

// == Key Locks ==
/// Fixed table of async mutexes; a key always maps to the same stripe.
struct KeyLocks {
    stripes: Vec<Mutex<()>>,
}

impl KeyLocks {
    fn new(stripes: usize) -> Self {
        Self {
            stripes: (0..stripes.max(1)).map(|_| Mutex::new(())).collect(),
        }
    }

    fn stripe_for(&self, key: &str) -> usize {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() % self.stripes.len() as u64) as usize
    }

    async fn lock(&self, key: &str) -> MutexGuard<'_, ()> {
        self.stripes[self.stripe_for(key)].lock().await
    }
}

/// Business operations on records.
#[derive(Clone)]
pub struct RecordService {
    store: Arc<dyn RecordStore>,
    cache: Arc<RwLock<CacheStore>>,
    key_locks: Arc<KeyLocks>,
}

impl RecordService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            cache: Arc::new(RwLock::new(CacheStore::new())),
            key_locks: Arc::new(KeyLocks::new(KEY_LOCK_STRIPES)),
        }
    }

    /// Cache first, then the store; a store hit populates the cache.
    pub async fn get(&self, key: &str) -> Result<Lookup> {
        if let Some(value) = self.cache.read().await.get(key) {
            debug!("Cache hit for key: {}", key);
            return Ok(Lookup {
                value,
                source: Source::Cache,
            });
        }

        let _key_guard = self.key_locks.lock(key).await;

        // Filled by a write or another miss while we waited for the key lock
        if let Some(value) = self.cache.read().await.peek(key) {
            debug!("Cache filled while waiting for key: {}", key);
            return Ok(Lookup {
                value,
                source: Source::Cache,
            });
        }

        debug!("Cache miss for key: {}", key);
        let owned = key.to_string();
        match run_blocking(&self.store, move |store| store.get(&owned)).await? {
            Some(value) => {
                self.cache.write().await.set(key.to_string(), value.clone());
                Ok(Lookup {
                    value,
                    source: Source::Database,
                })
            }
            None => Err(ServiceError::NotFound(key.to_string())),
        }
    }

    /// Inserts a new record and caches it. Fails with `Conflict` if the key exists.
    pub async fn create(&self, key: &str, value: &str) -> Result<()> {
        let _key_guard = self.key_locks.lock(key).await;

        let (k, v) = (key.to_string(), value.to_string());
        run_blocking(&self.store, move |store| store.create(&k, &v)).await?;
        self.cache.write().await.set(key.to_string(), value.to_string());

        info!("Added record for key: {}", key);
        Ok(())
    }

    /// Overwrites an existing record and refreshes the cache. Never inserts.
    pub async fn update(&self, key: &str, value: &str) -> Result<()> {
        let _key_guard = self.key_locks.lock(key).await;

        let (k, v) = (key.to_string(), value.to_string());
        run_blocking(&self.store, move |store| store.update(&k, &v)).await?;
        self.cache.write().await.set(key.to_string(), value.to_string());

        info!("Updated record for key: {}", key);
        Ok(())
    }

    /// Whether a record exists. Does not touch cache statistics.
    pub async fn exists(&self, key: &str) -> Result<bool> {
        if self.cache.read().await.peek(key).is_some() {
            return Ok(true);
        }
        let owned = key.to_string();
        let found = run_blocking(&self.store, move |store| store.get(&owned)).await?;
        Ok(found.is_some())
    }

    /// Every record, read straight from the store.
    pub async fn list_all(&self) -> Result<Vec<Record>> {
        Ok(run_blocking(&self.store, |store| store.list_all()).await?)
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.read().await.stats()
    }
}
