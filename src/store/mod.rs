//! Durable Store Module
//!
//! Authoritative key-value records plus the set of valid API keys.

mod sqlite;

pub use sqlite::SqliteStore;

use std::sync::Arc;

use thiserror::Error;

// == Store Error ==
/// Failures reported by a [`RecordStore`].
#[derive(Error, Debug)]
pub enum StoreError {
    /// No record with this key
    #[error("record not found: {0}")]
    NotFound(String),

    /// A record with this key already exists
    #[error("record already exists: {0}")]
    AlreadyExists(String),

    /// Another thread panicked while holding the connection
    #[error("store connection lock poisoned")]
    LockPoisoned,

    /// Underlying database error
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The blocking task running the store call failed to complete
    #[error("store task failed: {0}")]
    Task(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

// == Record ==
/// A single persisted key-value pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub key: String,
    pub value: String,
}

impl Record {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

// == Record Store ==
/// Interface the service needs from durable storage.
///
/// Every mutating call must be persisted before it returns `Ok`.
pub trait RecordStore: Send + Sync {
    /// Returns the stored value, or `None` if the key is absent.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Inserts a new record. Check and insert happen as one atomic step, so
    /// concurrent creates for the same key yield exactly one success.
    fn create(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Overwrites an existing record. Never inserts.
    fn update(&self, key: &str, value: &str) -> StoreResult<()>;

    /// All records in insertion order. Missing values come back as `""`.
    fn list_all(&self) -> StoreResult<Vec<Record>>;

    /// Membership test against the seeded key set.
    fn is_valid_api_key(&self, candidate: &str) -> StoreResult<bool>;
}

// == Blocking Dispatch ==
/// Runs a store call on tokio's blocking pool.
///
/// Store implementations do synchronous I/O; async callers go through here
/// so a slow query never stalls an executor thread.
pub async fn run_blocking<T, F>(store: &Arc<dyn RecordStore>, op: F) -> StoreResult<T>
where
    T: Send + 'static,
    F: FnOnce(&dyn RecordStore) -> StoreResult<T> + Send + 'static,
{
    let store = Arc::clone(store);
    tokio::task::spawn_blocking(move || op(store.as_ref()))
        .await
        .map_err(|err| StoreError::Task(err.to_string()))?
}
