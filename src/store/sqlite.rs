//! SQLite Store Module
//!
//! `RecordStore` backed by a single SQLite connection.
//!
//! Schema:
//! - records: (key TEXT PRIMARY KEY, value TEXT)
//! - api_keys: (api_key TEXT PRIMARY KEY)

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use tracing::info;

use super::{Record, RecordStore, StoreError, StoreResult};

// == SQLite Store ==
/// SQLite-backed durable store.
///
/// The connection sits behind a mutex; uniqueness on create is enforced by
/// the primary key constraint, so the insert itself is the atomic step.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    // == Constructors ==
    /// Opens (or creates) the database file at `path` and ensures the schema.
    ///
    /// Uses WAL journaling with FULL synchronous so a returned write is on disk.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = Connection::open(path.as_ref())?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |_| Ok(()))?;
        conn.pragma_update(None, "synchronous", "FULL")?;
        Self::from_connection(conn)
    }

    /// Opens a private in-memory database. Contents vanish on drop.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS records (
                key TEXT PRIMARY KEY,
                value TEXT
            );
            CREATE TABLE IF NOT EXISTS api_keys (
                api_key TEXT PRIMARY KEY
            );",
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    // == Seed API Keys ==
    /// Inserts the given API keys, ignoring ones already present.
    ///
    /// Returns how many keys were newly added.
    pub fn seed_api_keys<S: AsRef<str>>(&self, keys: &[S]) -> StoreResult<usize> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let mut added = 0;
        {
            let mut stmt = tx.prepare("INSERT OR IGNORE INTO api_keys (api_key) VALUES (?1)")?;
            for key in keys {
                added += stmt.execute(params![key.as_ref()])?;
            }
        }
        tx.commit()?;

        info!("Seeded {} new API keys ({} requested)", added, keys.len());
        Ok(added)
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }
}

impl RecordStore for SqliteStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let conn = self.lock()?;
        let value = conn
            .query_row(
                "SELECT value FROM records WHERE key = ?1",
                params![key],
                |row| row.get::<_, Option<String>>(0),
            )
            .optional()?;

        Ok(value.map(Option::unwrap_or_default))
    }

    fn create(&self, key: &str, value: &str) -> StoreResult<()> {
        let conn = self.lock()?;
        match conn.execute(
            "INSERT INTO records (key, value) VALUES (?1, ?2)",
            params![key, value],
        ) {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                Err(StoreError::AlreadyExists(key.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn update(&self, key: &str, value: &str) -> StoreResult<()> {
        let conn = self.lock()?;
        let changed = conn.execute(
            "UPDATE records SET value = ?1 WHERE key = ?2",
            params![value, key],
        )?;

        if changed == 0 {
            return Err(StoreError::NotFound(key.to_string()));
        }
        Ok(())
    }

    fn list_all(&self) -> StoreResult<Vec<Record>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT key, value FROM records ORDER BY rowid")?;
        let records = stmt
            .query_map([], |row| {
                Ok(Record {
                    key: row.get(0)?,
                    value: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(records)
    }

    fn is_valid_api_key(&self, candidate: &str) -> StoreResult<bool> {
        let conn = self.lock()?;
        let found = conn
            .query_row(
                "SELECT 1 FROM api_keys WHERE api_key = ?1",
                params![candidate],
                |_| Ok(()),
            )
            .optional()?;

        Ok(found.is_some())
    }
}
