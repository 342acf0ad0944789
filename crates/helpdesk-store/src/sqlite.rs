//! SQLite-backed `KvStore` implementation with durable persistence.

use crate::{resolve_expiry, Expiry, KvStore, StoreKey, StoreResult};
use async_trait::async_trait;
use helpdesk_core::{is_expired_unix_ms, Clock, SystemClock};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Persistent SQLite store backend.
pub struct SqliteKvStore {
    db_path: PathBuf,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for SqliteKvStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteKvStore")
            .field("db_path", &self.db_path)
            .finish_non_exhaustive()
    }
}

impl SqliteKvStore {
    /// Creates a SQLite-backed store at `path`, creating schema if needed.
    pub fn new(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::with_clock(path, Arc::new(SystemClock))
    }

    pub fn with_clock(path: impl AsRef<Path>, clock: Arc<dyn Clock>) -> StoreResult<Self> {
        let db_path = path.as_ref().to_path_buf();
        if let Some(parent) = db_path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let store = Self { db_path, clock };
        let connection = store.open_connection()?;
        store.initialize_schema(&connection)?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    fn open_connection(&self) -> StoreResult<Connection> {
        let connection = Connection::open(&self.db_path)?;
        connection.busy_timeout(Duration::from_secs(5))?;
        connection.execute_batch(
            r#"
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            "#,
        )?;
        Ok(connection)
    }

    fn initialize_schema(&self, connection: &Connection) -> StoreResult<()> {
        connection.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv_entries (
                entry_key TEXT PRIMARY KEY,
                entry_value TEXT NOT NULL,
                expires_at_ms INTEGER NULL
            );

            CREATE INDEX IF NOT EXISTS idx_kv_entries_expiry ON kv_entries (expires_at_ms);
            "#,
        )?;
        Ok(())
    }

    /// Deletes every expired entry and returns how many were removed.
    pub fn purge_expired(&self) -> StoreResult<usize> {
        let connection = self.open_connection()?;
        let now = to_sql_ms(self.clock.now_unix_ms());
        let removed = connection.execute(
            "DELETE FROM kv_entries WHERE expires_at_ms IS NOT NULL AND expires_at_ms <= ?1",
            params![now],
        )?;
        if removed > 0 {
            tracing::debug!(removed, "purged expired store entries");
        }
        Ok(removed)
    }

    fn load_entry(
        connection: &Connection,
        encoded_key: &str,
    ) -> StoreResult<Option<(String, Option<u64>)>> {
        let row = connection
            .query_row(
                "SELECT entry_value, expires_at_ms FROM kv_entries WHERE entry_key = ?1",
                params![encoded_key],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, Option<i64>>(1)?)),
            )
            .optional()?;
        Ok(row.map(|(value, expires)| (value, expires.map(from_sql_ms))))
    }
}

fn to_sql_ms(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn from_sql_ms(value: i64) -> u64 {
    u64::try_from(value).unwrap_or_default()
}

#[async_trait]
impl KvStore for SqliteKvStore {
    async fn get(&self, key: &StoreKey) -> StoreResult<Option<String>> {
        let connection = self.open_connection()?;
        let encoded_key = key.encode();
        let Some((value, expires_at_ms)) = Self::load_entry(&connection, &encoded_key)? else {
            return Ok(None);
        };
        if is_expired_unix_ms(expires_at_ms, self.clock.now_unix_ms()) {
            connection.execute(
                "DELETE FROM kv_entries WHERE entry_key = ?1",
                params![encoded_key],
            )?;
            return Ok(None);
        }
        Ok(Some(value))
    }

    async fn set(&self, key: &StoreKey, value: &str, expiry: Expiry) -> StoreResult<()> {
        let mut connection = self.open_connection()?;
        let transaction = connection.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let encoded_key = key.encode();
        let now = self.clock.now_unix_ms();
        let previous_expiry = Self::load_entry(&transaction, &encoded_key)?
            .and_then(|(_, expires_at_ms)| expires_at_ms)
            .filter(|expires_at_ms| !is_expired_unix_ms(Some(*expires_at_ms), now));
        let expires_at_ms = resolve_expiry(expiry, previous_expiry, now).map(to_sql_ms);
        transaction.execute(
            r#"
            INSERT INTO kv_entries (entry_key, entry_value, expires_at_ms)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(entry_key) DO UPDATE SET
                entry_value = excluded.entry_value,
                expires_at_ms = excluded.expires_at_ms
            "#,
            params![encoded_key, value, expires_at_ms],
        )?;
        transaction.commit()?;
        Ok(())
    }

    async fn delete(&self, key: &StoreKey) -> StoreResult<bool> {
        let connection = self.open_connection()?;
        let encoded_key = key.encode();
        let live = Self::load_entry(&connection, &encoded_key)?
            .is_some_and(|(_, expires_at_ms)| {
                !is_expired_unix_ms(expires_at_ms, self.clock.now_unix_ms())
            });
        connection.execute(
            "DELETE FROM kv_entries WHERE entry_key = ?1",
            params![encoded_key],
        )?;
        Ok(live)
    }

    async fn expires_at_ms(&self, key: &StoreKey) -> StoreResult<Option<u64>> {
        let connection = self.open_connection()?;
        let now = self.clock.now_unix_ms();
        Ok(Self::load_entry(&connection, &key.encode())?
            .and_then(|(_, expires_at_ms)| expires_at_ms)
            .filter(|expires_at_ms| !is_expired_unix_ms(Some(*expires_at_ms), now)))
    }
}
