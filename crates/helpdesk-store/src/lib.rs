//! Key-value store abstractions with expiry, plus in-memory and SQLite backends.
//!
//! Keys are composite (`["forum", "<thread id>"]`), values are opaque JSON
//! text. Typed access goes through [`get_json`] and [`set_json`].

use async_trait::async_trait;
use helpdesk_core::{is_expired_unix_ms, Clock, SystemClock};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;

mod sqlite;

pub use sqlite::SqliteKvStore;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors returned by store implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store key must have at least one non-empty part")]
    EmptyKey,
    #[error("invalid persisted value for key {key}: {source}")]
    InvalidValue {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Composite key, compared part by part.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StoreKey(Vec<String>);

impl StoreKey {
    pub fn new<I, S>(parts: I) -> StoreResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let parts = parts.into_iter().map(Into::into).collect::<Vec<String>>();
        if parts.is_empty() || parts.iter().all(|part| part.is_empty()) {
            return Err(StoreError::EmptyKey);
        }
        Ok(Self(parts))
    }

    pub fn parts(&self) -> &[String] {
        &self.0
    }

    /// Stable text encoding used as the SQLite primary key.
    pub fn encode(&self) -> String {
        serde_json::to_string(&self.0).unwrap_or_else(|_| self.0.join("\u{1f}"))
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}

/// Expiry applied by a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    /// The entry never expires; clears any previous expiry.
    Never,
    /// The entry expires this long after the write.
    After(Duration),
    /// Keeps the expiry of the entry being overwritten (none for a new entry).
    Keep,
}

/// Async key-value contract used by the forum and snippet modules.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &StoreKey) -> StoreResult<Option<String>>;
    async fn set(&self, key: &StoreKey, value: &str, expiry: Expiry) -> StoreResult<()>;
    /// Returns true when an unexpired entry was removed.
    async fn delete(&self, key: &StoreKey) -> StoreResult<bool>;
    /// Returns the absolute expiry of a live entry, if it has one.
    async fn expires_at_ms(&self, key: &StoreKey) -> StoreResult<Option<u64>>;
}

/// Reads and decodes a JSON value.
pub async fn get_json<T: DeserializeOwned>(
    store: &dyn KvStore,
    key: &StoreKey,
) -> StoreResult<Option<T>> {
    let Some(raw) = store.get(key).await? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| StoreError::InvalidValue {
            key: key.to_string(),
            source,
        })
}

/// Encodes and writes a JSON value.
pub async fn set_json<T: Serialize + Sync>(
    store: &dyn KvStore,
    key: &StoreKey,
    value: &T,
    expiry: Expiry,
) -> StoreResult<()> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw, expiry).await
}

pub(crate) fn resolve_expiry(
    expiry: Expiry,
    previous_expiry_ms: Option<u64>,
    now_ms: u64,
) -> Option<u64> {
    match expiry {
        Expiry::Never => None,
        Expiry::After(ttl) => Some(now_ms.saturating_add(duration_to_ms(ttl))),
        Expiry::Keep => previous_expiry_ms,
    }
}

fn duration_to_ms(duration: Duration) -> u64 {
    duration.as_millis().try_into().unwrap_or(u64::MAX)
}

#[derive(Debug, Clone)]
struct StoredEntry {
    value: String,
    expires_at_ms: Option<u64>,
}

/// In-memory implementation for tests and local runs.
pub struct InMemoryKvStore {
    inner: RwLock<HashMap<StoreKey, StoredEntry>>,
    clock: Arc<dyn Clock>,
}

impl Default for InMemoryKvStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryKvStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// Number of live entries.
    pub async fn len(&self) -> usize {
        let now = self.clock.now_unix_ms();
        self.inner
            .read()
            .await
            .values()
            .filter(|entry| !is_expired_unix_ms(entry.expires_at_ms, now))
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl KvStore for InMemoryKvStore {
    async fn get(&self, key: &StoreKey) -> StoreResult<Option<String>> {
        let now = self.clock.now_unix_ms();
        let mut inner = self.inner.write().await;
        match inner.get(key) {
            Some(entry) if is_expired_unix_ms(entry.expires_at_ms, now) => {
                inner.remove(key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &StoreKey, value: &str, expiry: Expiry) -> StoreResult<()> {
        let now = self.clock.now_unix_ms();
        let mut inner = self.inner.write().await;
        let previous = inner
            .get(key)
            .filter(|entry| !is_expired_unix_ms(entry.expires_at_ms, now))
            .and_then(|entry| entry.expires_at_ms);
        inner.insert(
            key.clone(),
            StoredEntry {
                value: value.to_string(),
                expires_at_ms: resolve_expiry(expiry, previous, now),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &StoreKey) -> StoreResult<bool> {
        let now = self.clock.now_unix_ms();
        let removed = self.inner.write().await.remove(key);
        Ok(removed.is_some_and(|entry| !is_expired_unix_ms(entry.expires_at_ms, now)))
    }

    async fn expires_at_ms(&self, key: &StoreKey) -> StoreResult<Option<u64>> {
        let now = self.clock.now_unix_ms();
        Ok(self
            .inner
            .read()
            .await
            .get(key)
            .filter(|entry| !is_expired_unix_ms(entry.expires_at_ms, now))
            .and_then(|entry| entry.expires_at_ms))
    }
}
