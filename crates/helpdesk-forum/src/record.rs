//! Persisted per-thread state.

use std::sync::Arc;
use std::time::Duration;

use helpdesk_core::ThreadDescriptor;
use helpdesk_store::{get_json, set_json, Expiry, KvStore, StoreKey};
use serde::{Deserialize, Serialize};

use crate::config::RecordExpiryPolicy;
use crate::error::{ForumError, ForumResult};
use crate::gateway::ForumGateway;

const FORUM_NAMESPACE: &str = "forum";
pub const THREAD_RECORD_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Stored state for one help thread. The owner is fixed at construction.
pub struct ThreadRecord {
    owner_id: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        alias = "lastHelpRequest"
    )]
    pub last_helpers_ping: Option<u64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        alias = "requestForHelpMessage"
    )]
    pub help_request_message_id: Option<String>,
    /// Helper comment quoted under the help request; kept so edits can re-render it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_request_comment: Option<String>,
}

impl ThreadRecord {
    pub fn new(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            last_helpers_ping: None,
            help_request_message_id: None,
            help_request_comment: None,
        }
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    pub fn is_owner(&self, user_id: &str) -> bool {
        self.owner_id == user_id
    }
}

pub fn thread_record_key(thread_id: &str) -> ForumResult<StoreKey> {
    Ok(StoreKey::new([FORUM_NAMESPACE, thread_id])?)
}

/// Reads and writes thread records under `("forum", threadId)`.
#[derive(Clone)]
pub struct ThreadRecords {
    store: Arc<dyn KvStore>,
    expiry_policy: RecordExpiryPolicy,
}

impl ThreadRecords {
    pub fn new(store: Arc<dyn KvStore>, expiry_policy: RecordExpiryPolicy) -> Self {
        Self {
            store,
            expiry_policy,
        }
    }

    pub fn expiry_policy(&self) -> RecordExpiryPolicy {
        self.expiry_policy
    }

    pub async fn load(&self, thread_id: &str) -> ForumResult<Option<ThreadRecord>> {
        let key = thread_record_key(thread_id)?;
        Ok(get_json(self.store.as_ref(), &key).await?)
    }

    /// Writes a fresh record with the full TTL.
    pub async fn create(&self, thread_id: &str, record: &ThreadRecord) -> ForumResult<()> {
        let key = thread_record_key(thread_id)?;
        set_json(
            self.store.as_ref(),
            &key,
            record,
            Expiry::After(THREAD_RECORD_TTL),
        )
        .await?;
        Ok(())
    }

    /// Writes an existing record back whole.
    pub async fn save(&self, thread_id: &str, record: &ThreadRecord) -> ForumResult<()> {
        let key = thread_record_key(thread_id)?;
        let expiry = match self.expiry_policy {
            RecordExpiryPolicy::Preserve => Expiry::Keep,
            RecordExpiryPolicy::Refresh => Expiry::After(THREAD_RECORD_TTL),
        };
        set_json(self.store.as_ref(), &key, record, expiry).await?;
        Ok(())
    }

    pub async fn delete(&self, thread_id: &str) -> ForumResult<bool> {
        let key = thread_record_key(thread_id)?;
        Ok(self.store.delete(&key).await?)
    }

    pub async fn expires_at_ms(&self, thread_id: &str) -> ForumResult<Option<u64>> {
        let key = thread_record_key(thread_id)?;
        Ok(self.store.expires_at_ms(&key).await?)
    }

    /// Loads the record, rebuilding it from the thread's owner when the thread
    /// predates the bot or the record expired.
    ///
    /// The rebuilt record is written with the full TTL and returned directly.
    pub async fn load_or_reconstruct(
        &self,
        thread: &ThreadDescriptor,
        gateway: &dyn ForumGateway,
    ) -> ForumResult<ThreadRecord> {
        if let Some(record) = self.load(&thread.id).await? {
            return Ok(record);
        }
        let owner_id = match thread.owner_id.clone() {
            Some(owner_id) => owner_id,
            None => gateway
                .fetch_thread(&thread.id)
                .await?
                .and_then(|fetched| fetched.owner_id)
                .ok_or_else(|| ForumError::ThreadNotResolvable(thread.id.clone()))?,
        };
        let record = ThreadRecord::new(owner_id);
        self.create(&thread.id, &record).await?;
        tracing::info!(
            thread_id = %thread.id,
            owner_id = record.owner_id(),
            "reconstructed missing thread record"
        );
        Ok(record)
    }
}
