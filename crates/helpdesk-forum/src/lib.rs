//! Help-forum assistant: thread status, content checks, helper pings and
//! reaction-driven tagging for a Discord forum channel.
//!
//! All platform access goes through [`ForumGateway`]; per-thread state lives
//! in a [`helpdesk_store::KvStore`] under `("forum", threadId)`.

pub mod classifier;
pub mod commands;
pub mod config;
pub mod content_gate;
pub mod dispatcher;
pub mod error;
pub mod gateway;
pub mod module;
pub mod record;
pub mod status;
pub mod tags;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use classifier::ClassifyOutcome;
pub use commands::{register_forum_commands, HELPERS_ALIASES, REOPEN_ALIASES, RESOLVE_ALIASES};
pub use config::{
    HelpForumConfig, RecordExpiryPolicy, DEFAULT_HELPERS_PING_COOLDOWN, DEFAULT_MAX_APPLIED_TAGS,
};
pub use content_gate::{
    evaluate_content, ContentReport, ContentThresholds, DEFAULT_MIN_CONTENT_LENGTH,
    DEFAULT_MIN_WORD_COUNT,
};
pub use dispatcher::PingOutcome;
pub use error::{ForumError, ForumResult};
pub use gateway::{ForumGateway, StarterMessage};
pub use module::{HelpForum, ThreadCreatedOutcome, ThreadDeletedOutcome};
pub use record::{thread_record_key, ThreadRecord, ThreadRecords, THREAD_RECORD_TTL};
pub use status::{is_authorized, StatusChangeOutcome};
pub use tags::{apply_status_tag, ForumLayout, ForumTag, StatusTags, ThreadStatus};

#[cfg(test)]
mod tests;
