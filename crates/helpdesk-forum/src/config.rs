use std::time::Duration;

use crate::content_gate::ContentThresholds;

pub const DEFAULT_HELPERS_PING_COOLDOWN: Duration = Duration::from_secs(2 * 60 * 60);
pub const DEFAULT_MAX_APPLIED_TAGS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Whether rewriting a thread record resets its expiry.
pub enum RecordExpiryPolicy {
    /// Keep the expiry set when the record was created.
    #[default]
    Preserve,
    /// Reset the expiry to the full record TTL on every write.
    Refresh,
}

impl RecordExpiryPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Preserve => "preserve",
            Self::Refresh => "refresh",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Public struct `HelpForumConfig` used across Helpdesk components.
pub struct HelpForumConfig {
    pub forum_channel_id: String,
    pub help_requests_channel_id: String,
    pub open_tag_name: String,
    pub resolved_tag_name: String,
    pub helper_role_id: String,
    pub content_thresholds: ContentThresholds,
    pub helpers_ping_cooldown: Duration,
    pub max_applied_tags: usize,
    pub record_expiry: RecordExpiryPolicy,
}

impl HelpForumConfig {
    /// Builds a config with default thresholds, cooldown, tag ceiling and expiry policy.
    pub fn new(
        forum_channel_id: impl Into<String>,
        help_requests_channel_id: impl Into<String>,
        open_tag_name: impl Into<String>,
        resolved_tag_name: impl Into<String>,
        helper_role_id: impl Into<String>,
    ) -> Self {
        Self {
            forum_channel_id: forum_channel_id.into(),
            help_requests_channel_id: help_requests_channel_id.into(),
            open_tag_name: open_tag_name.into(),
            resolved_tag_name: resolved_tag_name.into(),
            helper_role_id: helper_role_id.into(),
            content_thresholds: ContentThresholds::default(),
            helpers_ping_cooldown: DEFAULT_HELPERS_PING_COOLDOWN,
            max_applied_tags: DEFAULT_MAX_APPLIED_TAGS,
            record_expiry: RecordExpiryPolicy::default(),
        }
    }

    pub fn helpers_ping_cooldown_ms(&self) -> u64 {
        u64::try_from(self.helpers_ping_cooldown.as_millis()).unwrap_or(u64::MAX)
    }
}
