//! Platform operations the help-forum module depends on.

use async_trait::async_trait;
use helpdesk_core::{ChannelMessenger, GatewayResult, ReactionEmoji, ThreadDescriptor};

use crate::tags::ForumLayout;

#[derive(Debug, Clone, PartialEq, Eq)]
/// The first message of a forum thread.
pub struct StarterMessage {
    pub id: String,
    pub content: String,
}

/// Forum reads and writes on top of plain channel messaging.
#[async_trait]
pub trait ForumGateway: ChannelMessenger {
    /// User id of the bot itself, once known.
    fn bot_user_id(&self) -> Option<String>;
    async fn fetch_forum_layout(&self, channel_id: &str) -> GatewayResult<ForumLayout>;
    async fn is_text_channel(&self, channel_id: &str) -> GatewayResult<bool>;
    /// Returns `None` when the channel does not exist or is not a thread.
    async fn fetch_thread(&self, thread_id: &str) -> GatewayResult<Option<ThreadDescriptor>>;
    async fn fetch_starter_message(&self, thread_id: &str)
        -> GatewayResult<Option<StarterMessage>>;
    async fn set_applied_tags(&self, thread_id: &str, tag_ids: &[String]) -> GatewayResult<()>;
    async fn remove_reaction(
        &self,
        channel_id: &str,
        message_id: &str,
        user_id: &str,
        emoji: &ReactionEmoji,
    ) -> GatewayResult<()>;
}
