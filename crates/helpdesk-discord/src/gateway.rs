//! [`ForumGateway`] implemented over serenity's HTTP client.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use helpdesk_core::{
    ChannelMessenger, GatewayError, GatewayResult, Notice, ReactionEmoji, ThreadDescriptor,
};
use helpdesk_forum::{ForumGateway, ForumLayout, StarterMessage};
use serenity::all::{Channel, EditMessage, EditThread, EmojiId, GuildChannel, Http};

use crate::convert::{
    forum_layout, is_text_kind, is_thread_kind, notice_message, reaction_type, thread_descriptor,
};
use crate::error::{is_not_found, AdapterError};
use crate::ids::{channel_id, forum_tag_ids, message_id, user_id};

/// Discord access shared by the event handler and the forum module.
pub struct SerenityGateway {
    http: Arc<Http>,
    bot_user_id: RwLock<Option<String>>,
}

impl SerenityGateway {
    pub fn new(http: Arc<Http>) -> Self {
        Self {
            http,
            bot_user_id: RwLock::new(None),
        }
    }

    pub fn http(&self) -> &Arc<Http> {
        &self.http
    }

    pub fn set_bot_user_id(&self, user_id: impl Into<String>) {
        let mut guard = self
            .bot_user_id
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *guard = Some(user_id.into());
    }

    async fn fetch_channel(&self, raw_id: &str) -> Result<Option<Channel>, AdapterError> {
        match channel_id(raw_id)?.to_channel(&self.http).await {
            Ok(channel) => Ok(Some(channel)),
            Err(error) if is_not_found(&error) => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    async fn guild_emoji_names(&self, channel: &GuildChannel) -> HashMap<EmojiId, String> {
        match channel.guild_id.emojis(&self.http).await {
            Ok(emojis) => emojis
                .into_iter()
                .map(|emoji| (emoji.id, emoji.name))
                .collect(),
            Err(error) => {
                tracing::warn!(
                    guild_id = %channel.guild_id,
                    "failed to list guild emojis: {error}"
                );
                HashMap::new()
            }
        }
    }
}

#[async_trait]
impl ChannelMessenger for SerenityGateway {
    async fn send_notice(&self, channel: &str, notice: &Notice) -> GatewayResult<String> {
        let message = channel_id(channel)?
            .send_message(&self.http, notice_message(notice))
            .await
            .map_err(AdapterError::from)?;
        Ok(message.id.to_string())
    }

    async fn send_text(&self, channel: &str, content: &str) -> GatewayResult<String> {
        let message = channel_id(channel)?
            .say(&self.http, content)
            .await
            .map_err(AdapterError::from)?;
        Ok(message.id.to_string())
    }

    async fn edit_text(&self, channel: &str, message: &str, content: &str) -> GatewayResult<()> {
        channel_id(channel)?
            .edit_message(
                &self.http,
                message_id(message)?,
                EditMessage::new().content(content),
            )
            .await
            .map_err(AdapterError::from)?;
        Ok(())
    }

    async fn delete_message(&self, channel: &str, message: &str) -> GatewayResult<()> {
        channel_id(channel)?
            .delete_message(&self.http, message_id(message)?)
            .await
            .map_err(AdapterError::from)?;
        Ok(())
    }
}

#[async_trait]
impl ForumGateway for SerenityGateway {
    fn bot_user_id(&self) -> Option<String> {
        self.bot_user_id
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    async fn fetch_forum_layout(&self, channel: &str) -> GatewayResult<ForumLayout> {
        match self.fetch_channel(channel).await? {
            Some(Channel::Guild(guild_channel)) => {
                let names = self.guild_emoji_names(&guild_channel).await;
                Ok(forum_layout(&guild_channel, &names))
            }
            Some(_) => Ok(ForumLayout {
                channel_id: channel.to_string(),
                ..ForumLayout::default()
            }),
            None => Err(GatewayError::NotFound(format!("channel {channel}"))),
        }
    }

    async fn is_text_channel(&self, channel: &str) -> GatewayResult<bool> {
        Ok(matches!(
            self.fetch_channel(channel).await?,
            Some(Channel::Guild(guild_channel)) if is_text_kind(guild_channel.kind)
        ))
    }

    async fn fetch_thread(&self, thread: &str) -> GatewayResult<Option<ThreadDescriptor>> {
        Ok(match self.fetch_channel(thread).await? {
            Some(Channel::Guild(guild_channel)) if is_thread_kind(guild_channel.kind) => {
                Some(thread_descriptor(&guild_channel))
            }
            _ => None,
        })
    }

    async fn fetch_starter_message(&self, thread: &str) -> GatewayResult<Option<StarterMessage>> {
        let thread_channel = channel_id(thread)?;
        // Forum starter posts share the thread's id.
        match thread_channel
            .message(&self.http, message_id(thread)?)
            .await
        {
            Ok(message) => Ok(Some(StarterMessage {
                id: message.id.to_string(),
                content: message.content,
            })),
            Err(error) if is_not_found(&error) => Ok(None),
            Err(error) => Err(AdapterError::from(error).into()),
        }
    }

    async fn set_applied_tags(&self, thread: &str, tag_ids: &[String]) -> GatewayResult<()> {
        channel_id(thread)?
            .edit_thread(
                &self.http,
                EditThread::new().applied_tags(forum_tag_ids(tag_ids)?),
            )
            .await
            .map_err(AdapterError::from)?;
        Ok(())
    }

    async fn remove_reaction(
        &self,
        channel: &str,
        message: &str,
        user: &str,
        emoji: &ReactionEmoji,
    ) -> GatewayResult<()> {
        channel_id(channel)?
            .delete_reaction(
                &self.http,
                message_id(message)?,
                Some(user_id(user)?),
                reaction_type(emoji)?,
            )
            .await
            .map_err(AdapterError::from)?;
        Ok(())
    }
}
