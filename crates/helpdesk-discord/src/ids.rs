//! String ids from the domain layer to serenity id types.

use helpdesk_core::{parse_snowflake, SnowflakeError};
use serenity::all::{ChannelId, EmojiId, ForumTagId, MessageId, RoleId, UserId};

use crate::error::AdapterError;

pub fn parse_id(value: &str) -> Result<u64, AdapterError> {
    parse_snowflake(value)
        .and_then(|valid| {
            valid
                .parse::<u64>()
                .map_err(|_| SnowflakeError::OutOfRange(valid.clone()))
        })
        .map_err(|source| AdapterError::InvalidId {
            value: value.to_string(),
            source,
        })
}

pub fn channel_id(value: &str) -> Result<ChannelId, AdapterError> {
    parse_id(value).map(ChannelId::new)
}

pub fn message_id(value: &str) -> Result<MessageId, AdapterError> {
    parse_id(value).map(MessageId::new)
}

pub fn user_id(value: &str) -> Result<UserId, AdapterError> {
    parse_id(value).map(UserId::new)
}

pub fn role_id(value: &str) -> Result<RoleId, AdapterError> {
    parse_id(value).map(RoleId::new)
}

pub fn emoji_id(value: &str) -> Result<EmojiId, AdapterError> {
    parse_id(value).map(EmojiId::new)
}

pub fn forum_tag_ids(values: &[String]) -> Result<Vec<ForumTagId>, AdapterError> {
    values
        .iter()
        .map(|value| parse_id(value).map(ForumTagId::new))
        .collect()
}
