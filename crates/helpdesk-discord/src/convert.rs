//! Mapping between serenity models and helpdesk descriptors.

use std::collections::HashMap;

use helpdesk_core::{ButtonTone, Notice, ReactionEmoji, ThreadDescriptor};
use helpdesk_forum::{ForumLayout, ForumTag};
use serenity::all::{
    ButtonStyle, ChannelType, CreateActionRow, CreateButton, CreateEmbed, CreateMessage, EmojiId,
    ForumEmoji, GuildChannel, PartialGuildChannel, ReactionType, Timestamp,
};

use crate::error::AdapterError;
use crate::ids::emoji_id;

/// Discord allows at most five buttons per action row.
const BUTTONS_PER_ROW: usize = 5;

pub fn is_thread_kind(kind: ChannelType) -> bool {
    matches!(
        kind,
        ChannelType::PublicThread | ChannelType::PrivateThread | ChannelType::NewsThread
    )
}

pub fn is_text_kind(kind: ChannelType) -> bool {
    matches!(kind, ChannelType::Text | ChannelType::News) || is_thread_kind(kind)
}

fn timestamp_ms(timestamp: Timestamp) -> Option<u64> {
    u64::try_from(timestamp.unix_timestamp())
        .ok()
        .map(|secs| secs.saturating_mul(1_000))
}

pub fn thread_descriptor(channel: &GuildChannel) -> ThreadDescriptor {
    let created_at = channel
        .thread_metadata
        .as_ref()
        .and_then(|metadata| metadata.create_timestamp)
        .unwrap_or_else(|| channel.id.created_at());
    ThreadDescriptor {
        id: channel.id.to_string(),
        parent_id: channel.parent_id.map(|parent| parent.to_string()),
        owner_id: channel.owner_id.map(|owner| owner.to_string()),
        created_at_ms: timestamp_ms(created_at),
        applied_tags: channel
            .applied_tags
            .iter()
            .map(|tag| tag.to_string())
            .collect(),
    }
}

/// Descriptor for a deleted thread; only identity and parent are known.
pub fn deleted_thread_descriptor(
    partial: &PartialGuildChannel,
    full: Option<&GuildChannel>,
) -> ThreadDescriptor {
    match full {
        Some(channel) => thread_descriptor(channel),
        None => {
            let mut thread = ThreadDescriptor::new(partial.id.to_string());
            thread.parent_id = Some(partial.parent_id.to_string());
            thread
        }
    }
}

pub fn reaction_emoji(reaction: &ReactionType) -> Option<ReactionEmoji> {
    match reaction {
        ReactionType::Custom { id, name, .. } => Some(ReactionEmoji::Custom {
            id: id.to_string(),
            name: name.clone(),
        }),
        ReactionType::Unicode(name) => Some(ReactionEmoji::Unicode { name: name.clone() }),
        _ => None,
    }
}

pub fn reaction_type(emoji: &ReactionEmoji) -> Result<ReactionType, AdapterError> {
    Ok(match emoji {
        ReactionEmoji::Custom { id, name } => ReactionType::Custom {
            animated: false,
            id: emoji_id(id)?,
            name: name.clone(),
        },
        ReactionEmoji::Unicode { name } => ReactionType::Unicode(name.clone()),
    })
}

/// Forum tag emoji; custom emoji names come from the guild emoji list.
pub fn forum_emoji(
    emoji: &ForumEmoji,
    guild_emoji_names: &HashMap<EmojiId, String>,
) -> Option<ReactionEmoji> {
    match emoji {
        ForumEmoji::Id(id) => Some(ReactionEmoji::Custom {
            id: id.to_string(),
            name: guild_emoji_names.get(id).cloned(),
        }),
        ForumEmoji::Name(name) => Some(ReactionEmoji::Unicode { name: name.clone() }),
        _ => None,
    }
}

pub fn forum_layout(
    channel: &GuildChannel,
    guild_emoji_names: &HashMap<EmojiId, String>,
) -> ForumLayout {
    ForumLayout {
        channel_id: channel.id.to_string(),
        is_forum: channel.kind == ChannelType::Forum,
        available_tags: channel
            .available_tags
            .iter()
            .map(|tag| ForumTag {
                id: tag.id.to_string(),
                name: tag.name.clone(),
                moderated: tag.moderated,
                emoji: tag
                    .emoji
                    .as_ref()
                    .and_then(|emoji| forum_emoji(emoji, guild_emoji_names)),
            })
            .collect(),
    }
}

pub fn notice_embed(notice: &Notice) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title(&notice.title)
        .color(notice.kind.color());
    if let Some(description) = &notice.description {
        embed = embed.description(description);
    }
    for field in &notice.fields {
        embed = embed.field(&field.name, &field.value, false);
    }
    embed
}

pub fn notice_components(notice: &Notice) -> Vec<CreateActionRow> {
    notice
        .buttons
        .chunks(BUTTONS_PER_ROW)
        .map(|row| {
            CreateActionRow::Buttons(
                row.iter()
                    .map(|button| {
                        CreateButton::new(&button.custom_id)
                            .label(&button.label)
                            .style(match button.tone {
                                ButtonTone::Success => ButtonStyle::Success,
                                ButtonTone::Danger => ButtonStyle::Danger,
                            })
                    })
                    .collect(),
            )
        })
        .collect()
}

pub fn notice_message(notice: &Notice) -> CreateMessage {
    let mut message = CreateMessage::new()
        .embed(notice_embed(notice))
        .components(notice_components(notice));
    if let Some(content) = &notice.content {
        message = message.content(content);
    }
    message
}
