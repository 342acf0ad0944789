//! Lightweight descriptors of chat-platform objects.
//!
//! The Discord adapter maps SDK objects into these values so the forum and
//! command logic never touch the SDK object graph.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
/// Public struct `ThreadDescriptor` describing a thread channel.
pub struct ThreadDescriptor {
    pub id: String,
    pub parent_id: Option<String>,
    pub owner_id: Option<String>,
    pub created_at_ms: Option<u64>,
    pub applied_tags: Vec<String>,
}

impl ThreadDescriptor {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Returns true when this thread lives directly under `parent_id`.
    pub fn is_child_of(&self, parent_id: &str) -> bool {
        self.parent_id.as_deref() == Some(parent_id)
    }

    pub fn with_applied_tags(mut self, tags: Vec<String>) -> Self {
        self.applied_tags = tags;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// The user behind a command or reaction.
pub struct Actor {
    pub id: String,
    /// Helper role membership or a message-management permission, as evaluated by the adapter.
    pub is_helper: bool,
    #[serde(default)]
    pub is_bot: bool,
}

impl Actor {
    pub fn member(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            is_helper: false,
            is_bot: false,
        }
    }

    pub fn helper(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            is_helper: true,
            is_bot: false,
        }
    }

    pub fn mention(&self) -> String {
        user_mention(&self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A text message received from the gateway.
pub struct IncomingMessage {
    pub id: String,
    pub channel_id: String,
    pub author: Actor,
    pub content: String,
    /// Present when the message was posted inside a thread.
    pub thread: Option<ThreadDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
/// Emoji identity as seen on a reaction or a forum tag.
pub enum ReactionEmoji {
    Custom { id: String, name: Option<String> },
    Unicode { name: String },
}

impl ReactionEmoji {
    /// Custom emoji compare by id, unicode emoji by name.
    pub fn same_identity(&self, other: &ReactionEmoji) -> bool {
        match (self, other) {
            (Self::Custom { id: left, .. }, Self::Custom { id: right, .. }) => left == right,
            (Self::Unicode { name: left }, Self::Unicode { name: right }) => left == right,
            _ => false,
        }
    }

    /// Inline message rendering of the emoji.
    pub fn render(&self) -> String {
        match self {
            Self::Custom { id, name } => {
                format!("<:{}:{}>", name.as_deref().unwrap_or("_"), id)
            }
            Self::Unicode { name } => name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A reaction added to a message.
pub struct ReactionEvent {
    pub channel_id: String,
    pub message_id: String,
    pub user_id: Option<String>,
    pub emoji: ReactionEmoji,
}

pub fn user_mention(user_id: &str) -> String {
    format!("<@{user_id}>")
}

pub fn role_mention(role_id: &str) -> String {
    format!("<@&{role_id}>")
}

pub fn channel_mention(channel_id: &str) -> String {
    format!("<#{channel_id}>")
}
