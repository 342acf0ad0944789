//! Forum tags, thread status, and the status-tag write algorithm.

use helpdesk_core::ReactionEmoji;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// A tag available on the forum channel.
pub struct ForumTag {
    pub id: String,
    pub name: String,
    /// Moderated tags can only be applied by moderators.
    #[serde(default)]
    pub moderated: bool,
    #[serde(default)]
    pub emoji: Option<ReactionEmoji>,
}

impl ForumTag {
    /// `<emoji> <name>` when the tag has an emoji, the bare name otherwise.
    pub fn render(&self) -> String {
        match &self.emoji {
            Some(emoji) => format!("{} {}", emoji.render(), self.name),
            None => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
/// Snapshot of the forum channel's kind and tag catalog.
pub struct ForumLayout {
    pub channel_id: String,
    pub is_forum: bool,
    pub available_tags: Vec<ForumTag>,
}

impl ForumLayout {
    pub fn tag_by_name(&self, name: &str) -> Option<&ForumTag> {
        self.available_tags.iter().find(|tag| tag.name == name)
    }

    pub fn tag_by_id(&self, id: &str) -> Option<&ForumTag> {
        self.available_tags.iter().find(|tag| tag.id == id)
    }

    /// The unmoderated tag whose emoji has the same identity as `emoji`.
    pub fn classification_tag_for(&self, emoji: &ReactionEmoji) -> Option<&ForumTag> {
        self.available_tags.iter().find(|tag| {
            !tag.moderated
                && tag
                    .emoji
                    .as_ref()
                    .is_some_and(|tag_emoji| tag_emoji.same_identity(emoji))
        })
    }

    /// Human-readable list of applied tags; unknown ids are skipped.
    pub fn render_applied_tags(&self, applied_tags: &[String]) -> Vec<String> {
        applied_tags
            .iter()
            .filter_map(|id| self.tag_by_id(id))
            .map(ForumTag::render)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// Enumerates supported `ThreadStatus` values.
pub enum ThreadStatus {
    Open,
    Resolved,
}

impl ThreadStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Resolved => "resolved",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Resolved ids of the open and resolved status tags.
pub struct StatusTags {
    pub open: String,
    pub resolved: String,
}

impl StatusTags {
    pub fn tag_for(&self, status: ThreadStatus) -> &str {
        match status {
            ThreadStatus::Open => &self.open,
            ThreadStatus::Resolved => &self.resolved,
        }
    }

    pub fn is_status_tag(&self, tag_id: &str) -> bool {
        tag_id == self.open || tag_id == self.resolved
    }

    /// Status implied by the first status tag found, if any.
    pub fn status_of(&self, applied_tags: &[String]) -> Option<ThreadStatus> {
        applied_tags.iter().find_map(|tag| {
            if *tag == self.open {
                Some(ThreadStatus::Open)
            } else if *tag == self.resolved {
                Some(ThreadStatus::Resolved)
            } else {
                None
            }
        })
    }
}

/// Computes the tag set after switching a thread to `status`.
///
/// Status tags are removed, the last remaining tag is evicted when the
/// remaining count already equals `max_tags`, and the target status tag is
/// prepended.
pub fn apply_status_tag(
    applied_tags: &[String],
    status_tags: &StatusTags,
    status: ThreadStatus,
    max_tags: usize,
) -> Vec<String> {
    let mut remaining = applied_tags
        .iter()
        .filter(|tag| !status_tags.is_status_tag(tag))
        .cloned()
        .collect::<Vec<_>>();
    let capacity = max_tags.max(1);
    while remaining.len() >= capacity {
        remaining.pop();
    }
    let mut tags = Vec::with_capacity(remaining.len() + 1);
    tags.push(status_tags.tag_for(status).to_string());
    tags.extend(remaining);
    tags
}
