//! Recording in-memory [`ForumGateway`] used by unit and integration tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use helpdesk_core::{
    ChannelMessenger, GatewayError, GatewayResult, Notice, ReactionEmoji, ThreadDescriptor,
};

use crate::gateway::{ForumGateway, StarterMessage};
use crate::tags::ForumLayout;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentNotice {
    pub channel_id: String,
    pub message_id: String,
    pub notice: Notice,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentText {
    pub channel_id: String,
    pub message_id: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditedText {
    pub channel_id: String,
    pub message_id: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedReaction {
    pub channel_id: String,
    pub message_id: String,
    pub user_id: String,
    pub emoji: ReactionEmoji,
}

#[derive(Debug, Default)]
struct FakeState {
    next_message_id: u64,
    bot_user_id: Option<String>,
    layouts: HashMap<String, ForumLayout>,
    text_channels: HashSet<String>,
    threads: HashMap<String, ThreadDescriptor>,
    starters: HashMap<String, StarterMessage>,
    fail_send_text: bool,
    notices: Vec<SentNotice>,
    texts: Vec<SentText>,
    edits: Vec<EditedText>,
    deleted: Vec<(String, String)>,
    tag_writes: Vec<(String, Vec<String>)>,
    removed_reactions: Vec<RemovedReaction>,
}

impl FakeState {
    fn next_id(&mut self) -> String {
        self.next_message_id += 1;
        format!("fake-msg-{}", self.next_message_id)
    }
}

/// Gateway double that keeps threads in memory and records every write.
#[derive(Debug, Default)]
pub struct FakeForumGateway {
    state: Mutex<FakeState>,
}

impl FakeForumGateway {
    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_bot_user_id(&self, user_id: impl Into<String>) {
        self.state().bot_user_id = Some(user_id.into());
    }

    pub fn insert_layout(&self, layout: ForumLayout) {
        self.state()
            .layouts
            .insert(layout.channel_id.clone(), layout);
    }

    pub fn insert_text_channel(&self, channel_id: impl Into<String>) {
        self.state().text_channels.insert(channel_id.into());
    }

    pub fn insert_thread(&self, thread: ThreadDescriptor) {
        self.state().threads.insert(thread.id.clone(), thread);
    }

    /// Sets the starter message; its id is the thread id, as on Discord.
    pub fn set_starter_content(&self, thread_id: &str, content: impl Into<String>) {
        self.state().starters.insert(
            thread_id.to_string(),
            StarterMessage {
                id: thread_id.to_string(),
                content: content.into(),
            },
        );
    }

    pub fn fail_send_text(&self, fail: bool) {
        self.state().fail_send_text = fail;
    }

    pub fn thread(&self, thread_id: &str) -> Option<ThreadDescriptor> {
        self.state().threads.get(thread_id).cloned()
    }

    pub fn notices(&self) -> Vec<SentNotice> {
        self.state().notices.clone()
    }

    pub fn notices_in(&self, channel_id: &str) -> Vec<Notice> {
        self.state()
            .notices
            .iter()
            .filter(|sent| sent.channel_id == channel_id)
            .map(|sent| sent.notice.clone())
            .collect()
    }

    pub fn texts(&self) -> Vec<SentText> {
        self.state().texts.clone()
    }

    pub fn edits(&self) -> Vec<EditedText> {
        self.state().edits.clone()
    }

    pub fn deleted(&self) -> Vec<(String, String)> {
        self.state().deleted.clone()
    }

    pub fn tag_writes(&self) -> Vec<(String, Vec<String>)> {
        self.state().tag_writes.clone()
    }

    pub fn removed_reactions(&self) -> Vec<RemovedReaction> {
        self.state().removed_reactions.clone()
    }
}

#[async_trait]
impl ChannelMessenger for FakeForumGateway {
    async fn send_notice(&self, channel_id: &str, notice: &Notice) -> GatewayResult<String> {
        let mut state = self.state();
        let message_id = state.next_id();
        state.notices.push(SentNotice {
            channel_id: channel_id.to_string(),
            message_id: message_id.clone(),
            notice: notice.clone(),
        });
        Ok(message_id)
    }

    async fn send_text(&self, channel_id: &str, content: &str) -> GatewayResult<String> {
        let mut state = self.state();
        if state.fail_send_text {
            return Err(GatewayError::Transport("send_text disabled".to_string()));
        }
        let message_id = state.next_id();
        state.texts.push(SentText {
            channel_id: channel_id.to_string(),
            message_id: message_id.clone(),
            content: content.to_string(),
        });
        Ok(message_id)
    }

    async fn edit_text(
        &self,
        channel_id: &str,
        message_id: &str,
        content: &str,
    ) -> GatewayResult<()> {
        self.state().edits.push(EditedText {
            channel_id: channel_id.to_string(),
            message_id: message_id.to_string(),
            content: content.to_string(),
        });
        Ok(())
    }

    async fn delete_message(&self, channel_id: &str, message_id: &str) -> GatewayResult<()> {
        self.state()
            .deleted
            .push((channel_id.to_string(), message_id.to_string()));
        Ok(())
    }
}

#[async_trait]
impl ForumGateway for FakeForumGateway {
    fn bot_user_id(&self) -> Option<String> {
        self.state().bot_user_id.clone()
    }

    async fn fetch_forum_layout(&self, channel_id: &str) -> GatewayResult<ForumLayout> {
        self.state()
            .layouts
            .get(channel_id)
            .cloned()
            .ok_or_else(|| GatewayError::NotFound(format!("channel {channel_id}")))
    }

    async fn is_text_channel(&self, channel_id: &str) -> GatewayResult<bool> {
        Ok(self.state().text_channels.contains(channel_id))
    }

    async fn fetch_thread(&self, thread_id: &str) -> GatewayResult<Option<ThreadDescriptor>> {
        Ok(self.thread(thread_id))
    }

    async fn fetch_starter_message(
        &self,
        thread_id: &str,
    ) -> GatewayResult<Option<StarterMessage>> {
        Ok(self.state().starters.get(thread_id).cloned())
    }

    async fn set_applied_tags(&self, thread_id: &str, tag_ids: &[String]) -> GatewayResult<()> {
        let mut state = self.state();
        state
            .tag_writes
            .push((thread_id.to_string(), tag_ids.to_vec()));
        if let Some(thread) = state.threads.get_mut(thread_id) {
            thread.applied_tags = tag_ids.to_vec();
        }
        Ok(())
    }

    async fn remove_reaction(
        &self,
        channel_id: &str,
        message_id: &str,
        user_id: &str,
        emoji: &ReactionEmoji,
    ) -> GatewayResult<()> {
        self.state().removed_reactions.push(RemovedReaction {
            channel_id: channel_id.to_string(),
            message_id: message_id.to_string(),
            user_id: user_id.to_string(),
            emoji: emoji.clone(),
        });
        Ok(())
    }
}
