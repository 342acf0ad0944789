//! Applies classification tags from emoji reactions on a thread's starter post.

use helpdesk_core::{GatewayResult, ReactionEvent};

use crate::error::ForumResult;
use crate::module::HelpForum;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifyOutcome {
    /// Not a reaction on the starter post of a help thread.
    Ignored,
    NoMatchingTag,
    AlreadyApplied { tag_id: String },
    AtCapacity { tag_id: String },
    TagApplied { tag_id: String },
}

impl HelpForum {
    /// Every reaction that reaches tag matching is removed afterwards, even
    /// when writing the tag fails.
    pub async fn on_reaction_added(
        &self,
        reaction: &ReactionEvent,
    ) -> ForumResult<ClassifyOutcome> {
        let Some(user_id) = reaction.user_id.as_deref() else {
            return Ok(ClassifyOutcome::Ignored);
        };
        if self.gateway.bot_user_id().as_deref() == Some(user_id) {
            return Ok(ClassifyOutcome::Ignored);
        }
        if reaction.message_id != reaction.channel_id {
            return Ok(ClassifyOutcome::Ignored);
        }
        let Some(thread) = self.gateway.fetch_thread(&reaction.channel_id).await? else {
            return Ok(ClassifyOutcome::Ignored);
        };
        if !self.is_help_thread(&thread) {
            return Ok(ClassifyOutcome::Ignored);
        }
        let starter = self.gateway.fetch_starter_message(&thread.id).await?;
        if starter.map(|starter| starter.id).as_deref() != Some(reaction.message_id.as_str()) {
            return Ok(ClassifyOutcome::Ignored);
        }

        let mut tag_write: GatewayResult<()> = Ok(());
        let outcome = match self.layout.classification_tag_for(&reaction.emoji) {
            None => ClassifyOutcome::NoMatchingTag,
            Some(tag) if thread.applied_tags.contains(&tag.id) => ClassifyOutcome::AlreadyApplied {
                tag_id: tag.id.clone(),
            },
            Some(tag) if thread.applied_tags.len() >= self.config.max_applied_tags => {
                ClassifyOutcome::AtCapacity {
                    tag_id: tag.id.clone(),
                }
            }
            Some(tag) => {
                let mut tags = thread.applied_tags.clone();
                tags.push(tag.id.clone());
                tag_write = self.gateway.set_applied_tags(&thread.id, &tags).await;
                if tag_write.is_ok() {
                    tracing::info!(
                        thread_id = %thread.id,
                        tag = %tag.name,
                        actor_id = user_id,
                        "classification tag applied"
                    );
                }
                ClassifyOutcome::TagApplied {
                    tag_id: tag.id.clone(),
                }
            }
        };

        if let Err(error) = self
            .gateway
            .remove_reaction(
                &reaction.channel_id,
                &reaction.message_id,
                user_id,
                &reaction.emoji,
            )
            .await
        {
            tracing::warn!(thread_id = %thread.id, "failed to remove reaction: {error}");
        }
        tag_write?;
        Ok(outcome)
    }
}
