//! Open/resolved transitions requested by thread commands.

use helpdesk_core::{channel_mention, user_mention, Actor, IncomingMessage, Notice};

use crate::error::ForumResult;
use crate::module::HelpForum;
use crate::record::ThreadRecord;
use crate::tags::{apply_status_tag, ThreadStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusChangeOutcome {
    NotHelpThread,
    Unauthorized,
    Changed {
        status: ThreadStatus,
        applied_tags: Vec<String>,
    },
}

/// Owner or helper-capable actors may act on a thread.
pub fn is_authorized(actor: &Actor, record: &ThreadRecord) -> bool {
    record.is_owner(&actor.id) || actor.is_helper
}

impl HelpForum {
    pub async fn change_status(
        &self,
        message: &IncomingMessage,
        status: ThreadStatus,
    ) -> ForumResult<StatusChangeOutcome> {
        let Some(thread) = self.help_thread(message) else {
            self.post(
                &message.channel_id,
                &Notice::warning("Can only be run in a help post!").deletable(),
            )
            .await;
            return Ok(StatusChangeOutcome::NotHelpThread);
        };

        let record = self
            .records
            .load_or_reconstruct(thread, self.gateway.as_ref())
            .await?;
        if !is_authorized(&message.author, &record) {
            tracing::info!(
                thread_id = %thread.id,
                actor_id = %message.author.id,
                "rejected status change from non-owner"
            );
            self.post(
                &thread.id,
                &Notice::warning("Only the asker can change the status of a help post!")
                    .deletable(),
            )
            .await;
            return Ok(StatusChangeOutcome::Unauthorized);
        }

        let applied_tags = apply_status_tag(
            &thread.applied_tags,
            &self.status_tags,
            status,
            self.config.max_applied_tags,
        );
        self.gateway
            .set_applied_tags(&thread.id, &applied_tags)
            .await?;
        tracing::info!(
            thread_id = %thread.id,
            actor_id = %message.author.id,
            owner_id = record.owner_id(),
            status = status.as_str(),
            "thread status changed"
        );

        let undo = match status {
            ThreadStatus::Resolved => "reopen",
            ThreadStatus::Open => "resolve",
        };
        let undo_hint = self.command_hint(undo);
        self.post(
            &thread.id,
            &Notice::info(format!("Thread marked as {}.", status.as_str()))
                .with_description(format!("Run `{undo_hint}` to {undo} the thread.")),
        )
        .await;

        if !record.is_owner(&message.author.id) {
            self.post(&thread.id, &self.owner_notice(&record, &message.author, status))
                .await;
        }

        if let Some(help_request_id) = record.help_request_message_id.as_deref() {
            let refreshed = thread.clone().with_applied_tags(applied_tags.clone());
            if let Err(error) = self
                .gateway
                .edit_text(
                    &self.config.help_requests_channel_id,
                    help_request_id,
                    &self.help_request_text(
                        &refreshed,
                        record.help_request_comment.as_deref(),
                    ),
                )
                .await
            {
                tracing::warn!(
                    thread_id = %thread.id,
                    help_request_id,
                    "failed to refresh help request: {error}"
                );
            }
        }

        Ok(StatusChangeOutcome::Changed {
            status,
            applied_tags,
        })
    }

    fn owner_notice(&self, record: &ThreadRecord, actor: &Actor, status: ThreadStatus) -> Notice {
        let notice = match status {
            ThreadStatus::Resolved => Notice::info("Thread marked as resolved by a helper.")
                .with_description(format!(
                    "{} marked this thread as resolved. If your issue is not resolved, you can \
                     reopen this thread by running `{}`. If you have a different question, make \
                     a new post in {}.",
                    actor.mention(),
                    self.command_hint("reopen"),
                    channel_mention(&self.config.forum_channel_id)
                )),
            ThreadStatus::Open => Notice::info("Thread reopened by a helper.").with_description(
                format!(
                    "{} reopened this thread. Run `{}` once your question is answered.",
                    actor.mention(),
                    self.command_hint("resolve")
                ),
            ),
        };
        notice.with_content(user_mention(record.owner_id()))
    }
}
