//! Help-forum module: setup and thread lifecycle events.

use std::sync::Arc;

use helpdesk_commands::CommandRouter;
use helpdesk_core::{
    channel_mention, role_mention, Clock, IncomingMessage, Notice, ThreadDescriptor,
};
use helpdesk_store::KvStore;

use crate::commands::register_forum_commands;
use crate::config::HelpForumConfig;
use crate::content_gate::evaluate_content;
use crate::error::{ForumError, ForumResult};
use crate::gateway::ForumGateway;
use crate::record::{ThreadRecord, ThreadRecords};
use crate::tags::{apply_status_tag, ForumLayout, StatusTags, ThreadStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
/// Enumerates supported `ThreadCreatedOutcome` values.
pub enum ThreadCreatedOutcome {
    /// Not a help thread, or no owner was reported.
    Ignored,
    /// Record written and status set to open. `content_passed` is `None`
    /// when the starter message could not be fetched.
    Tracked { content_passed: Option<bool> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThreadDeletedOutcome {
    Ignored,
    Removed {
        help_request_deleted: bool,
    },
}

/// Shared state of the help-forum module.
pub struct HelpForum {
    pub(crate) config: HelpForumConfig,
    pub(crate) layout: ForumLayout,
    pub(crate) status_tags: StatusTags,
    pub(crate) gateway: Arc<dyn ForumGateway>,
    pub(crate) records: ThreadRecords,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) command_prefix: String,
}

impl HelpForum {
    /// Validates the configured channels and tags and registers the forum
    /// commands.
    ///
    /// Any error means the module must not be used; other modules keep
    /// running.
    pub async fn setup(
        config: HelpForumConfig,
        gateway: Arc<dyn ForumGateway>,
        store: Arc<dyn KvStore>,
        clock: Arc<dyn Clock>,
        router: &mut CommandRouter,
    ) -> ForumResult<Arc<Self>> {
        let forum = Arc::new(
            Self::connect(
                config,
                gateway,
                store,
                clock,
                router.primary_prefix().to_string(),
            )
            .await?,
        );
        register_forum_commands(&forum, router)?;
        tracing::info!(
            forum_channel_id = %forum.config.forum_channel_id,
            help_requests_channel_id = %forum.config.help_requests_channel_id,
            tags = forum.layout.available_tags.len(),
            record_expiry = forum.config.record_expiry.as_str(),
            "help forum module ready"
        );
        Ok(forum)
    }

    /// Resolves channels and status tags without registering commands.
    pub async fn connect(
        config: HelpForumConfig,
        gateway: Arc<dyn ForumGateway>,
        store: Arc<dyn KvStore>,
        clock: Arc<dyn Clock>,
        command_prefix: String,
    ) -> ForumResult<Self> {
        let layout = gateway
            .fetch_forum_layout(&config.forum_channel_id)
            .await?;
        if !layout.is_forum {
            return Err(ForumError::NotAForum {
                channel_id: config.forum_channel_id.clone(),
            });
        }
        let find_tag = |name: &str| -> ForumResult<String> {
            layout
                .tag_by_name(name)
                .map(|tag| tag.id.clone())
                .ok_or_else(|| ForumError::TagNotFound {
                    name: name.to_string(),
                    channel_id: config.forum_channel_id.clone(),
                })
        };
        let status_tags = StatusTags {
            open: find_tag(&config.open_tag_name)?,
            resolved: find_tag(&config.resolved_tag_name)?,
        };
        if !gateway
            .is_text_channel(&config.help_requests_channel_id)
            .await?
        {
            return Err(ForumError::NotTextChannel(
                config.help_requests_channel_id.clone(),
            ));
        }

        let records = ThreadRecords::new(store, config.record_expiry);
        Ok(Self {
            config,
            layout,
            status_tags,
            gateway,
            records,
            clock,
            command_prefix,
        })
    }

    pub fn config(&self) -> &HelpForumConfig {
        &self.config
    }

    pub fn layout(&self) -> &ForumLayout {
        &self.layout
    }

    pub fn status_tags(&self) -> &StatusTags {
        &self.status_tags
    }

    pub fn records(&self) -> &ThreadRecords {
        &self.records
    }

    pub fn is_help_thread(&self, thread: &ThreadDescriptor) -> bool {
        thread.is_child_of(&self.config.forum_channel_id)
    }

    pub(crate) fn help_thread<'a>(
        &self,
        message: &'a IncomingMessage,
    ) -> Option<&'a ThreadDescriptor> {
        message
            .thread
            .as_ref()
            .filter(|thread| self.is_help_thread(thread))
    }

    /// `<prefix><alias>` as users should type it.
    pub(crate) fn command_hint(&self, alias: &str) -> String {
        format!("{}{alias}", self.command_prefix)
    }

    /// Posts a notice, logging delivery failures.
    pub(crate) async fn post(&self, channel_id: &str, notice: &Notice) -> Option<String> {
        match self.gateway.send_notice(channel_id, notice).await {
            Ok(message_id) => Some(message_id),
            Err(error) => {
                tracing::warn!(channel_id, title = %notice.title, "failed to post notice: {error}");
                None
            }
        }
    }

    /// Text of the cross-channel help request for `thread`.
    pub fn help_request_text(&self, thread: &ThreadDescriptor, comment: Option<&str>) -> String {
        let tags = self.layout.render_applied_tags(&thread.applied_tags);
        let mut text = format!(
            "{} {}",
            role_mention(&self.config.helper_role_id),
            channel_mention(&thread.id)
        );
        if !tags.is_empty() {
            text.push_str(&format!(" ({})", tags.join(", ")));
        }
        if let Some(comment) = comment.map(str::trim).filter(|comment| !comment.is_empty()) {
            for line in comment.lines() {
                text.push_str("\n> ");
                text.push_str(line);
            }
        }
        text
    }

    pub async fn on_thread_created(
        &self,
        thread: &ThreadDescriptor,
    ) -> ForumResult<ThreadCreatedOutcome> {
        if !self.is_help_thread(thread) {
            return Ok(ThreadCreatedOutcome::Ignored);
        }
        let Some(owner_id) = thread.owner_id.as_deref() else {
            tracing::warn!(thread_id = %thread.id, "ignoring help thread without owner");
            return Ok(ThreadCreatedOutcome::Ignored);
        };
        tracing::info!(thread_id = %thread.id, owner_id, "received new question");
        self.records
            .create(&thread.id, &ThreadRecord::new(owner_id))
            .await?;

        let tags = apply_status_tag(
            &thread.applied_tags,
            &self.status_tags,
            ThreadStatus::Open,
            self.config.max_applied_tags,
        );
        if let Err(error) = self.gateway.set_applied_tags(&thread.id, &tags).await {
            tracing::warn!(thread_id = %thread.id, "failed to apply open tag: {error}");
        }

        let starter = match self.gateway.fetch_starter_message(&thread.id).await {
            Ok(Some(starter)) => starter,
            Ok(None) => {
                tracing::error!(thread_id = %thread.id, "starter message not found");
                return Ok(ThreadCreatedOutcome::Tracked {
                    content_passed: None,
                });
            }
            Err(error) => {
                tracing::error!(thread_id = %thread.id, "failed to fetch starter message: {error}");
                return Ok(ThreadCreatedOutcome::Tracked {
                    content_passed: None,
                });
            }
        };
        let report = evaluate_content(&starter.content, self.config.content_thresholds);
        let notice = report.notice(&thread.id, &starter.id, &self.command_hint("helpers"));
        self.post(&thread.id, &notice).await;
        Ok(ThreadCreatedOutcome::Tracked {
            content_passed: Some(report.passes()),
        })
    }

    /// Re-runs the content check for a retry button and returns the notice to
    /// show in place of the button's message.
    pub async fn recheck_content(&self, thread_id: &str, message_id: &str) -> ForumResult<Notice> {
        let starter = self
            .gateway
            .fetch_starter_message(thread_id)
            .await?
            .ok_or_else(|| ForumError::StarterMessageMissing(thread_id.to_string()))?;
        if starter.id != message_id {
            tracing::debug!(
                thread_id,
                message_id,
                starter_id = %starter.id,
                "retry button refers to a different message"
            );
        }
        let report = evaluate_content(&starter.content, self.config.content_thresholds);
        tracing::info!(
            thread_id,
            passed = report.passes(),
            char_count = report.char_count,
            word_count = report.word_count,
            "content re-checked"
        );
        Ok(report.notice(thread_id, &starter.id, &self.command_hint("helpers")))
    }

    pub async fn on_thread_deleted(
        &self,
        thread: &ThreadDescriptor,
    ) -> ForumResult<ThreadDeletedOutcome> {
        if !self.is_help_thread(thread) {
            return Ok(ThreadDeletedOutcome::Ignored);
        }
        let record = self.records.load(&thread.id).await?;
        let mut help_request_deleted = false;
        if let Some(message_id) = record
            .as_ref()
            .and_then(|record| record.help_request_message_id.as_deref())
        {
            match self
                .gateway
                .delete_message(&self.config.help_requests_channel_id, message_id)
                .await
            {
                Ok(()) => help_request_deleted = true,
                Err(error) => tracing::warn!(
                    thread_id = %thread.id,
                    message_id,
                    "failed to delete help request: {error}"
                ),
            }
        }
        self.records.delete(&thread.id).await?;
        tracing::info!(
            thread_id = %thread.id,
            owner_id = record.as_ref().map(ThreadRecord::owner_id),
            "help thread deleted"
        );
        Ok(ThreadDeletedOutcome::Removed {
            help_request_deleted,
        })
    }
}
