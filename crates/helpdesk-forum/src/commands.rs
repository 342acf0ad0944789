//! Router bindings for the forum commands.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use helpdesk_commands::{
    CommandHandler, CommandInvocation, CommandRegistration, CommandRouter, RouterError,
};

use crate::module::HelpForum;
use crate::tags::ThreadStatus;

pub const HELPERS_ALIASES: [&str; 2] = ["helper", "helpers"];
pub const RESOLVE_ALIASES: [&str; 6] = ["resolved", "resolve", "close", "closed", "done", "solved"];
pub const REOPEN_ALIASES: [&str; 4] = ["reopen", "open", "unresolved", "unresolve"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ForumAction {
    PingHelpers,
    SetStatus(ThreadStatus),
}

struct ForumCommand {
    forum: Arc<HelpForum>,
    action: ForumAction,
}

#[async_trait]
impl CommandHandler for ForumCommand {
    async fn handle(&self, invocation: CommandInvocation<'_>) -> Result<()> {
        let message = invocation.message;
        match self.action {
            ForumAction::PingHelpers => {
                let outcome = self
                    .forum
                    .ping_helpers(message, invocation.args)
                    .await
                    .with_context(|| format!("helpers command failed in {}", message.channel_id))?;
                tracing::debug!(alias = invocation.alias, ?outcome, "helpers command finished");
            }
            ForumAction::SetStatus(status) => {
                let outcome = self
                    .forum
                    .change_status(message, status)
                    .await
                    .with_context(|| {
                        format!(
                            "failed to mark {} as {}",
                            message.channel_id,
                            status.as_str()
                        )
                    })?;
                tracing::debug!(alias = invocation.alias, ?outcome, "status command finished");
            }
        }
        Ok(())
    }
}

pub fn register_forum_commands(
    forum: &Arc<HelpForum>,
    router: &mut CommandRouter,
) -> Result<(), RouterError> {
    let command = |action: ForumAction| -> Arc<dyn CommandHandler> {
        Arc::new(ForumCommand {
            forum: Arc::clone(forum),
            action,
        })
    };
    router.register(
        CommandRegistration::new(HELPERS_ALIASES, command(ForumAction::PingHelpers))
            .with_description("Ping helpers to this help post"),
    )?;
    router.register(
        CommandRegistration::new(
            RESOLVE_ALIASES,
            command(ForumAction::SetStatus(ThreadStatus::Resolved)),
        )
        .with_description("Mark this help post as resolved"),
    )?;
    router.register(
        CommandRegistration::new(
            REOPEN_ALIASES,
            command(ForumAction::SetStatus(ThreadStatus::Open)),
        )
        .with_description("Reopen this help post"),
    )?;
    Ok(())
}
