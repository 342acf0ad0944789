//! Stored text snippets served by name.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use helpdesk_core::{ChannelMessenger, Notice};
use helpdesk_store::{get_json, set_json, Expiry, KvStore, StoreKey};
use serde::{Deserialize, Serialize};

use crate::router::{
    CommandHandler, CommandInvocation, CommandRegistration, CommandRouter, RouterError,
};

const SNIPPETS_NAMESPACE: &str = "snippets";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnippetContent {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    #[serde(default)]
    pub usage_count: u64,
    pub content: SnippetContent,
}

pub fn snippet_key(name: &str) -> Result<StoreKey> {
    StoreKey::new([SNIPPETS_NAMESPACE, name]).context("invalid snippet key")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SnippetAction {
    Show,
    Set,
    Delete,
}

struct SnippetCommand {
    action: SnippetAction,
    store: Arc<dyn KvStore>,
    messenger: Arc<dyn ChannelMessenger>,
}

/// Parses `<name> <title> | <description>`.
fn parse_snippet_definition(args: &str) -> Option<(&str, SnippetContent)> {
    let (name, rest) = args.trim().split_once(char::is_whitespace)?;
    let (title, description) = rest.split_once('|')?;
    let title = title.trim();
    let description = description.trim();
    if name.is_empty() || title.is_empty() || description.is_empty() {
        return None;
    }
    Some((
        name,
        SnippetContent {
            title: title.to_string(),
            description: description.to_string(),
        },
    ))
}

impl SnippetCommand {
    async fn reply(&self, channel_id: &str, notice: Notice) {
        if let Err(error) = self.messenger.send_notice(channel_id, &notice).await {
            tracing::warn!(channel_id, "failed to send snippet reply: {error}");
        }
    }

    async fn show(&self, invocation: CommandInvocation<'_>) -> Result<()> {
        let channel_id = invocation.message.channel_id.as_str();
        let name = invocation.args;
        tracing::info!(
            actor_id = %invocation.message.author.id,
            name,
            "snippet request"
        );
        if name.is_empty() {
            self.reply(channel_id, Notice::warning("Usage: snippet <name>").deletable())
                .await;
            return Ok(());
        }

        let key = snippet_key(name)?;
        let Some(mut snippet) = get_json::<Snippet>(self.store.as_ref(), &key).await? else {
            tracing::warn!(name, "snippet not found");
            self.reply(
                channel_id,
                Notice::warning(format!("No snippet named `{name}`.")).deletable(),
            )
            .await;
            return Ok(());
        };

        self.reply(
            channel_id,
            Notice::special(snippet.content.title.clone())
                .with_description(snippet.content.description.clone()),
        )
        .await;
        snippet.usage_count = snippet.usage_count.saturating_add(1);
        set_json(self.store.as_ref(), &key, &snippet, Expiry::Keep).await?;
        Ok(())
    }

    async fn set(&self, invocation: CommandInvocation<'_>) -> Result<()> {
        let channel_id = invocation.message.channel_id.as_str();
        let Some((name, content)) = parse_snippet_definition(invocation.args) else {
            self.reply(
                channel_id,
                Notice::warning("Usage: setsnippet <name> <title> | <description>").deletable(),
            )
            .await;
            return Ok(());
        };
        let key = snippet_key(name)?;
        let usage_count = get_json::<Snippet>(self.store.as_ref(), &key)
            .await?
            .map(|existing| existing.usage_count)
            .unwrap_or_default();
        set_json(
            self.store.as_ref(),
            &key,
            &Snippet {
                usage_count,
                content,
            },
            Expiry::Never,
        )
        .await?;
        tracing::info!(actor_id = %invocation.message.author.id, name, "snippet saved");
        self.reply(channel_id, Notice::success(format!("Saved snippet `{name}`.")))
            .await;
        Ok(())
    }

    async fn delete(&self, invocation: CommandInvocation<'_>) -> Result<()> {
        let channel_id = invocation.message.channel_id.as_str();
        let name = invocation.args;
        if name.is_empty() {
            self.reply(channel_id, Notice::warning("Usage: delsnippet <name>").deletable())
                .await;
            return Ok(());
        }
        let removed = self.store.delete(&snippet_key(name)?).await?;
        let notice = if removed {
            tracing::info!(actor_id = %invocation.message.author.id, name, "snippet deleted");
            Notice::success(format!("Deleted snippet `{name}`."))
        } else {
            Notice::warning(format!("No snippet named `{name}`.")).deletable()
        };
        self.reply(channel_id, notice).await;
        Ok(())
    }
}

#[async_trait]
impl CommandHandler for SnippetCommand {
    async fn handle(&self, invocation: CommandInvocation<'_>) -> Result<()> {
        match self.action {
            SnippetAction::Show => self.show(invocation).await,
            SnippetAction::Set => self.set(invocation).await,
            SnippetAction::Delete => self.delete(invocation).await,
        }
    }
}

/// Registers `snippet`, and the admin-only `setsnippet` / `delsnippet`.
pub fn register_snippet_commands(
    router: &mut CommandRouter,
    store: Arc<dyn KvStore>,
    messenger: Arc<dyn ChannelMessenger>,
) -> Result<(), RouterError> {
    let command = |action: SnippetAction| -> Arc<dyn CommandHandler> {
        Arc::new(SnippetCommand {
            action,
            store: Arc::clone(&store),
            messenger: Arc::clone(&messenger),
        })
    };
    router.register(
        CommandRegistration::new(["snippet"], command(SnippetAction::Show))
            .with_description("Post a stored snippet"),
    )?;
    router.register(
        CommandRegistration::new(["setsnippet"], command(SnippetAction::Set))
            .with_description("Create or replace a snippet")
            .admin_only(),
    )?;
    router.register(
        CommandRegistration::new(["delsnippet"], command(SnippetAction::Delete))
            .with_description("Delete a snippet")
            .admin_only(),
    )?;
    Ok(())
}
