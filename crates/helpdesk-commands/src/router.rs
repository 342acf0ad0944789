//! Prefix + alias command routing with admin gating.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use helpdesk_core::IncomingMessage;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouterError {
    #[error("at least one command prefix is required")]
    NoPrefixes,
    #[error("command prefix must not be empty")]
    EmptyPrefix,
    #[error("command registration needs at least one alias")]
    NoAliases,
    #[error("command alias '{0}' is already registered")]
    DuplicateAlias(String),
    #[error("command alias '{0}' must be non-empty and contain no whitespace")]
    InvalidAlias(String),
}

/// A parsed `<prefix><alias> <args>` message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandTrigger<'a> {
    pub prefix: &'a str,
    pub alias: &'a str,
    pub args: &'a str,
}

/// Splits off the first whitespace-delimited token and matches it against `prefixes`.
///
/// The first prefix (in configured order) the token starts with wins; aliases
/// are case-sensitive.
pub fn parse_command_trigger<'a>(
    content: &'a str,
    prefixes: &'a [String],
) -> Option<CommandTrigger<'a>> {
    let (token, rest) = match content.find(char::is_whitespace) {
        Some(index) => content.split_at(index),
        None => (content, ""),
    };
    let prefix = prefixes
        .iter()
        .find(|prefix| !prefix.is_empty() && token.starts_with(prefix.as_str()))?;
    Some(CommandTrigger {
        prefix: prefix.as_str(),
        alias: &token[prefix.len()..],
        args: rest.trim(),
    })
}

/// Data handed to a command handler.
#[derive(Debug, Clone, Copy)]
pub struct CommandInvocation<'a> {
    pub alias: &'a str,
    pub args: &'a str,
    pub message: &'a IncomingMessage,
}

#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn handle(&self, invocation: CommandInvocation<'_>) -> anyhow::Result<()>;
}

pub struct CommandRegistration {
    pub aliases: Vec<String>,
    pub description: Option<String>,
    pub admin: bool,
    pub handler: Arc<dyn CommandHandler>,
}

impl CommandRegistration {
    pub fn new<I, S>(aliases: I, handler: Arc<dyn CommandHandler>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            aliases: aliases.into_iter().map(Into::into).collect(),
            description: None,
            admin: false,
            handler,
        }
    }

    pub fn admin_only(mut self) -> Self {
        self.admin = true;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

struct RegisteredCommand {
    aliases: Vec<String>,
    description: Option<String>,
    admin: bool,
    handler: Arc<dyn CommandHandler>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Enumerates supported `DispatchOutcome` values.
pub enum DispatchOutcome {
    NotCommand,
    IgnoredBot,
    UnknownAlias { alias: String },
    AdminOnly { alias: String },
    Handled { alias: String },
    Failed { alias: String, error: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSummary {
    pub aliases: Vec<String>,
    pub description: Option<String>,
    pub admin: bool,
}

/// Command registry built once at startup and shared immutably afterwards.
pub struct CommandRouter {
    prefixes: Vec<String>,
    admins: HashSet<String>,
    commands: HashMap<String, Arc<RegisteredCommand>>,
}

impl CommandRouter {
    pub fn new(
        prefixes: Vec<String>,
        admins: impl IntoIterator<Item = String>,
    ) -> Result<Self, RouterError> {
        if prefixes.is_empty() {
            return Err(RouterError::NoPrefixes);
        }
        if prefixes.iter().any(|prefix| prefix.trim().is_empty()) {
            return Err(RouterError::EmptyPrefix);
        }
        Ok(Self {
            prefixes,
            admins: admins.into_iter().collect(),
            commands: HashMap::new(),
        })
    }

    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    /// Prefix used when rendering command hints such as `!reopen`.
    pub fn primary_prefix(&self) -> &str {
        self.prefixes.first().map(String::as_str).unwrap_or_default()
    }

    pub fn is_admin(&self, user_id: &str) -> bool {
        self.admins.contains(user_id)
    }

    pub fn register(&mut self, registration: CommandRegistration) -> Result<(), RouterError> {
        if registration.aliases.is_empty() {
            return Err(RouterError::NoAliases);
        }
        let mut seen = HashSet::new();
        for alias in &registration.aliases {
            if alias.is_empty() || alias.chars().any(char::is_whitespace) {
                return Err(RouterError::InvalidAlias(alias.clone()));
            }
            if self.commands.contains_key(alias) || !seen.insert(alias.as_str()) {
                return Err(RouterError::DuplicateAlias(alias.clone()));
            }
        }

        let command = Arc::new(RegisteredCommand {
            aliases: registration.aliases.clone(),
            description: registration.description,
            admin: registration.admin,
            handler: registration.handler,
        });
        for alias in registration.aliases {
            self.commands.insert(alias, Arc::clone(&command));
        }
        Ok(())
    }

    pub fn has_alias(&self, alias: &str) -> bool {
        self.commands.contains_key(alias)
    }

    /// One entry per registered command, sorted by first alias.
    pub fn summaries(&self) -> Vec<CommandSummary> {
        let mut seen = BTreeSet::new();
        let mut summaries = Vec::new();
        for command in self.commands.values() {
            let first = command.aliases.first().cloned().unwrap_or_default();
            if seen.insert(first) {
                summaries.push(CommandSummary {
                    aliases: command.aliases.clone(),
                    description: command.description.clone(),
                    admin: command.admin,
                });
            }
        }
        summaries.sort_by(|left, right| left.aliases.cmp(&right.aliases));
        summaries
    }

    /// Routes one message. Handler failures are logged, never propagated.
    pub async fn dispatch(&self, message: &IncomingMessage) -> DispatchOutcome {
        if message.author.is_bot {
            return DispatchOutcome::IgnoredBot;
        }
        let Some(trigger) = parse_command_trigger(&message.content, &self.prefixes) else {
            return DispatchOutcome::NotCommand;
        };
        let alias = trigger.alias.to_string();
        let Some(command) = self.commands.get(trigger.alias) else {
            return DispatchOutcome::UnknownAlias { alias };
        };
        if command.admin && !self.is_admin(&message.author.id) {
            tracing::debug!(
                alias = %alias,
                actor_id = %message.author.id,
                "ignoring admin command from non-admin"
            );
            return DispatchOutcome::AdminOnly { alias };
        }

        let invocation = CommandInvocation {
            alias: trigger.alias,
            args: trigger.args,
            message,
        };
        match command.handler.handle(invocation).await {
            Ok(()) => DispatchOutcome::Handled { alias },
            Err(error) => {
                tracing::error!(
                    alias = %alias,
                    message_id = %message.id,
                    channel_id = %message.channel_id,
                    "command handler failed: {error:#}"
                );
                DispatchOutcome::Failed {
                    alias,
                    error: format!("{error:#}"),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use anyhow::bail;
    use helpdesk_core::Actor;

    use super::*;

    #[derive(Default)]
    struct RecordingHandler {
        calls: Mutex<Vec<(String, String)>>,
        fail: bool,
    }

    #[async_trait]
    impl CommandHandler for RecordingHandler {
        async fn handle(&self, invocation: CommandInvocation<'_>) -> anyhow::Result<()> {
            self.calls
                .lock()
                .expect("calls lock")
                .push((invocation.alias.to_string(), invocation.args.to_string()));
            if self.fail {
                bail!("handler exploded");
            }
            Ok(())
        }
    }

    fn prefixes(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    fn message(author: Actor, content: &str) -> IncomingMessage {
        IncomingMessage {
            id: "m1".to_string(),
            channel_id: "c1".to_string(),
            author,
            content: content.to_string(),
            thread: None,
        }
    }

    #[test]
    fn unit_parse_command_trigger_splits_prefix_alias_and_args() {
        let configured = prefixes(&["!", "?"]);
        let trigger = parse_command_trigger("!helpers   please look  ", &configured)
            .expect("trigger");
        assert_eq!(trigger.prefix, "!");
        assert_eq!(trigger.alias, "helpers");
        assert_eq!(trigger.args, "please look");

        let trigger = parse_command_trigger("?resolve", &configured).expect("trigger");
        assert_eq!(trigger.alias, "resolve");
        assert_eq!(trigger.args, "");

        let trigger = parse_command_trigger("!snippet\nintro", &configured).expect("trigger");
        assert_eq!(trigger.alias, "snippet");
        assert_eq!(trigger.args, "intro");

        assert!(parse_command_trigger("hello !resolve", &configured).is_none());
        assert!(parse_command_trigger("", &configured).is_none());
    }

    #[test]
    fn unit_parse_command_trigger_uses_first_matching_prefix_in_order() {
        let configured = prefixes(&["!", "!!"]);
        let trigger = parse_command_trigger("!!done", &configured).expect("trigger");
        assert_eq!(trigger.prefix, "!");
        assert_eq!(trigger.alias, "!done");
    }

    #[test]
    fn unit_router_rejects_invalid_configuration_and_duplicates() {
        assert_eq!(
            CommandRouter::new(Vec::new(), Vec::new()).err(),
            Some(RouterError::NoPrefixes)
        );
        assert_eq!(
            CommandRouter::new(prefixes(&["!", " "]), Vec::new()).err(),
            Some(RouterError::EmptyPrefix)
        );

        let mut router = CommandRouter::new(prefixes(&["!"]), Vec::new()).expect("router");
        let handler: Arc<dyn CommandHandler> = Arc::new(RecordingHandler::default());
        router
            .register(CommandRegistration::new(["resolve", "done"], handler.clone()))
            .expect("register");
        assert_eq!(
            router.register(CommandRegistration::new(["done"], handler.clone())),
            Err(RouterError::DuplicateAlias("done".to_string()))
        );
        assert_eq!(
            router.register(CommandRegistration::new(["a", "a"], handler.clone())),
            Err(RouterError::DuplicateAlias("a".to_string()))
        );
        assert_eq!(
            router.register(CommandRegistration::new(["two words"], handler.clone())),
            Err(RouterError::InvalidAlias("two words".to_string()))
        );
        assert_eq!(
            router.register(CommandRegistration::new(Vec::<String>::new(), handler)),
            Err(RouterError::NoAliases)
        );
        assert!(router.has_alias("resolve"));
        assert!(!router.has_alias("a"));
        assert_eq!(router.summaries().len(), 1);
    }

    #[tokio::test]
    async fn functional_dispatch_invokes_handler_with_args() {
        let handler = Arc::new(RecordingHandler::default());
        let mut router = CommandRouter::new(prefixes(&["!"]), Vec::new()).expect("router");
        router
            .register(CommandRegistration::new(["helper", "helpers"], handler.clone()))
            .expect("register");

        let outcome = router
            .dispatch(&message(Actor::member("u1"), "!helpers need eyes"))
            .await;
        assert_eq!(
            outcome,
            DispatchOutcome::Handled {
                alias: "helpers".to_string()
            }
        );
        assert_eq!(
            handler.calls.lock().expect("calls").as_slice(),
            &[("helpers".to_string(), "need eyes".to_string())]
        );

        assert_eq!(
            router.dispatch(&message(Actor::member("u1"), "!Helpers")).await,
            DispatchOutcome::UnknownAlias {
                alias: "Helpers".to_string()
            }
        );
        assert_eq!(
            router.dispatch(&message(Actor::member("u1"), "helpers")).await,
            DispatchOutcome::NotCommand
        );
    }

    #[tokio::test]
    async fn functional_dispatch_gates_admin_commands_and_ignores_bots() {
        let handler = Arc::new(RecordingHandler::default());
        let mut router =
            CommandRouter::new(prefixes(&["!"]), vec!["admin-1".to_string()]).expect("router");
        router
            .register(CommandRegistration::new(["setsnippet"], handler.clone()).admin_only())
            .expect("register");

        assert_eq!(
            router.dispatch(&message(Actor::member("u1"), "!setsnippet x")).await,
            DispatchOutcome::AdminOnly {
                alias: "setsnippet".to_string()
            }
        );
        assert!(handler.calls.lock().expect("calls").is_empty());

        assert!(matches!(
            router
                .dispatch(&message(Actor::member("admin-1"), "!setsnippet x"))
                .await,
            DispatchOutcome::Handled { .. }
        ));

        let mut bot = Actor::member("admin-1");
        bot.is_bot = true;
        assert_eq!(
            router.dispatch(&message(bot, "!setsnippet x")).await,
            DispatchOutcome::IgnoredBot
        );
        assert_eq!(handler.calls.lock().expect("calls").len(), 1);
    }

    #[tokio::test]
    async fn regression_dispatch_reports_handler_failures_without_panicking() {
        let handler = Arc::new(RecordingHandler {
            fail: true,
            ..RecordingHandler::default()
        });
        let mut router = CommandRouter::new(prefixes(&["!"]), Vec::new()).expect("router");
        router
            .register(CommandRegistration::new(["resolve"], handler))
            .expect("register");
        let outcome = router
            .dispatch(&message(Actor::member("u1"), "!resolve"))
            .await;
        assert_eq!(
            outcome,
            DispatchOutcome::Failed {
                alias: "resolve".to_string(),
                error: "handler exploded".to_string(),
            }
        );
    }
}
