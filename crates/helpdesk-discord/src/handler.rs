//! Gateway event handler feeding the router and the help-forum module.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use helpdesk_commands::{parse_command_trigger, CommandRouter};
use helpdesk_core::{Actor, ButtonAction, ChannelMessenger, IncomingMessage, ReactionEvent};
use helpdesk_forum::{ForumGateway, HelpForum};
use serenity::all::{
    ComponentInteraction, Context, CreateInteractionResponse, CreateInteractionResponseMessage,
    EventHandler, GuildChannel, Interaction, Message, PartialGuildChannel, Reaction, Ready, RoleId,
};

use crate::convert::{
    deleted_thread_descriptor, notice_components, notice_embed, reaction_emoji, thread_descriptor,
};
use crate::error::AdapterError;
use crate::gateway::SerenityGateway;
use crate::ids::role_id;
use crate::permissions::{granted_permissions, is_helper_capable};

pub struct HelpdeskHandler {
    gateway: Arc<SerenityGateway>,
    router: Arc<CommandRouter>,
    forum: Option<Arc<HelpForum>>,
    helper_role: RoleId,
}

impl HelpdeskHandler {
    /// `forum` is `None` when the help-forum module failed setup; commands
    /// registered by other modules keep working.
    pub fn new(
        gateway: Arc<SerenityGateway>,
        router: Arc<CommandRouter>,
        forum: Option<Arc<HelpForum>>,
        helper_role_id: &str,
    ) -> Result<Self, AdapterError> {
        Ok(Self {
            gateway,
            router,
            forum,
            helper_role: role_id(helper_role_id)?,
        })
    }

    async fn is_helper(&self, message: &Message) -> bool {
        let Some(guild_id) = message.guild_id else {
            return false;
        };
        let http = self.gateway.http();
        let member_roles = match message.member.as_ref() {
            Some(member) => member.roles.clone(),
            None => match guild_id.member(http, message.author.id).await {
                Ok(member) => member.roles,
                Err(error) => {
                    tracing::warn!(
                        actor_id = %message.author.id,
                        "failed to fetch member: {error}"
                    );
                    return false;
                }
            },
        };
        if member_roles.contains(&self.helper_role) {
            return true;
        }
        match guild_id.to_partial_guild(http).await {
            Ok(guild) => {
                let role_permissions = guild
                    .roles
                    .iter()
                    .map(|(id, role)| (*id, role.permissions))
                    .collect::<HashMap<_, _>>();
                let granted = granted_permissions(
                    guild_id,
                    guild.owner_id,
                    message.author.id,
                    &member_roles,
                    &role_permissions,
                );
                is_helper_capable(&member_roles, self.helper_role, granted)
            }
            Err(error) => {
                tracing::warn!(guild_id = %guild_id, "failed to fetch guild: {error}");
                false
            }
        }
    }

    async fn incoming_message(&self, message: &Message) -> IncomingMessage {
        let channel_id = message.channel_id.to_string();
        let thread = match self.gateway.fetch_thread(&channel_id).await {
            Ok(thread) => thread,
            Err(error) => {
                tracing::warn!(channel_id, "failed to resolve message channel: {error}");
                None
            }
        };
        IncomingMessage {
            id: message.id.to_string(),
            channel_id,
            author: Actor {
                id: message.author.id.to_string(),
                is_helper: self.is_helper(message).await,
                is_bot: message.author.bot,
            },
            content: message.content.clone(),
            thread,
        }
    }

    async fn handle_component(&self, ctx: &Context, component: &ComponentInteraction) {
        match ButtonAction::parse(&component.data.custom_id) {
            ButtonAction::DeleteMessage => {
                if let Err(error) = component
                    .create_response(&ctx.http, CreateInteractionResponse::Acknowledge)
                    .await
                {
                    tracing::warn!("failed to acknowledge delete button: {error}");
                }
                if let Err(error) = self
                    .gateway
                    .delete_message(
                        &component.channel_id.to_string(),
                        &component.message.id.to_string(),
                    )
                    .await
                {
                    tracing::warn!(
                        message_id = %component.message.id,
                        "failed to delete message: {error}"
                    );
                }
            }
            ButtonAction::RetryContentCheck {
                thread_id,
                message_id,
            } => {
                let Some(forum) = &self.forum else {
                    return;
                };
                let notice = match forum.recheck_content(&thread_id, &message_id).await {
                    Ok(notice) => notice,
                    Err(error) => {
                        tracing::warn!(thread_id, "content re-check failed: {error}");
                        return;
                    }
                };
                let response = CreateInteractionResponse::UpdateMessage(
                    CreateInteractionResponseMessage::new()
                        .embed(notice_embed(&notice))
                        .components(notice_components(&notice)),
                );
                if let Err(error) = component.create_response(&ctx.http, response).await {
                    tracing::warn!(thread_id, "failed to update content check: {error}");
                }
            }
            ButtonAction::Unknown(custom_id) => {
                tracing::debug!(custom_id, "ignoring unknown button");
            }
        }
    }
}

#[async_trait]
impl EventHandler for HelpdeskHandler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        self.gateway.set_bot_user_id(ready.user.id.to_string());
        tracing::info!(
            user = %ready.user.name,
            guilds = ready.guilds.len(),
            forum_enabled = self.forum.is_some(),
            "connected to discord"
        );
    }

    async fn message(&self, _ctx: Context, message: Message) {
        if message.author.bot {
            return;
        }
        let Some(trigger) = parse_command_trigger(&message.content, self.router.prefixes()) else {
            return;
        };
        if !self.router.has_alias(trigger.alias) {
            tracing::debug!(alias = trigger.alias, "unknown command");
            return;
        }
        let incoming = self.incoming_message(&message).await;
        let outcome = self.router.dispatch(&incoming).await;
        tracing::debug!(message_id = %incoming.id, ?outcome, "command dispatched");
    }

    async fn thread_create(&self, _ctx: Context, thread: GuildChannel) {
        let Some(forum) = &self.forum else {
            return;
        };
        let descriptor = thread_descriptor(&thread);
        if let Err(error) = forum.on_thread_created(&descriptor).await {
            tracing::error!(thread_id = %descriptor.id, "failed to handle new thread: {error}");
        }
    }

    async fn thread_delete(
        &self,
        _ctx: Context,
        thread: PartialGuildChannel,
        full_thread_data: Option<GuildChannel>,
    ) {
        let Some(forum) = &self.forum else {
            return;
        };
        let descriptor = deleted_thread_descriptor(&thread, full_thread_data.as_ref());
        if let Err(error) = forum.on_thread_deleted(&descriptor).await {
            tracing::error!(thread_id = %descriptor.id, "failed to handle deleted thread: {error}");
        }
    }

    async fn reaction_add(&self, _ctx: Context, reaction: Reaction) {
        let Some(forum) = &self.forum else {
            return;
        };
        let Some(emoji) = reaction_emoji(&reaction.emoji) else {
            return;
        };
        let event = ReactionEvent {
            channel_id: reaction.channel_id.to_string(),
            message_id: reaction.message_id.to_string(),
            user_id: reaction.user_id.map(|user| user.to_string()),
            emoji,
        };
        match forum.on_reaction_added(&event).await {
            Ok(outcome) => {
                tracing::debug!(thread_id = %event.channel_id, ?outcome, "reaction handled")
            }
            Err(error) => tracing::error!(
                thread_id = %event.channel_id,
                "failed to classify reaction: {error}"
            ),
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        if let Interaction::Component(component) = interaction {
            self.handle_component(&ctx, &component).await;
        }
    }
}
