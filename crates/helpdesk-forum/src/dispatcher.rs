//! Helper pings from help threads into the help-requests channel.

use helpdesk_core::{discord_relative_timestamp, IncomingMessage, Notice};

use crate::error::ForumResult;
use crate::module::HelpForum;
use crate::status::is_authorized;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PingOutcome {
    NotHelpThread,
    Unauthorized,
    CoolingDown {
        next_allowed_ms: u64,
    },
    Dispatched {
        /// `None` when the help-requests channel could not be reached.
        help_request_message_id: Option<String>,
    },
}

impl HelpForum {
    /// Earliest time the owner may ping helpers again.
    pub fn next_ping_allowed_ms(
        &self,
        last_ping_ms: Option<u64>,
        created_at_ms: Option<u64>,
    ) -> u64 {
        last_ping_ms
            .or(created_at_ms)
            .unwrap_or_else(|| self.clock.now_unix_ms())
            .saturating_add(self.config.helpers_ping_cooldown_ms())
    }

    /// Handles `helpers`. The record update is a plain read-modify-write:
    /// concurrent pings on one thread race and the last write wins.
    pub async fn ping_helpers(
        &self,
        message: &IncomingMessage,
        comment: &str,
    ) -> ForumResult<PingOutcome> {
        let Some(thread) = self.help_thread(message) else {
            self.post(
                &message.channel_id,
                &Notice::warning("You may only ping helpers from a help post!").deletable(),
            )
            .await;
            return Ok(PingOutcome::NotHelpThread);
        };

        let mut record = self
            .records
            .load_or_reconstruct(thread, self.gateway.as_ref())
            .await?;
        if !is_authorized(&message.author, &record) {
            self.post(
                &thread.id,
                &Notice::warning("Only the asker can ping helpers!").deletable(),
            )
            .await;
            return Ok(PingOutcome::Unauthorized);
        }

        let now = self.clock.now_unix_ms();
        let next_allowed_ms =
            self.next_ping_allowed_ms(record.last_helpers_ping, thread.created_at_ms);
        if record.is_owner(&message.author.id) && now < next_allowed_ms {
            tracing::info!(
                thread_id = %thread.id,
                actor_id = %message.author.id,
                next_allowed_ms,
                "helper ping on cooldown"
            );
            self.post(
                &thread.id,
                &Notice::warning("Please wait a bit longer.").with_description(format!(
                    "You can ping helpers {}.",
                    discord_relative_timestamp(next_allowed_ms)
                )),
            )
            .await;
            return Ok(PingOutcome::CoolingDown { next_allowed_ms });
        }

        let comment = Some(comment.trim())
            .filter(|comment| message.author.is_helper && !comment.is_empty());
        let text = self.help_request_text(thread, comment);
        let help_request_message_id = match self
            .gateway
            .send_text(&self.config.help_requests_channel_id, &text)
            .await
        {
            Ok(message_id) => Some(message_id),
            Err(error) => {
                tracing::warn!(thread_id = %thread.id, "failed to send help request: {error}");
                None
            }
        };
        self.post(&thread.id, &Notice::special("Helpers are on the way!"))
            .await;

        record.last_helpers_ping = Some(now);
        if let Some(message_id) = &help_request_message_id {
            record.help_request_message_id = Some(message_id.clone());
            record.help_request_comment = comment.map(str::to_string);
        }
        self.records.save(&thread.id, &record).await?;
        tracing::info!(
            thread_id = %thread.id,
            actor_id = %message.author.id,
            owner_id = record.owner_id(),
            "helpers pinged"
        );
        Ok(PingOutcome::Dispatched {
            help_request_message_id,
        })
    }
}
