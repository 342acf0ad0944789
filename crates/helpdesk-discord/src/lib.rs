//! Discord adapter: serenity gateway events in, [`ForumGateway`] calls out.
//!
//! [`ForumGateway`]: helpdesk_forum::ForumGateway

pub mod convert;
pub mod error;
pub mod gateway;
pub mod handler;
pub mod ids;
pub mod permissions;

pub use error::AdapterError;
pub use gateway::SerenityGateway;
pub use handler::HelpdeskHandler;

use serenity::all::{Client, GatewayIntents};

/// Intents needed for commands, thread lifecycle and reactions.
pub fn helpdesk_intents() -> GatewayIntents {
    GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILD_MESSAGE_REACTIONS
}

/// Connects to the gateway and runs until the connection ends or Ctrl-C.
pub async fn run_client(token: &str, handler: HelpdeskHandler) -> Result<(), AdapterError> {
    let mut client = Client::builder(token, helpdesk_intents())
        .event_handler(handler)
        .await?;
    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("shutdown requested");
            shard_manager.shutdown_all().await;
        }
    });
    client.start().await?;
    Ok(())
}
