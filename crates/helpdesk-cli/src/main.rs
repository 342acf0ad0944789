use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use helpdesk_cli::{build_router, init_tracing, open_store, Cli};
use helpdesk_core::{ChannelMessenger, Clock, SystemClock};
use helpdesk_discord::{run_client, HelpdeskHandler, SerenityGateway};
use helpdesk_forum::{ForumGateway, HelpForum};
use serenity::all::Http;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    tracing::info!(
        guild_id = %cli.guild_id,
        prefixes = ?cli.command_prefixes,
        admins = cli.admins.len(),
        "starting helpdesk"
    );

    let store = open_store(&cli)?;
    let gateway = Arc::new(SerenityGateway::new(Arc::new(Http::new(&cli.discord_token))));
    let messenger: Arc<dyn ChannelMessenger> = gateway.clone();
    let mut router = build_router(&cli, Arc::clone(&store), messenger)?;

    let forum_gateway: Arc<dyn ForumGateway> = gateway.clone();
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let forum = match HelpForum::setup(
        cli.help_forum_config(),
        forum_gateway,
        store,
        clock,
        &mut router,
    )
    .await
    {
        Ok(forum) => Some(forum),
        Err(error) => {
            tracing::error!("help forum module disabled: {error}");
            None
        }
    };

    for summary in router.summaries() {
        tracing::debug!(
            aliases = ?summary.aliases,
            admin = summary.admin,
            description = summary.description.as_deref().unwrap_or_default(),
            "registered command"
        );
    }

    let handler = HelpdeskHandler::new(gateway, Arc::new(router), forum, &cli.helper_role_id)
        .context("invalid helper role id")?;
    run_client(&cli.discord_token, handler)
        .await
        .context("discord client stopped with an error")
}
