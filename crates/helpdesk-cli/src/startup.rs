use std::sync::Arc;

use anyhow::{Context, Result};
use helpdesk_commands::{register_snippet_commands, CommandRouter};
use helpdesk_core::ChannelMessenger;
use helpdesk_store::{InMemoryKvStore, KvStore, SqliteKvStore};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::Cli;

/// Used when `RUST_LOG` is unset; serenity's gateway chatter stays at warn.
const DEFAULT_LOG_DIRECTIVES: &str = "info,serenity=warn,tracing::span=warn";

pub fn log_filter_directives(rust_log: Option<String>) -> String {
    rust_log
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_LOG_DIRECTIVES.to_string())
}

pub fn init_tracing() {
    let directives = log_filter_directives(std::env::var(EnvFilter::DEFAULT_ENV).ok());
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .parse_lossy(directives);

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

/// Opens the configured store and drops entries that expired while offline.
pub fn open_store(cli: &Cli) -> Result<Arc<dyn KvStore>> {
    if cli.in_memory_store {
        tracing::warn!("using in-memory store; thread records are lost on restart");
        return Ok(Arc::new(InMemoryKvStore::new()));
    }
    let store = SqliteKvStore::new(&cli.store_path)
        .with_context(|| format!("failed to open store {}", cli.store_path.display()))?;
    match store.purge_expired() {
        Ok(purged) if purged > 0 => tracing::info!(purged, "purged expired store entries"),
        Ok(_) => {}
        Err(error) => tracing::warn!("failed to purge expired store entries: {error}"),
    }
    tracing::info!(path = %cli.store_path.display(), "opened sqlite store");
    Ok(Arc::new(store))
}

/// Router with the always-on modules registered; the forum module adds its
/// own commands during setup.
pub fn build_router(
    cli: &Cli,
    store: Arc<dyn KvStore>,
    messenger: Arc<dyn ChannelMessenger>,
) -> Result<CommandRouter> {
    let mut router =
        CommandRouter::new(cli.command_prefixes.clone(), cli.admins.ids().iter().cloned())
            .context("invalid command router configuration")?;
    register_snippet_commands(&mut router, store, messenger)
        .context("failed to register snippet commands")?;
    Ok(router)
}
