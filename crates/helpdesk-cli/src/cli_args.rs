use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser};
use helpdesk_core::parse_snowflake;
use helpdesk_forum::{ContentThresholds, HelpForumConfig};

use crate::{AdminIds, CliRecordExpiry};

fn parse_snowflake_arg(value: &str) -> Result<String, String> {
    parse_snowflake(value).map_err(|error| error.to_string())
}

fn parse_admin_ids(value: &str) -> Result<AdminIds, String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(parse_snowflake_arg)
        .collect::<Result<Vec<_>, _>>()
        .map(AdminIds::new)
}

fn parse_positive_usize(value: &str) -> Result<usize, String> {
    let parsed = value
        .trim()
        .parse::<usize>()
        .map_err(|error| format!("failed to parse integer: {error}"))?;
    if parsed == 0 {
        return Err("value must be greater than 0".to_string());
    }
    Ok(parsed)
}

fn parse_positive_u64(value: &str) -> Result<u64, String> {
    let parsed = value
        .trim()
        .parse::<u64>()
        .map_err(|error| format!("failed to parse integer: {error}"))?;
    if parsed == 0 {
        return Err("value must be greater than 0".to_string());
    }
    Ok(parsed)
}

fn parse_command_prefix(value: &str) -> Result<String, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("command prefixes must not be empty".to_string());
    }
    Ok(trimmed.to_string())
}

fn parse_non_empty(value: &str) -> Result<String, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("value must not be empty".to_string());
    }
    Ok(trimmed.to_string())
}

#[derive(Debug, Parser)]
#[command(
    name = "helpdesk",
    about = "Discord help-forum assistant: thread status, content checks, helper pings and tagging",
    version
)]
/// Public struct `Cli` used across Helpdesk components.
pub struct Cli {
    #[arg(
        long = "discord-token",
        env = "DISCORD_TOKEN",
        hide_env_values = true,
        value_parser = parse_non_empty,
        help = "Discord bot token"
    )]
    pub discord_token: String,

    #[arg(
        long = "guild-id",
        env = "GUILD_ID",
        value_parser = parse_snowflake_arg,
        help = "Guild (server) the bot operates in"
    )]
    pub guild_id: String,

    #[arg(
        long = "help-forum-channel",
        env = "HELP_FORUM_CHANNEL",
        value_parser = parse_snowflake_arg,
        help = "Forum channel whose threads are help posts"
    )]
    pub help_forum_channel: String,

    #[arg(
        long = "help-requests-channel",
        env = "HELP_REQUESTS_CHANNEL",
        value_parser = parse_snowflake_arg,
        help = "Text channel receiving helper pings"
    )]
    pub help_requests_channel: String,

    #[arg(
        long = "help-forum-open-tag",
        env = "HELP_FORUM_OPEN_TAG",
        value_parser = parse_non_empty,
        help = "Name of the forum tag marking open posts"
    )]
    pub help_forum_open_tag: String,

    #[arg(
        long = "help-forum-resolved-tag",
        env = "HELP_FORUM_RESOLVED_TAG",
        value_parser = parse_non_empty,
        help = "Name of the forum tag marking resolved posts"
    )]
    pub help_forum_resolved_tag: String,

    #[arg(
        long = "helper-role-id",
        env = "HELPER_ROLE_ID",
        value_parser = parse_snowflake_arg,
        help = "Role pinged for help requests; members of it may act on any help post"
    )]
    pub helper_role_id: String,

    #[arg(
        long = "command-prefixes",
        env = "COMMAND_PREFIXES",
        value_delimiter = ',',
        default_value = "!",
        value_parser = parse_command_prefix,
        help = "Comma-separated text command prefixes; the first one is used in hints"
    )]
    pub command_prefixes: Vec<String>,

    #[arg(
        long = "admins",
        env = "ADMINS",
        default_value = "",
        hide_default_value = true,
        value_parser = parse_admin_ids,
        help = "Comma-separated user ids allowed to run admin commands"
    )]
    pub admins: AdminIds,

    #[arg(
        long = "min-content-length",
        env = "HELP_FORUM_MIN_CONTENT_LENGTH",
        default_value_t = helpdesk_forum::DEFAULT_MIN_CONTENT_LENGTH,
        value_parser = parse_positive_usize,
        help = "Minimum character count of a help post"
    )]
    pub min_content_length: usize,

    #[arg(
        long = "min-word-count",
        env = "HELP_FORUM_MIN_WORD_COUNT",
        default_value_t = helpdesk_forum::DEFAULT_MIN_WORD_COUNT,
        value_parser = parse_positive_usize,
        help = "Minimum word count of a help post"
    )]
    pub min_word_count: usize,

    #[arg(
        long = "helpers-ping-cooldown-minutes",
        env = "HELPERS_PING_COOLDOWN_MINUTES",
        default_value_t = 120,
        value_parser = parse_positive_u64,
        help = "Minutes an asker must wait between helper pings"
    )]
    pub helpers_ping_cooldown_minutes: u64,

    #[arg(
        long = "max-applied-tags",
        env = "HELP_FORUM_MAX_TAGS",
        default_value_t = helpdesk_forum::DEFAULT_MAX_APPLIED_TAGS,
        value_parser = parse_positive_usize,
        help = "Maximum number of tags on a forum post"
    )]
    pub max_applied_tags: usize,

    #[arg(
        long = "record-expiry",
        env = "HELP_THREAD_RECORD_EXPIRY",
        value_enum,
        default_value_t = CliRecordExpiry::Preserve,
        help = "Whether record rewrites keep (preserve) or reset (refresh) the 7-day expiry"
    )]
    pub record_expiry: CliRecordExpiry,

    #[arg(
        long = "store-path",
        env = "HELPDESK_STORE_PATH",
        default_value = ".helpdesk/store.sqlite3",
        help = "SQLite database holding thread records and snippets"
    )]
    pub store_path: PathBuf,

    #[arg(
        long = "in-memory-store",
        env = "HELPDESK_IN_MEMORY_STORE",
        default_value_t = false,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        help = "Keep all state in memory instead of --store-path"
    )]
    pub in_memory_store: bool,
}

impl Cli {
    pub fn help_forum_config(&self) -> HelpForumConfig {
        HelpForumConfig {
            content_thresholds: ContentThresholds {
                min_length: self.min_content_length,
                min_words: self.min_word_count,
            },
            helpers_ping_cooldown: Duration::from_secs(
                self.helpers_ping_cooldown_minutes.saturating_mul(60),
            ),
            max_applied_tags: self.max_applied_tags,
            record_expiry: self.record_expiry.into(),
            ..HelpForumConfig::new(
                self.help_forum_channel.clone(),
                self.help_requests_channel.clone(),
                self.help_forum_open_tag.clone(),
                self.help_forum_resolved_tag.clone(),
                self.helper_role_id.clone(),
            )
        }
    }
}
