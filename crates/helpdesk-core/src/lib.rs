//! Foundational utilities shared across helpdesk crates.
//!
//! Provides chat-platform descriptors, typed notices, the outbound messaging
//! contract, snowflake validation, and the clock and time helpers used by
//! cooldowns and record expiry.

pub mod chat;
pub mod clock;
pub mod notice;
pub mod outbound;
pub mod snowflake;
pub mod time_utils;

pub use chat::{
    channel_mention, role_mention, user_mention, Actor, IncomingMessage, ReactionEmoji,
    ReactionEvent, ThreadDescriptor,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use notice::{
    ButtonAction, ButtonTone, Notice, NoticeButton, NoticeField, NoticeKind,
    DELETE_MESSAGE_CUSTOM_ID, RETRY_CONTENT_CHECK_PREFIX,
};
pub use outbound::{ChannelMessenger, GatewayError, GatewayResult};
pub use snowflake::{parse_snowflake, SnowflakeError};
pub use time_utils::{
    current_unix_timestamp_ms, discord_relative_timestamp, is_expired_unix_ms,
    unix_ms_to_secs_ceil,
};
