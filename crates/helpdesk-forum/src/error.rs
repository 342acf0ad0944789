use helpdesk_commands::RouterError;
use helpdesk_core::GatewayError;
use helpdesk_store::StoreError;
use thiserror::Error;

pub type ForumResult<T> = Result<T, ForumError>;

/// Errors raised by the help-forum module.
#[derive(Debug, Error)]
pub enum ForumError {
    #[error("channel {channel_id} is not a forum channel")]
    NotAForum { channel_id: String },
    #[error("forum tag '{name}' not found in channel {channel_id}")]
    TagNotFound { name: String, channel_id: String },
    #[error("help requests channel {0} is not text based")]
    NotTextChannel(String),
    #[error("thread {0} cannot be resolved to a forum thread with an owner")]
    ThreadNotResolvable(String),
    #[error("starter message of thread {0} not found")]
    StarterMessageMissing(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error("failed to register forum commands: {0}")]
    Router(#[from] RouterError),
}
