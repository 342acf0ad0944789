//! Outbound messaging contract implemented by chat-platform adapters.

use async_trait::async_trait;
use thiserror::Error;

use crate::notice::Notice;

/// Errors reported by adapters for outbound or fetch calls.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid platform id '{0}'")]
    InvalidId(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("platform request failed: {0}")]
    Transport(String),
}

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Sends, edits and deletes channel messages.
#[async_trait]
pub trait ChannelMessenger: Send + Sync {
    /// Posts a notice and returns the created message id.
    async fn send_notice(&self, channel_id: &str, notice: &Notice) -> GatewayResult<String>;
    /// Posts plain text and returns the created message id.
    async fn send_text(&self, channel_id: &str, content: &str) -> GatewayResult<String>;
    async fn edit_text(&self, channel_id: &str, message_id: &str, content: &str)
        -> GatewayResult<()>;
    async fn delete_message(&self, channel_id: &str, message_id: &str) -> GatewayResult<()>;
}
