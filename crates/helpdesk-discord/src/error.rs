use helpdesk_core::{GatewayError, SnowflakeError};
use serenity::http::HttpError;
use thiserror::Error;

/// Errors raised while talking to Discord through serenity.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("invalid discord id '{value}': {source}")]
    InvalidId {
        value: String,
        #[source]
        source: SnowflakeError,
    },
    #[error(transparent)]
    Serenity(#[from] serenity::Error),
}

/// True when Discord answered the request with 404.
pub fn is_not_found(error: &serenity::Error) -> bool {
    matches!(
        error,
        serenity::Error::Http(HttpError::UnsuccessfulRequest(response))
            if response.status_code.as_u16() == 404
    )
}

impl From<AdapterError> for GatewayError {
    fn from(error: AdapterError) -> Self {
        match error {
            AdapterError::InvalidId { value, .. } => GatewayError::InvalidId(value),
            AdapterError::Serenity(error) if is_not_found(&error) => {
                GatewayError::NotFound(error.to_string())
            }
            AdapterError::Serenity(error) => GatewayError::Transport(error.to_string()),
        }
    }
}
