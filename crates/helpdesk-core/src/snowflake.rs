use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnowflakeError {
    #[error("snowflake must not be empty")]
    Empty,
    #[error("'{0}' should be a snowflake, not a generic string")]
    NotNumeric(String),
    #[error("snowflake '{0}' is out of range")]
    OutOfRange(String),
}

/// Validates a Discord snowflake (decimal, non-zero, fits in u64).
pub fn parse_snowflake(value: &str) -> Result<String, SnowflakeError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(SnowflakeError::Empty);
    }
    if !trimmed.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(SnowflakeError::NotNumeric(trimmed.to_string()));
    }
    match trimmed.parse::<u64>() {
        Ok(0) | Err(_) => Err(SnowflakeError::OutOfRange(trimmed.to_string())),
        Ok(_) => Ok(trimmed.to_string()),
    }
}
