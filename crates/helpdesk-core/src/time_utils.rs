/// Returns the current Unix timestamp in milliseconds.
pub fn current_unix_timestamp_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
        .try_into()
        .unwrap_or(u64::MAX)
}

/// Returns true when `expires_unix_ms` is present and no longer in the future.
pub fn is_expired_unix_ms(expires_unix_ms: Option<u64>, now_unix_ms: u64) -> bool {
    matches!(expires_unix_ms, Some(value) if value <= now_unix_ms)
}

/// Converts milliseconds to whole seconds, rounding up.
pub fn unix_ms_to_secs_ceil(unix_ms: u64) -> u64 {
    unix_ms.div_ceil(1_000)
}

/// Renders a Discord relative timestamp (`<t:SECONDS:R>`) for a millisecond instant.
pub fn discord_relative_timestamp(unix_ms: u64) -> String {
    format!("<t:{}:R>", unix_ms_to_secs_ceil(unix_ms))
}
