use chrono::{DateTime, FixedOffset, Utc};
use uuid::Uuid;

/// Stored alerts expire after seven days.
pub const MESSAGE_TTL_SECONDS: u64 = 604_800;

const BEIJING_OFFSET_SECONDS: i32 = 8 * 60 * 60;

pub fn generate_message_id() -> String {
    Uuid::new_v4().to_string()
}

/// Formats `now` as `YYYY-MM-DD HH:MM:SS` in UTC+8.
pub fn format_beijing_time(now: DateTime<Utc>) -> String {
    match FixedOffset::east_opt(BEIJING_OFFSET_SECONDS) {
        Some(offset) => now
            .with_timezone(&offset)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        None => now.format("%Y-%m-%d %H:%M:%S").to_string(),
    }
}

/// Removes exactly one trailing `/` so the view link never contains `//read`.
pub fn strip_trailing_slash(base_url: &str) -> &str {
    base_url.strip_suffix('/').unwrap_or(base_url)
}

pub fn build_detail_url(view_base_url: &str, message_id: &str) -> String {
    format!("{}/read?id={}", strip_trailing_slash(view_base_url), message_id)
}
