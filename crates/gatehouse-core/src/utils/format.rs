use chrono::{DateTime, Utc};

/// Number of token characters shown in previews
const TOKEN_PREVIEW_CHARS: usize = 8;

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Short, non-reversible preview of a bearer token for display.
pub fn token_preview(token: &str) -> String {
    if token.chars().count() <= TOKEN_PREVIEW_CHARS {
        "*".repeat(token.chars().count())
    } else {
        let head: String = token.chars().take(TOKEN_PREVIEW_CHARS).collect();
        format!("{}...", head)
    }
}

/// Format a date string to a more readable format
pub fn format_date(date: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(date) {
        dt.format("%b %d, %Y").to_string()
    } else if date.len() >= 10 {
        // Try to parse YYYY-MM-DD format
        date.chars().take(10).collect()
    } else {
        date.to_string()
    }
}

/// Human readable age of a timestamp ("just now", "5m ago", "3h ago", "2d ago").
pub fn format_age(at: DateTime<Utc>) -> String {
    let minutes = (Utc::now() - at).num_minutes();
    if minutes < 1 {
        // Also covers clock skew
        "just now".to_string()
    } else if minutes < 60 {
        format!("{}m ago", minutes)
    } else if minutes < 1440 {
        format!("{}h ago", minutes / 60)
    } else {
        format!("{}d ago", minutes / 1440)
    }
}
