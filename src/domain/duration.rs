/// Reads the leading whitespace-delimited token of a duration string as whole
/// minutes. Anything that is not an integer token yields `0`.
pub fn parse_minutes(text: &str) -> u64 {
    text.split_whitespace()
        .next()
        .and_then(|token| token.parse::<u64>().ok())
        .unwrap_or(0)
}

/// Renders a minute total as `"{h}h {m}m"` once it reaches an hour, otherwise
/// as `"{m} min"`.
pub fn format_minutes(total_minutes: u64) -> String {
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;
    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes} min")
    }
}

/// Upload form of a session length. Always plain minutes.
pub fn plain_minutes(minutes: u32) -> String {
    format!("{minutes} min")
}

/// `MM:SS` countdown label used by timer tick events.
pub fn format_countdown(remaining_seconds: u32) -> String {
    format!("{:02}:{:02}", remaining_seconds / 60, remaining_seconds % 60)
}
