//! Display helpers

/// Render milliseconds as `MM:SS`; minutes are not capped at 99
pub fn format_remaining(remaining_ms: u64) -> String {
    let minutes = remaining_ms / 60_000;
    let seconds = (remaining_ms % 60_000) / 1000;
    format!("{:02}:{:02}", minutes, seconds)
}
