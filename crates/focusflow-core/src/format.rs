//! Elapsed-time formatting for timer faces and history lists.

/// `HH:MM:SS`, hours not wrapped at 24.
pub fn format_clock(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// Short human form used in session lists: `45s`, `5m 3s`, `5m`, `1h 5m`, `2h`.
///
/// Seconds are dropped once the value reaches an hour.
pub fn format_compact(total_seconds: u64) -> String {
    if total_seconds < 60 {
        return format!("{total_seconds}s");
    }
    if total_seconds < 3600 {
        let minutes = total_seconds / 60;
        let seconds = total_seconds % 60;
        return if seconds > 0 {
            format!("{minutes}m {seconds}s")
        } else {
            format!("{minutes}m")
        };
    }
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    if minutes > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{hours}h")
    }
}
