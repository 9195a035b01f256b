use chrono::{DateTime, Utc};

#[must_use]
pub fn format_datetime(value: DateTime<Utc>) -> String {
    value.format("%Y-%m-%d %H:%M").to_string()
}

/// Countdown display, zero-padded: `00:30`.
#[must_use]
pub fn format_countdown(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Elapsed time on the leaderboard: `1:05`.
#[must_use]
pub fn format_elapsed(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_clock_strings() {
        assert_eq!(format_countdown(30), "00:30");
        assert_eq!(format_countdown(125), "02:05");
        assert_eq!(format_elapsed(65), "1:05");
        assert_eq!(format_elapsed(9), "0:09");
    }
}
