//! Display formatting and user-input parsing.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};

/// `HH:MM:SS`, with hours allowed past 99. Negative input shows as zero.
pub fn format_hms(ms: i64) -> String {
    let total_secs = ms.max(0) / 1000;
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// Same as [`format_hms`] for unsigned durations.
pub fn format_duration(ms: u64) -> String {
    format_hms(i64::try_from(ms).unwrap_or(i64::MAX))
}

/// Local `YYYY-MM-DDTHH:MM`, the form accepted back by [`parse_start_instant`].
pub fn format_local_datetime(epoch_ms: i64) -> Option<String> {
    let dt = Local.timestamp_millis_opt(epoch_ms).single()?;
    Some(dt.format("%Y-%m-%dT%H:%M").to_string())
}

/// Local wall-clock time, e.g. `"06:30"` or `"6:30 AM"`.
pub fn format_clock_time(epoch_ms: i64, clock_24h: bool) -> Option<String> {
    let dt = Local.timestamp_millis_opt(epoch_ms).single()?;
    let pattern = if clock_24h { "%H:%M" } else { "%-I:%M %p" };
    Some(dt.format(pattern).to_string())
}

const LOCAL_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
];

/// Parse a start instant typed by the user.
///
/// Accepts epoch milliseconds, RFC 3339, or a local date and time without
/// zone. Returns `None` for anything else; callers treat that as "ignore".
pub fn parse_start_instant(input: &str) -> Option<i64> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    if input.bytes().all(|b| b.is_ascii_digit()) {
        return input.parse::<i64>().ok();
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.timestamp_millis());
    }
    LOCAL_FORMATS.iter().find_map(|fmt| {
        let naive = NaiveDateTime::parse_from_str(input, fmt).ok()?;
        // Ambiguous local times (DST fold) resolve to the earlier instant.
        Local
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.timestamp_millis())
    })
}

/// Parse a target-hours value. Leading integer digits win, so `"16h"`
/// reads as 16; range checks are the session's job.
pub fn parse_target_hours(input: &str) -> Option<i64> {
    let input = input.trim();
    let digits_end = input
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
        .map(|(i, _)| i)
        .unwrap_or(input.len());
    input[..digits_end].parse::<i64>().ok()
}
