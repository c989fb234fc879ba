//! "N units ago" formatting for job run timestamps.

use chrono::Utc;

const MINUTE: i64 = 60;
const HOUR: i64 = 3_600;
const DAY: i64 = 86_400;
/// Thirty-day month approximation.
const MONTH: i64 = 2_592_000;
/// 365-day year.
const YEAR: i64 = 31_536_000;

/// Format `epoch_secs` relative to the current wall clock.
pub fn format_ago(epoch_secs: i64) -> String {
    format_ago_at(epoch_secs, Utc::now().timestamp())
}

/// Format `epoch_secs` relative to `now_secs`.
///
/// Timestamps in the future clamp to "0 seconds ago".
pub fn format_ago_at(epoch_secs: i64, now_secs: i64) -> String {
    let diff = now_secs.saturating_sub(epoch_secs).max(0);

    if diff < MINUTE {
        // Seconds are always plural.
        return format!("{} seconds ago", diff);
    }

    let (count, unit) = if diff < HOUR {
        (diff / MINUTE, "minute")
    } else if diff < DAY {
        (diff / HOUR, "hour")
    } else if diff < MONTH {
        (diff / DAY, "day")
    } else if diff < YEAR {
        (diff / MONTH, "month")
    } else {
        (diff / YEAR, "year")
    };

    let suffix = if count > 1 { "s" } else { "" };
    format!("{} {}{} ago", count, unit, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_750_000_000;

    fn ago(diff: i64) -> String {
        format_ago_at(NOW - diff, NOW)
    }

    #[test]
    fn bucket_boundaries() {
        assert_eq!(ago(59), "59 seconds ago");
        assert_eq!(ago(60), "1 minute ago");
        assert_eq!(ago(3_599), "59 minutes ago");
        assert_eq!(ago(3_600), "1 hour ago");
        assert_eq!(ago(86_399), "23 hours ago");
        assert_eq!(ago(86_400), "1 day ago");
        assert_eq!(ago(2_591_999), "29 days ago");
        assert_eq!(ago(2_592_000), "1 month ago");
        assert_eq!(ago(31_535_999), "12 months ago");
        assert_eq!(ago(31_536_000), "1 year ago");
    }

    #[test]
    fn seconds_are_always_plural() {
        assert_eq!(ago(0), "0 seconds ago");
        assert_eq!(ago(1), "1 seconds ago");
    }

    #[test]
    fn larger_counts_are_plural() {
        assert_eq!(ago(2 * MINUTE), "2 minutes ago");
        assert_eq!(ago(5 * DAY), "5 days ago");
        assert_eq!(ago(3 * YEAR + 10), "3 years ago");
    }

    #[test]
    fn future_timestamps_clamp_to_zero() {
        assert_eq!(ago(-120), "0 seconds ago");
    }

    #[test]
    fn epoch_zero_reports_years() {
        let text = format_ago_at(0, NOW);
        assert_eq!(text, format!("{} years ago", NOW / YEAR));
    }
}
