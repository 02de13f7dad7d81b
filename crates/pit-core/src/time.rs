//! Timezone policy and the `HH:MM:SS` formatting shared by logs and durations.
//!
//! Every timestamp is a `DateTime<FixedOffset>` in one configured offset. The
//! default is UTC+07:00 (Asia/Jakarta, no DST).

use chrono::{DateTime, FixedOffset, Utc};

/// Timestamp type used throughout the core.
pub type Timestamp = DateTime<FixedOffset>;

/// Default offset in whole hours east of UTC.
pub const DEFAULT_UTC_OFFSET_HOURS: i32 = 7;

/// Builds an offset from whole hours; `None` when outside chrono's range.
pub fn offset_from_hours(hours: i32) -> Option<FixedOffset> {
    FixedOffset::east_opt(hours.checked_mul(3600)?)
}

/// Current wall-clock time in `offset`.
pub fn now_in(offset: FixedOffset) -> Timestamp {
    Utc::now().with_timezone(&offset)
}

/// Wall-clock label used as the prefix of log and summary lines.
pub fn clock_label(ts: &Timestamp) -> String {
    ts.format("%H:%M:%S").to_string()
}

/// Whole seconds from `since` to `now`, clamped at zero.
pub fn elapsed_secs(since: &Timestamp, now: &Timestamp) -> i64 {
    now.signed_duration_since(*since).num_seconds().max(0)
}

/// Formats a duration in seconds as `HH:MM:SS`. Hours are not wrapped at 24.
pub fn format_duration(secs: i64) -> String {
    let secs = secs.max(0);
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}
