// src/clock.rs
use chrono::{DateTime, Duration as ChronoDuration, LocalResult, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Accepted range for the configured day offset.
pub const DAY_OFFSET_RANGE: std::ops::RangeInclusive<i64> = -7..=0;

/// Reference zone of the lunch spots.
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Asia::Seoul;

/// Where "today" starts for the date filter.
///
/// `offset_days = 0` is local midnight of the current day, `-1` is the
/// midnight before it, and so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayBoundary {
    pub tz: Tz,
    pub offset_days: i64,
}

impl Default for DayBoundary {
    fn default() -> Self {
        Self {
            tz: DEFAULT_TIMEZONE,
            offset_days: 0,
        }
    }
}

impl DayBoundary {
    pub fn new(tz: Tz, offset_days: i64) -> Self {
        Self { tz, offset_days }
    }

    /// Boundary for the current instant, as epoch milliseconds.
    pub fn now_millis(&self) -> i64 {
        self.millis_at(Utc::now())
    }

    /// Boundary relative to `now`, as epoch milliseconds.
    ///
    /// An offset past the representable calendar saturates: far future
    /// admits no post, far past admits every post.
    pub fn millis_at(&self, now: DateTime<Utc>) -> i64 {
        let local_day = now.with_timezone(&self.tz).date_naive();
        let day = ChronoDuration::try_days(self.offset_days)
            .and_then(|d| local_day.checked_add_signed(d));
        match day {
            Some(day) => {
                local_midnight(self.tz, day.and_time(chrono::NaiveTime::MIN)).timestamp_millis()
            }
            None if self.offset_days > 0 => i64::MAX,
            None => i64::MIN,
        }
    }
}

/// Resolve a local wall-clock midnight. Zones that skip midnight on a DST
/// switch start the day at the first valid instant after the gap.
fn local_midnight(tz: Tz, naive: NaiveDateTime) -> DateTime<Tz> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(earliest, _) => earliest,
        LocalResult::None => {
            let mut cursor = naive;
            loop {
                cursor += ChronoDuration::minutes(15);
                if let Some(dt) = tz.from_local_datetime(&cursor).earliest() {
                    return dt;
                }
            }
        }
    }
}
