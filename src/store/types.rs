//! Time window types and local-time helpers
//!
//! Queries come in two boundary flavors and call sites depend on the
//! distinction: day windows are half-open `[start, end)` so midnight rows
//! land in exactly one day, while "history up to now" windows are inclusive
//! `[start, end]` so the newest row is never cut off.

use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone, Utc};

/// How the end of a [`TimeRange`] is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndBound {
    /// `time < end`
    Exclusive,
    /// `time <= end`
    Inclusive,
}

/// A query time window with an explicit end-bound mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub end_bound: EndBound,
}

impl TimeRange {
    /// Half-open window `[start, end)`, for day-boundary queries
    pub fn half_open(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start,
            end,
            end_bound: EndBound::Exclusive,
        }
    }

    /// Inclusive window `[start, end]`, for "up to now" queries
    pub fn inclusive(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start,
            end,
            end_bound: EndBound::Inclusive,
        }
    }

    /// One local calendar day: `[startOfDay, startOfDay + 24h)`
    pub fn day(date: NaiveDate) -> Self {
        let start = local_day_start(date);
        Self::half_open(start, start + chrono::Duration::hours(24))
    }

    /// Today, in the server's local time zone
    pub fn today() -> Self {
        Self::day(Local::now().date_naive())
    }

    /// From the local start-of-day `days` ago through now, inclusive
    pub fn last_days(days: i64) -> Self {
        let start_date = Local::now().date_naive() - chrono::Duration::days(days);
        Self::inclusive(local_day_start(start_date), Utc::now())
    }

    /// Check if a timestamp falls within this range
    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        if t < self.start {
            return false;
        }
        match self.end_bound {
            EndBound::Exclusive => t < self.end,
            EndBound::Inclusive => t <= self.end,
        }
    }

    /// SQL comparison operator for the end of the window
    pub(crate) fn end_op(&self) -> &'static str {
        match self.end_bound {
            EndBound::Exclusive => "<",
            EndBound::Inclusive => "<=",
        }
    }
}

/// The given local calendar date at `hour:00:00`, as a UTC instant
///
/// A local time that does not exist (DST gap) falls back to interpreting the
/// naive time as UTC.
pub fn at_local_hour(date: NaiveDate, hour: u32) -> DateTime<Utc> {
    let naive = date.and_time(NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or_default());
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
}

/// Local midnight of the given calendar date, as a UTC instant
pub fn local_day_start(date: NaiveDate) -> DateTime<Utc> {
    at_local_hour(date, 0)
}

/// The local calendar date a UTC instant falls on
pub fn local_date_of(t: DateTime<Utc>) -> NaiveDate {
    t.with_timezone(&Local).date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_half_open_excludes_end() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 28).unwrap();
        let range = TimeRange::day(date);

        assert!(range.contains(range.start));
        assert!(range.contains(range.end - chrono::Duration::milliseconds(1)));
        assert!(!range.contains(range.end));
    }

    #[test]
    fn test_inclusive_includes_end() {
        let start = Utc::now() - chrono::Duration::days(1);
        let end = Utc::now();
        let range = TimeRange::inclusive(start, end);

        assert!(range.contains(end));
        assert!(!range.contains(end + chrono::Duration::milliseconds(1)));
        assert_eq!(range.end_op(), "<=");
    }

    #[test]
    fn test_day_window_is_24_hours() {
        let date = NaiveDate::from_ymd_opt(2026, 6, 15).unwrap();
        let range = TimeRange::day(date);
        assert_eq!(range.end - range.start, chrono::Duration::hours(24));
        assert_eq!(range.end_op(), "<");
    }

    #[test]
    fn test_at_local_hour_round_trips_date() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 28).unwrap();
        let t = at_local_hour(date, 8);
        assert_eq!(local_date_of(t), date);
        assert_eq!(t.with_timezone(&Local).time().hour(), 8);
    }
}
