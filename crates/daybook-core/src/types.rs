use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// How a recurring event repeats within its recurrence window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurrenceKind {
    /// Every Monday through Friday.
    Weekdays,
    /// Every week, on the weekday of the window start.
    Weekly,
    /// Every year, on the month and day of the window start.
    Yearly,
}

impl RecurrenceKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Weekdays => "weekdays",
            Self::Weekly => "weekly",
            Self::Yearly => "yearly",
        }
    }

    /// Whether `date` matches this recurrence rule for a window starting at
    /// `recurrence_start`.
    #[must_use]
    pub fn matches(self, date: NaiveDate, recurrence_start: NaiveDate) -> bool {
        match self {
            Self::Weekdays => date.weekday().num_days_from_monday() < 5,
            Self::Weekly => date.weekday() == recurrence_start.weekday(),
            Self::Yearly => {
                date.month() == recurrence_start.month() && date.day() == recurrence_start.day()
            }
        }
    }
}

impl std::str::FromStr for RecurrenceKind {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s {
            "weekdays" => Ok(Self::Weekdays),
            "weekly" => Ok(Self::Weekly),
            "yearly" => Ok(Self::Yearly),
            other => Err(CoreError::InvalidRecurrenceKind(other.to_string())),
        }
    }
}

impl std::fmt::Display for RecurrenceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An inclusive span of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateSpan {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateSpan {
    /// ## Summary
    /// Creates an inclusive date span.
    ///
    /// ## Errors
    /// Returns an error if `end` is before `start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> CoreResult<Self> {
        if end < start {
            return Err(CoreError::InvalidInput(format!(
                "date span end {end} is before start {start}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Iterates every date in the span, in order.
    pub fn days(self) -> impl Iterator<Item = NaiveDate> {
        self.start.iter_days().take_while(move |day| *day <= self.end)
    }

    #[must_use]
    pub fn contains(self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Minutes since midnight for same-day ordering; `None` sorts first as 0.
#[must_use]
pub fn minutes_since_midnight(time: Option<NaiveTime>) -> u32 {
    time.map_or(0, |t| t.hour() * 60 + t.minute())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_recurrence_kind_round_trip() {
        for kind in [
            RecurrenceKind::Weekdays,
            RecurrenceKind::Weekly,
            RecurrenceKind::Yearly,
        ] {
            assert_eq!(RecurrenceKind::from_str(kind.as_str()).unwrap(), kind);
        }
    }

    #[test]
    fn test_recurrence_kind_unknown() {
        let err = RecurrenceKind::from_str("fortnightly").unwrap_err();
        assert!(matches!(err, CoreError::InvalidRecurrenceKind(s) if s == "fortnightly"));
    }

    #[test]
    fn test_weekdays_match() {
        let start = date(2026, 1, 1);
        // 2026-01-05 is a Monday, 2026-01-10 a Saturday.
        assert!(RecurrenceKind::Weekdays.matches(date(2026, 1, 5), start));
        assert!(RecurrenceKind::Weekdays.matches(date(2026, 1, 9), start));
        assert!(!RecurrenceKind::Weekdays.matches(date(2026, 1, 10), start));
        assert!(!RecurrenceKind::Weekdays.matches(date(2026, 1, 11), start));
    }

    #[test]
    fn test_weekly_match() {
        let start = date(2026, 1, 5); // Monday
        assert!(RecurrenceKind::Weekly.matches(date(2026, 1, 12), start));
        assert!(!RecurrenceKind::Weekly.matches(date(2026, 1, 13), start));
    }

    #[test]
    fn test_yearly_match() {
        let start = date(2020, 3, 14);
        assert!(RecurrenceKind::Yearly.matches(date(2026, 3, 14), start));
        assert!(!RecurrenceKind::Yearly.matches(date(2026, 3, 15), start));
        assert!(!RecurrenceKind::Yearly.matches(date(2026, 4, 14), start));
    }

    #[test]
    fn test_date_span_days() {
        let span = DateSpan::new(date(2026, 2, 27), date(2026, 3, 2)).unwrap();
        let days: Vec<_> = span.days().collect();
        assert_eq!(
            days,
            vec![
                date(2026, 2, 27),
                date(2026, 2, 28),
                date(2026, 3, 1),
                date(2026, 3, 2),
            ]
        );
    }

    #[test]
    fn test_date_span_single_day() {
        let span = DateSpan::new(date(2026, 1, 1), date(2026, 1, 1)).unwrap();
        assert_eq!(span.days().count(), 1);
    }

    #[test]
    fn test_date_span_rejects_reversed() {
        assert!(DateSpan::new(date(2026, 1, 2), date(2026, 1, 1)).is_err());
    }

    #[test]
    fn test_minutes_since_midnight() {
        assert_eq!(minutes_since_midnight(None), 0);
        let nine_thirty = NaiveTime::from_hms_opt(9, 30, 0).unwrap();
        assert_eq!(minutes_since_midnight(Some(nine_thirty)), 570);
    }
}
