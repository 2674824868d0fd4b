//! Expands recurring event definitions into concrete occurrences.
//!
//! Materialization is a pure transformation over rows the caller has already
//! fetched; nothing produced here is persisted.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use daybook_core::types::DateSpan;
use daybook_db::model::calendar::{RecurrenceException, RecurringEvent};

use crate::calendar::AgendaEvent;

/// ## Summary
/// Indexes exceptions by date for constant-time lookup during expansion.
///
/// The store enforces at most one exception per (definition, date), so a
/// plain map is sufficient.
#[must_use]
pub fn exceptions_by_date(
    exceptions: Vec<RecurrenceException>,
) -> BTreeMap<NaiveDate, RecurrenceException> {
    exceptions
        .into_iter()
        .map(|exception| (exception.date, exception))
        .collect()
}

/// ## Summary
/// Produces the ordered occurrences of `definition` within `span`.
///
/// For each day, an exception row takes precedence: both times absent
/// cancels the occurrence, otherwise the stored times override the
/// definition's while title, description, and location are kept. Days
/// without an exception match on the recurrence kind alone. Days outside the
/// recurrence window never produce an occurrence.
#[must_use]
pub fn expand_recurring(
    definition: &RecurringEvent,
    exceptions: &BTreeMap<NaiveDate, RecurrenceException>,
    span: DateSpan,
) -> Vec<AgendaEvent> {
    let mut occurrences = Vec::new();

    for date in span.days() {
        if date < definition.recurrence_start {
            continue;
        }
        if let Some(window_end) = definition.recurrence_end {
            if date > window_end {
                break;
            }
        }

        if let Some(exception) = exceptions.get(&date) {
            if exception.is_cancellation() {
                tracing::trace!(
                    recurring_event_id = definition.id,
                    date = %date,
                    "Occurrence cancelled by exception"
                );
                continue;
            }

            occurrences.push(AgendaEvent::occurrence(
                definition,
                date,
                exception.start_time,
                exception.end_time,
            ));
            continue;
        }

        if definition
            .recurrence
            .kind()
            .matches(date, definition.recurrence_start)
        {
            occurrences.push(AgendaEvent::occurrence(
                definition,
                date,
                Some(definition.start_time),
                Some(definition.end_time),
            ));
        }
    }

    occurrences
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, NaiveTime, Utc};
    use daybook_core::types::RecurrenceKind;
    use daybook_db::db::enums::Recurrence;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn span(start: NaiveDate, end: NaiveDate) -> DateSpan {
        DateSpan::new(start, end).unwrap()
    }

    fn definition(
        kind: RecurrenceKind,
        recurrence_start: NaiveDate,
        recurrence_end: Option<NaiveDate>,
    ) -> RecurringEvent {
        RecurringEvent {
            id: 7,
            title: "Standup".to_string(),
            description: Some("Morning sync".to_string()),
            location: Some("Office".to_string()),
            start_time: time(9, 0),
            end_time: time(9, 30),
            recurrence: Recurrence(kind),
            recurrence_start,
            recurrence_end,
            created_at: DateTime::<Utc>::UNIX_EPOCH,
            last_updated_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    fn exception(
        def: &RecurringEvent,
        on: NaiveDate,
        start_time: Option<NaiveTime>,
        end_time: Option<NaiveTime>,
    ) -> RecurrenceException {
        RecurrenceException {
            id: 1,
            recurring_event_id: def.id,
            date: on,
            start_time,
            end_time,
            created_at: DateTime::<Utc>::UNIX_EPOCH,
            last_updated_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    // 2026-01-05 is a Monday.
    const MONDAY: (i32, u32, u32) = (2026, 1, 5);

    #[test_log::test]
    fn test_weekly_two_weeks_yields_two_mondays() {
        let monday = date(MONDAY.0, MONDAY.1, MONDAY.2);
        let def = definition(RecurrenceKind::Weekly, monday, None);

        let occurrences =
            expand_recurring(&def, &BTreeMap::new(), span(monday, date(2026, 1, 18)));

        assert_eq!(occurrences.len(), 2);
        assert_eq!(occurrences[0].start_date, monday);
        assert_eq!(occurrences[1].start_date, date(2026, 1, 12));
        assert!(occurrences.iter().all(|o| o.recurring));
    }

    #[test_log::test]
    fn test_weekdays_seven_day_span_yields_five() {
        let monday = date(MONDAY.0, MONDAY.1, MONDAY.2);
        let def = definition(RecurrenceKind::Weekdays, date(2026, 1, 1), None);

        let occurrences =
            expand_recurring(&def, &BTreeMap::new(), span(monday, date(2026, 1, 11)));

        let dates: Vec<_> = occurrences.iter().map(|o| o.start_date).collect();
        assert_eq!(
            dates,
            vec![
                date(2026, 1, 5),
                date(2026, 1, 6),
                date(2026, 1, 7),
                date(2026, 1, 8),
                date(2026, 1, 9),
            ]
        );
    }

    #[test_log::test]
    fn test_yearly_matches_anniversary_only() {
        let def = definition(RecurrenceKind::Yearly, date(2020, 3, 14), None);

        let occurrences = expand_recurring(
            &def,
            &BTreeMap::new(),
            span(date(2026, 3, 1), date(2026, 3, 31)),
        );

        assert_eq!(occurrences.len(), 1);
        assert_eq!(occurrences[0].start_date, date(2026, 3, 14));
        assert_eq!(occurrences[0].end_date, date(2026, 3, 14));
    }

    #[test_log::test]
    fn test_cancellation_removes_only_its_date() {
        let monday = date(MONDAY.0, MONDAY.1, MONDAY.2);
        let def = definition(RecurrenceKind::Weekly, monday, None);
        let cancelled = exception(&def, date(2026, 1, 12), None, None);
        let exceptions = exceptions_by_date(vec![cancelled]);

        let occurrences = expand_recurring(&def, &exceptions, span(monday, date(2026, 1, 18)));

        assert_eq!(occurrences.len(), 1);
        assert_eq!(occurrences[0].start_date, monday);
    }

    #[test_log::test]
    fn test_override_changes_times_only() {
        let monday = date(MONDAY.0, MONDAY.1, MONDAY.2);
        let def = definition(RecurrenceKind::Weekly, monday, None);
        let moved = exception(&def, date(2026, 1, 12), Some(time(14, 0)), Some(time(15, 0)));
        let exceptions = exceptions_by_date(vec![moved]);

        let occurrences = expand_recurring(&def, &exceptions, span(monday, date(2026, 1, 18)));

        assert_eq!(occurrences.len(), 2);
        let overridden = &occurrences[1];
        assert_eq!(overridden.start_time, Some(time(14, 0)));
        assert_eq!(overridden.end_time, Some(time(15, 0)));
        assert_eq!(overridden.start_minutes, 14 * 60);
        assert_eq!(overridden.title, def.title);
        assert_eq!(overridden.description, def.description);
        assert_eq!(overridden.location, def.location);

        let regular = &occurrences[0];
        assert_eq!(regular.start_time, Some(time(9, 0)));
    }

    #[test_log::test]
    fn test_half_override_is_not_a_cancellation() {
        let monday = date(MONDAY.0, MONDAY.1, MONDAY.2);
        let def = definition(RecurrenceKind::Weekly, monday, None);
        let shifted = exception(&def, monday, Some(time(10, 0)), None);
        let exceptions = exceptions_by_date(vec![shifted]);

        let occurrences = expand_recurring(&def, &exceptions, span(monday, monday));

        assert_eq!(occurrences.len(), 1);
        assert_eq!(occurrences[0].start_time, Some(time(10, 0)));
        assert_eq!(occurrences[0].end_time, None);
        assert_eq!(occurrences[0].end_minutes, 0);
    }

    #[test_log::test]
    fn test_days_outside_window_produce_nothing() {
        let monday = date(MONDAY.0, MONDAY.1, MONDAY.2);
        let def = definition(RecurrenceKind::Weekly, monday, Some(date(2026, 1, 18)));

        let occurrences = expand_recurring(
            &def,
            &BTreeMap::new(),
            span(date(2026, 1, 1), date(2026, 1, 31)),
        );

        // Mondays Jan 19 and 26 fall after the window end; Jan 1-4 precede
        // the window start.
        let dates: Vec<_> = occurrences.iter().map(|o| o.start_date).collect();
        assert_eq!(dates, vec![monday, date(2026, 1, 12)]);
    }

    #[test_log::test]
    fn test_expansion_is_idempotent() {
        let monday = date(MONDAY.0, MONDAY.1, MONDAY.2);
        let def = definition(RecurrenceKind::Weekdays, monday, None);
        let exceptions =
            exceptions_by_date(vec![exception(&def, date(2026, 1, 6), None, None)]);
        let query = span(monday, date(2026, 1, 18));

        let first = expand_recurring(&def, &exceptions, query);
        let second = expand_recurring(&def, &exceptions, query);

        assert_eq!(first, second);
    }
}
