//! The agenda query and calendar mutations.
//!
//! `list_events` is the one read operation: it merges one-off events with
//! materialized recurring occurrences into a chronologically ordered agenda.

pub mod materialize;

use chrono::{NaiveDate, NaiveTime};
use diesel::result::DatabaseErrorKind;
use serde::Serialize;

use daybook_core::types::{DateSpan, minutes_since_midnight};
use daybook_db::db::connection::DbConnection;
use daybook_db::db::query::calendar as query;
use daybook_db::model::calendar::{
    CalendarEvent, NewCalendarEvent, NewRecurrenceException, NewRecurringEvent,
    RecurrenceException, RecurringEvent,
};

use crate::error::{ServiceError, ServiceResult};

/// One entry of the agenda: either a one-off event or a materialized
/// occurrence of a recurring definition. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgendaEvent {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    /// True for materialized occurrences of a recurring definition.
    pub recurring: bool,
    /// Minutes since midnight of `start_time`, 0 when unset. Same-day sort
    /// key.
    pub start_minutes: u32,
    pub end_minutes: u32,
}

impl AgendaEvent {
    /// A concrete occurrence of `definition` on `date`, with the times that
    /// apply to that date (the definition's, or an exception's overrides).
    #[must_use]
    pub fn occurrence(
        definition: &RecurringEvent,
        date: NaiveDate,
        start_time: Option<NaiveTime>,
        end_time: Option<NaiveTime>,
    ) -> Self {
        Self {
            id: definition.id,
            title: definition.title.clone(),
            description: definition.description.clone(),
            location: definition.location.clone(),
            start_date: date,
            end_date: date,
            start_time,
            end_time,
            recurring: true,
            start_minutes: minutes_since_midnight(start_time),
            end_minutes: minutes_since_midnight(end_time),
        }
    }
}

impl From<CalendarEvent> for AgendaEvent {
    fn from(event: CalendarEvent) -> Self {
        Self {
            id: event.id,
            title: event.title,
            description: event.description,
            location: event.location,
            start_date: event.start_date,
            end_date: event.end_date,
            start_time: event.start_time,
            end_time: event.end_time,
            recurring: false,
            start_minutes: minutes_since_midnight(event.start_time),
            end_minutes: minutes_since_midnight(event.end_time),
        }
    }
}

/// ## Summary
/// Sorts agenda entries by (date, minutes since midnight), ascending.
///
/// The sort is stable, so entries tying on both keys keep their insertion
/// order.
#[must_use]
pub fn merge_agenda(mut events: Vec<AgendaEvent>) -> Vec<AgendaEvent> {
    events.sort_by_key(|event| (event.start_date, event.start_minutes));
    events
}

/// ## Summary
/// Lists every event occurring in the inclusive range [`start`, `end`]:
/// one-off events overlapping the range plus materialized occurrences of
/// every recurring definition active in it, in chronological order.
///
/// ## Errors
/// Returns a validation error when `end` is before `start`, and a database
/// error when a fetch fails (including a stored recurrence kind that fails
/// to decode).
#[tracing::instrument(skip(conn))]
pub async fn list_events(
    conn: &mut DbConnection<'_>,
    start: NaiveDate,
    end: NaiveDate,
) -> ServiceResult<Vec<AgendaEvent>> {
    let span = DateSpan::new(start, end)?;

    let one_off = query::events_overlapping(conn, span).await?;
    let definitions = query::recurring_overlapping(conn, span).await?;

    tracing::debug!(
        one_off = one_off.len(),
        definitions = definitions.len(),
        "Fetched calendar rows for agenda"
    );

    let mut events: Vec<AgendaEvent> = one_off.into_iter().map(AgendaEvent::from).collect();

    for definition in &definitions {
        let exceptions = query::exceptions_in_span(conn, definition.id, span).await?;
        let exceptions = materialize::exceptions_by_date(exceptions);
        events.extend(materialize::expand_recurring(definition, &exceptions, span));
    }

    Ok(merge_agenda(events))
}

/// ## Summary
/// Creates a one-off event.
///
/// ## Errors
/// Returns a validation error for a reversed date pair, or a database error.
pub async fn create_event(
    conn: &mut DbConnection<'_>,
    event: &NewCalendarEvent,
) -> ServiceResult<CalendarEvent> {
    if event.end_date < event.start_date {
        return Err(ServiceError::ValidationError(format!(
            "event end date {} is before start date {}",
            event.end_date, event.start_date
        )));
    }

    Ok(query::insert_event(conn, event).await?)
}

/// ## Summary
/// Deletes a one-off event.
///
/// ## Errors
/// Returns `NotFound` if no event has the given id.
pub async fn delete_event(conn: &mut DbConnection<'_>, id: i32) -> ServiceResult<()> {
    let deleted = query::delete_event(conn, id).await?;
    if deleted == 0 {
        return Err(ServiceError::NotFound(format!("calendar event {id}")));
    }
    Ok(())
}

/// ## Summary
/// Creates a recurring event definition.
///
/// ## Errors
/// Returns a validation error for a reversed recurrence window, or a
/// database error.
pub async fn create_recurring(
    conn: &mut DbConnection<'_>,
    definition: &NewRecurringEvent,
) -> ServiceResult<RecurringEvent> {
    if let Some(window_end) = definition.recurrence_end {
        if window_end < definition.recurrence_start {
            return Err(ServiceError::ValidationError(format!(
                "recurrence window end {window_end} is before start {}",
                definition.recurrence_start
            )));
        }
    }

    Ok(query::insert_recurring(conn, definition).await?)
}

/// ## Summary
/// Deletes a recurring definition; its exceptions cascade in the store.
///
/// ## Errors
/// Returns `NotFound` if no definition has the given id.
pub async fn delete_recurring(conn: &mut DbConnection<'_>, id: i32) -> ServiceResult<()> {
    let deleted = query::delete_recurring(conn, id).await?;
    if deleted == 0 {
        return Err(ServiceError::NotFound(format!("recurring event {id}")));
    }
    Ok(())
}

/// ## Summary
/// Sets the exception for one occurrence of a recurring definition: both
/// times absent cancels the occurrence, otherwise the times override the
/// definition's for that date. Replaces any exception already stored for the
/// date.
///
/// ## Errors
/// Returns `NotFound` if the definition does not exist, or a database error.
pub async fn set_exception(
    conn: &mut DbConnection<'_>,
    recurring_event_id: i32,
    date: NaiveDate,
    start_time: Option<NaiveTime>,
    end_time: Option<NaiveTime>,
) -> ServiceResult<RecurrenceException> {
    let exception = NewRecurrenceException {
        recurring_event_id,
        date,
        start_time,
        end_time,
    };

    match query::upsert_exception(conn, &exception).await {
        Ok(row) => Ok(row),
        Err(diesel::result::Error::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _)) => {
            Err(ServiceError::NotFound(format!(
                "recurring event {recurring_event_id}"
            )))
        }
        Err(err) => Err(err.into()),
    }
}

/// ## Summary
/// Removes the exception for one occurrence, restoring the regular rule.
///
/// Clearing a date that has no exception is a no-op.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn clear_exception(
    conn: &mut DbConnection<'_>,
    recurring_event_id: i32,
    date: NaiveDate,
) -> ServiceResult<()> {
    query::delete_exception(conn, recurring_event_id, date).await?;
    Ok(())
}

#[cfg(test)]
mod merge_tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn entry(id: i32, on: NaiveDate, at: Option<NaiveTime>, recurring: bool) -> AgendaEvent {
        AgendaEvent {
            id,
            title: format!("event {id}"),
            description: None,
            location: None,
            start_date: on,
            end_date: on,
            start_time: at,
            end_time: at,
            recurring,
            start_minutes: minutes_since_midnight(at),
            end_minutes: minutes_since_midnight(at),
        }
    }

    #[test]
    fn test_merge_orders_by_date_then_minutes() {
        let day = date(2026, 1, 5);
        let merged = merge_agenda(vec![
            entry(1, day, Some(time(9, 0)), false),
            entry(2, date(2026, 1, 4), Some(time(23, 0)), false),
            entry(3, day, Some(time(8, 0)), true),
        ]);

        let ids: Vec<_> = merged.iter().map(|event| event.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);

        let keys: Vec<_> = merged
            .iter()
            .map(|event| (event.start_date, event.start_minutes))
            .collect();
        let mut sorted = keys.clone();
        sorted.sort_unstable();
        assert_eq!(keys, sorted);
    }

    #[test]
    fn test_merge_puts_untimed_events_first() {
        let day = date(2026, 1, 5);
        let merged = merge_agenda(vec![
            entry(1, day, Some(time(0, 30)), false),
            entry(2, day, None, false),
        ]);

        assert_eq!(merged[0].id, 2);
        assert_eq!(merged[0].start_minutes, 0);
    }

    #[test]
    fn test_merge_ties_keep_insertion_order() {
        let day = date(2026, 1, 5);
        let merged = merge_agenda(vec![
            entry(10, day, Some(time(9, 0)), false),
            entry(11, day, Some(time(9, 0)), true),
        ]);

        let ids: Vec<_> = merged.iter().map(|event| event.id).collect();
        assert_eq!(ids, vec![10, 11]);
    }

    #[test]
    fn test_one_off_conversion_derives_minutes() {
        use chrono::{DateTime, Utc};
        use daybook_db::model::calendar::CalendarEvent;

        let event = CalendarEvent {
            id: 3,
            title: "Dentist".to_string(),
            description: None,
            location: Some("Downtown".to_string()),
            start_date: date(2026, 1, 5),
            end_date: date(2026, 1, 5),
            start_time: Some(time(16, 45)),
            end_time: Some(time(17, 30)),
            maybe: false,
            travel_time: 20,
            created_at: DateTime::<Utc>::UNIX_EPOCH,
            last_updated_at: DateTime::<Utc>::UNIX_EPOCH,
        };

        let agenda = AgendaEvent::from(event);
        assert!(!agenda.recurring);
        assert_eq!(agenda.start_minutes, 16 * 60 + 45);
        assert_eq!(agenda.end_minutes, 17 * 60 + 30);
    }
}
