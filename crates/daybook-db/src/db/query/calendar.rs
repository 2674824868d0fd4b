//! Query composition for the calendar tables.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use daybook_core::types::DateSpan;

use crate::db::connection::DbConnection;
use crate::db::schema::{calendar_event, recurrence_exception, recurring_event};
use crate::model::calendar::{
    CalendarEvent, NewCalendarEvent, NewRecurrenceException, NewRecurringEvent,
    RecurrenceException, RecurringEvent,
};

/// ## Summary
/// Loads one-off events whose [`start_date`, `end_date`] overlaps `span`.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn events_overlapping(
    conn: &mut DbConnection<'_>,
    span: DateSpan,
) -> QueryResult<Vec<CalendarEvent>> {
    calendar_event::table
        .filter(calendar_event::start_date.le(span.end))
        .filter(calendar_event::end_date.ge(span.start))
        .order(calendar_event::id.asc())
        .select(CalendarEvent::as_select())
        .load(conn)
        .await
}

/// ## Summary
/// Loads recurring definitions whose recurrence window overlaps `span`.
///
/// A `NULL` window end means the definition is open-ended.
///
/// ## Errors
/// Returns an error if the database operation fails, including when a stored
/// recurrence kind fails to decode.
pub async fn recurring_overlapping(
    conn: &mut DbConnection<'_>,
    span: DateSpan,
) -> QueryResult<Vec<RecurringEvent>> {
    recurring_event::table
        .filter(recurring_event::recurrence_start.le(span.end))
        .filter(
            recurring_event::recurrence_end
                .is_null()
                .or(recurring_event::recurrence_end.ge(span.start)),
        )
        .order(recurring_event::id.asc())
        .select(RecurringEvent::as_select())
        .load(conn)
        .await
}

/// ## Summary
/// Loads the exceptions for one recurring definition, restricted to `span`.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn exceptions_in_span(
    conn: &mut DbConnection<'_>,
    recurring_event_id: i32,
    span: DateSpan,
) -> QueryResult<Vec<RecurrenceException>> {
    recurrence_exception::table
        .filter(recurrence_exception::recurring_event_id.eq(recurring_event_id))
        .filter(recurrence_exception::date.between(span.start, span.end))
        .select(RecurrenceException::as_select())
        .load(conn)
        .await
}

/// ## Summary
/// Inserts a one-off event and returns the stored row.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn insert_event(
    conn: &mut DbConnection<'_>,
    event: &NewCalendarEvent,
) -> QueryResult<CalendarEvent> {
    diesel::insert_into(calendar_event::table)
        .values(event)
        .returning(CalendarEvent::as_returning())
        .get_result(conn)
        .await
}

/// ## Summary
/// Deletes a one-off event by id; returns the number of rows removed.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn delete_event(conn: &mut DbConnection<'_>, id: i32) -> QueryResult<usize> {
    diesel::delete(calendar_event::table.filter(calendar_event::id.eq(id)))
        .execute(conn)
        .await
}

/// ## Summary
/// Inserts a recurring definition and returns the stored row.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn insert_recurring(
    conn: &mut DbConnection<'_>,
    event: &NewRecurringEvent,
) -> QueryResult<RecurringEvent> {
    diesel::insert_into(recurring_event::table)
        .values(event)
        .returning(RecurringEvent::as_returning())
        .get_result(conn)
        .await
}

/// ## Summary
/// Deletes a recurring definition by id; exceptions cascade in the database.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn delete_recurring(conn: &mut DbConnection<'_>, id: i32) -> QueryResult<usize> {
    diesel::delete(recurring_event::table.filter(recurring_event::id.eq(id)))
        .execute(conn)
        .await
}

/// ## Summary
/// Inserts or replaces the exception for `(recurring_event_id, date)`.
///
/// The UNIQUE constraint on that pair keeps the store at one exception row
/// per occurrence; a conflicting upsert replaces the stored times.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn upsert_exception(
    conn: &mut DbConnection<'_>,
    exception: &NewRecurrenceException,
) -> QueryResult<RecurrenceException> {
    diesel::insert_into(recurrence_exception::table)
        .values(exception)
        .on_conflict((
            recurrence_exception::recurring_event_id,
            recurrence_exception::date,
        ))
        .do_update()
        .set((
            recurrence_exception::start_time.eq(exception.start_time),
            recurrence_exception::end_time.eq(exception.end_time),
            recurrence_exception::last_updated_at.eq(diesel::dsl::now),
        ))
        .returning(RecurrenceException::as_returning())
        .get_result(conn)
        .await
}

/// ## Summary
/// Removes the exception for `(recurring_event_id, date)` if one exists.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn delete_exception(
    conn: &mut DbConnection<'_>,
    recurring_event_id: i32,
    date: chrono::NaiveDate,
) -> QueryResult<usize> {
    diesel::delete(
        recurrence_exception::table
            .filter(recurrence_exception::recurring_event_id.eq(recurring_event_id))
            .filter(recurrence_exception::date.eq(date)),
    )
    .execute(conn)
    .await
}
