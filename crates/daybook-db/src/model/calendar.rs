//! Row models for one-off events, recurring definitions, and exceptions.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::db::enums::Recurrence;
use crate::db::schema::{calendar_event, recurrence_exception, recurring_event};

/// A one-off calendar event.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = calendar_event)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CalendarEvent {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    /// First day of the event.
    pub start_date: NaiveDate,
    /// Last day of the event, inclusive. Same as `start_date` for single-day
    /// events.
    pub end_date: NaiveDate,
    /// Time of day the event begins; `None` for all-day events.
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    /// Tentative events that may not happen.
    pub maybe: bool,
    /// Travel buffer in minutes to allow before the event.
    pub travel_time: i32,
    pub created_at: DateTime<Utc>,
    pub last_updated_at: DateTime<Utc>,
}

/// New one-off event for insertion.
#[derive(Debug, Clone, Insertable, Deserialize)]
#[diesel(table_name = calendar_event)]
pub struct NewCalendarEvent {
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    #[serde(default)]
    pub maybe: bool,
    #[serde(default)]
    pub travel_time: i32,
}

/// A recurring event definition.
///
/// Holds the rule and the recurrence window; concrete occurrences are
/// derived on demand and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = recurring_event)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RecurringEvent {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub recurrence: Recurrence,
    /// First day of the recurrence window; also anchors the weekly and
    /// yearly rules.
    pub recurrence_start: NaiveDate,
    /// Last day of the recurrence window, or `None` for open-ended.
    pub recurrence_end: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub last_updated_at: DateTime<Utc>,
}

/// New recurring definition for insertion.
#[derive(Debug, Clone, Insertable, Deserialize)]
#[diesel(table_name = recurring_event)]
pub struct NewRecurringEvent {
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub recurrence: Recurrence,
    pub recurrence_start: NaiveDate,
    pub recurrence_end: Option<NaiveDate>,
}

/// A per-date override or cancellation of a recurring occurrence.
///
/// Both times `None` means the occurrence on `date` is cancelled; otherwise
/// the present times replace the definition's for that date.
#[derive(
    Debug, Clone, PartialEq, Eq, Queryable, Selectable, Identifiable, Associations, Serialize,
)]
#[diesel(table_name = recurrence_exception)]
#[diesel(belongs_to(RecurringEvent))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RecurrenceException {
    pub id: i32,
    pub recurring_event_id: i32,
    pub date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub created_at: DateTime<Utc>,
    pub last_updated_at: DateTime<Utc>,
}

impl RecurrenceException {
    /// Whether this exception cancels the occurrence outright.
    #[must_use]
    pub const fn is_cancellation(&self) -> bool {
        self.start_time.is_none() && self.end_time.is_none()
    }
}

/// New or replacement exception for upsert.
#[derive(Debug, Clone, Insertable, Deserialize)]
#[diesel(table_name = recurrence_exception)]
pub struct NewRecurrenceException {
    pub recurring_event_id: i32,
    pub date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
}
