//! Service layer: the agenda query (recurrence materialization plus event
//! merging) and the calendar mutation operations.

pub mod calendar;
pub mod error;
