//! Diesel table definitions for the calendar store.

diesel::table! {
    calendar_event (id) {
        id -> Int4,
        title -> Text,
        description -> Nullable<Text>,
        location -> Nullable<Text>,
        start_date -> Date,
        end_date -> Date,
        start_time -> Nullable<Time>,
        end_time -> Nullable<Time>,
        maybe -> Bool,
        travel_time -> Int4,
        created_at -> Timestamptz,
        last_updated_at -> Timestamptz,
    }
}

diesel::table! {
    recurring_event (id) {
        id -> Int4,
        title -> Text,
        description -> Nullable<Text>,
        location -> Nullable<Text>,
        start_time -> Time,
        end_time -> Time,
        recurrence -> Text,
        recurrence_start -> Date,
        recurrence_end -> Nullable<Date>,
        created_at -> Timestamptz,
        last_updated_at -> Timestamptz,
    }
}

diesel::table! {
    recurrence_exception (id) {
        id -> Int4,
        recurring_event_id -> Int4,
        date -> Date,
        start_time -> Nullable<Time>,
        end_time -> Nullable<Time>,
        created_at -> Timestamptz,
        last_updated_at -> Timestamptz,
    }
}

diesel::joinable!(recurrence_exception -> recurring_event (recurring_event_id));

diesel::allow_tables_to_appear_in_same_query!(
    calendar_event,
    recurring_event,
    recurrence_exception,
);
