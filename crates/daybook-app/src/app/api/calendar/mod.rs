//! Handlers for the calendar agenda query and mutations.

use chrono::{NaiveDate, NaiveTime};
use salvo::http::StatusCode;
use salvo::prelude::Json;
use salvo::{Depot, Request, Response, Router, handler};
use serde::Deserialize;
use serde_json::json;

use daybook_core::constants::{CALENDAR_ROUTE_COMPONENT, DATE_FORMAT};
use daybook_core::error::CoreError;
use daybook_db::model::calendar::{NewCalendarEvent, NewRecurringEvent};
use daybook_service::calendar;
use daybook_service::error::ServiceError;

use crate::db_handler::get_db_from_depot;

#[must_use]
pub fn routes() -> Router {
    Router::with_path(CALENDAR_ROUTE_COMPONENT)
        .push(Router::with_path("events/list/{start}/{end}").get(list_events))
        .push(
            Router::with_path("events")
                .post(create_event)
                .push(Router::with_path("{id}").delete(delete_event)),
        )
        .push(
            Router::with_path("recurring").post(create_recurring).push(
                Router::with_path("{id}").delete(delete_recurring).push(
                    Router::with_path("exceptions/{date}")
                        .put(put_exception)
                        .delete(remove_exception),
                ),
            ),
        )
}

fn parse_date_param(req: &Request, name: &str) -> Option<NaiveDate> {
    let raw = req.param::<String>(name)?;
    NaiveDate::parse_from_str(&raw, DATE_FORMAT).ok()
}

fn render_bad_request(res: &mut Response, message: &str) {
    res.status_code(StatusCode::BAD_REQUEST);
    res.render(Json(json!({ "error": message })));
}

fn render_service_error(res: &mut Response, err: &ServiceError) {
    let status = match err {
        ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        ServiceError::ValidationError(_)
        | ServiceError::CoreError(CoreError::InvalidInput(_) | CoreError::ValidationError(_)) => {
            StatusCode::BAD_REQUEST
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!(error = %err, "Calendar request failed");
    } else {
        tracing::debug!(error = %err, status = %status, "Calendar request rejected");
    }

    res.status_code(status);
    res.render(Json(json!({ "error": err.to_string() })));
}

/// Body of `PUT recurring/{id}/exceptions/{date}`. Omitting both times
/// cancels the occurrence.
#[derive(Debug, Deserialize)]
pub struct ExceptionBody {
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
}

/// ## Summary
/// Handles `GET events/list/{start}/{end}`: the ordered agenda for an
/// inclusive date range.
///
/// ## Errors
/// Renders 400 for unparsable dates or a reversed range, 500 for database
/// errors.
#[handler]
#[tracing::instrument(skip_all, fields(path = %req.uri().path()))]
pub async fn list_events(req: &mut Request, depot: &Depot, res: &mut Response) {
    let Some(start) = parse_date_param(req, "start") else {
        render_bad_request(res, "invalid start date, expected YYYY-MM-DD");
        return;
    };
    let Some(end) = parse_date_param(req, "end") else {
        render_bad_request(res, "invalid end date, expected YYYY-MM-DD");
        return;
    };

    let provider = match get_db_from_depot(depot) {
        Ok(provider) => provider,
        Err(e) => {
            tracing::error!(error = %e, "Failed to get database provider");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            return;
        }
    };
    let mut conn = match provider.get_connection().await {
        Ok(conn) => conn,
        Err(e) => {
            tracing::error!(error = %e, "Failed to get database connection");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            return;
        }
    };

    match calendar::list_events(&mut conn, start, end).await {
        Ok(events) => res.render(Json(events)),
        Err(err) => render_service_error(res, &err),
    }
}

/// ## Summary
/// Handles `POST events`: creates a one-off event from a JSON body.
#[handler]
#[tracing::instrument(skip_all)]
pub async fn create_event(req: &mut Request, depot: &Depot, res: &mut Response) {
    let event = match req.parse_json::<NewCalendarEvent>().await {
        Ok(event) => event,
        Err(e) => {
            tracing::debug!(error = %e, "Malformed event body");
            render_bad_request(res, "malformed event body");
            return;
        }
    };

    let provider = match get_db_from_depot(depot) {
        Ok(provider) => provider,
        Err(e) => {
            tracing::error!(error = %e, "Failed to get database provider");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            return;
        }
    };
    let mut conn = match provider.get_connection().await {
        Ok(conn) => conn,
        Err(e) => {
            tracing::error!(error = %e, "Failed to get database connection");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            return;
        }
    };

    match calendar::create_event(&mut conn, &event).await {
        Ok(created) => {
            res.status_code(StatusCode::CREATED);
            res.render(Json(created));
        }
        Err(err) => render_service_error(res, &err),
    }
}

/// ## Summary
/// Handles `DELETE events/{id}`.
#[handler]
#[tracing::instrument(skip_all)]
pub async fn delete_event(req: &mut Request, depot: &Depot, res: &mut Response) {
    let Some(id) = req.param::<i32>("id") else {
        render_bad_request(res, "invalid event id");
        return;
    };

    let provider = match get_db_from_depot(depot) {
        Ok(provider) => provider,
        Err(e) => {
            tracing::error!(error = %e, "Failed to get database provider");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            return;
        }
    };
    let mut conn = match provider.get_connection().await {
        Ok(conn) => conn,
        Err(e) => {
            tracing::error!(error = %e, "Failed to get database connection");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            return;
        }
    };

    match calendar::delete_event(&mut conn, id).await {
        Ok(()) => {
            res.status_code(StatusCode::NO_CONTENT);
        }
        Err(err) => render_service_error(res, &err),
    }
}

/// ## Summary
/// Handles `POST recurring`: creates a recurring definition from a JSON
/// body.
#[handler]
#[tracing::instrument(skip_all)]
pub async fn create_recurring(req: &mut Request, depot: &Depot, res: &mut Response) {
    let definition = match req.parse_json::<NewRecurringEvent>().await {
        Ok(definition) => definition,
        Err(e) => {
            tracing::debug!(error = %e, "Malformed recurring event body");
            render_bad_request(res, "malformed recurring event body");
            return;
        }
    };

    let provider = match get_db_from_depot(depot) {
        Ok(provider) => provider,
        Err(e) => {
            tracing::error!(error = %e, "Failed to get database provider");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            return;
        }
    };
    let mut conn = match provider.get_connection().await {
        Ok(conn) => conn,
        Err(e) => {
            tracing::error!(error = %e, "Failed to get database connection");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            return;
        }
    };

    match calendar::create_recurring(&mut conn, &definition).await {
        Ok(created) => {
            res.status_code(StatusCode::CREATED);
            res.render(Json(created));
        }
        Err(err) => render_service_error(res, &err),
    }
}

/// ## Summary
/// Handles `DELETE recurring/{id}`; stored exceptions cascade.
#[handler]
#[tracing::instrument(skip_all)]
pub async fn delete_recurring(req: &mut Request, depot: &Depot, res: &mut Response) {
    let Some(id) = req.param::<i32>("id") else {
        render_bad_request(res, "invalid recurring event id");
        return;
    };

    let provider = match get_db_from_depot(depot) {
        Ok(provider) => provider,
        Err(e) => {
            tracing::error!(error = %e, "Failed to get database provider");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            return;
        }
    };
    let mut conn = match provider.get_connection().await {
        Ok(conn) => conn,
        Err(e) => {
            tracing::error!(error = %e, "Failed to get database connection");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            return;
        }
    };

    match calendar::delete_recurring(&mut conn, id).await {
        Ok(()) => {
            res.status_code(StatusCode::NO_CONTENT);
        }
        Err(err) => render_service_error(res, &err),
    }
}

/// ## Summary
/// Handles `PUT recurring/{id}/exceptions/{date}`: sets the override or
/// cancellation for one occurrence, replacing any stored exception for that
/// date.
#[handler]
#[tracing::instrument(skip_all)]
pub async fn put_exception(req: &mut Request, depot: &Depot, res: &mut Response) {
    let Some(id) = req.param::<i32>("id") else {
        render_bad_request(res, "invalid recurring event id");
        return;
    };
    let Some(date) = parse_date_param(req, "date") else {
        render_bad_request(res, "invalid exception date, expected YYYY-MM-DD");
        return;
    };
    let body = match req.parse_json::<ExceptionBody>().await {
        Ok(body) => body,
        Err(e) => {
            tracing::debug!(error = %e, "Malformed exception body");
            render_bad_request(res, "malformed exception body");
            return;
        }
    };

    let provider = match get_db_from_depot(depot) {
        Ok(provider) => provider,
        Err(e) => {
            tracing::error!(error = %e, "Failed to get database provider");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            return;
        }
    };
    let mut conn = match provider.get_connection().await {
        Ok(conn) => conn,
        Err(e) => {
            tracing::error!(error = %e, "Failed to get database connection");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            return;
        }
    };

    match calendar::set_exception(&mut conn, id, date, body.start_time, body.end_time).await {
        Ok(_exception) => {
            res.status_code(StatusCode::NO_CONTENT);
        }
        Err(err) => render_service_error(res, &err),
    }
}

/// ## Summary
/// Handles `DELETE recurring/{id}/exceptions/{date}`: restores the regular
/// rule for one occurrence. Deleting an absent exception is a no-op.
#[handler]
#[tracing::instrument(skip_all)]
pub async fn remove_exception(req: &mut Request, depot: &Depot, res: &mut Response) {
    let Some(id) = req.param::<i32>("id") else {
        render_bad_request(res, "invalid recurring event id");
        return;
    };
    let Some(date) = parse_date_param(req, "date") else {
        render_bad_request(res, "invalid exception date, expected YYYY-MM-DD");
        return;
    };

    let provider = match get_db_from_depot(depot) {
        Ok(provider) => provider,
        Err(e) => {
            tracing::error!(error = %e, "Failed to get database provider");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            return;
        }
    };
    let mut conn = match provider.get_connection().await {
        Ok(conn) => conn,
        Err(e) => {
            tracing::error!(error = %e, "Failed to get database connection");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            return;
        }
    };

    match calendar::clear_exception(&mut conn, id, date).await {
        Ok(()) => {
            res.status_code(StatusCode::NO_CONTENT);
        }
        Err(err) => render_service_error(res, &err),
    }
}
