mod app_specific;
mod calendar;

use salvo::Router;

// Re-export route constants from core
pub use daybook_core::constants::{
    API_ROUTE_COMPONENT, APP_ROUTE_COMPONENT, CALENDAR_ROUTE_COMPONENT,
};

/// ## Summary
/// Constructs the main API router with all handlers.
#[must_use]
pub fn routes() -> Router {
    Router::with_path(API_ROUTE_COMPONENT)
        .push(app_specific::routes())
        .push(calendar::routes())
}
