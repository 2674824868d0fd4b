/// Route component constants shared across crates
pub const API_ROUTE_COMPONENT: &str = "api";
pub const CALENDAR_ROUTE_COMPONENT: &str = "calendar";
pub const APP_ROUTE_COMPONENT: &str = "app";

/// Date format used in URL path segments and exception keys.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
