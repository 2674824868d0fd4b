//! Shared primitives for the daybook workspace: configuration, the core
//! error type, and the calendar domain types every other crate builds on.

pub mod config;
pub mod constants;
pub mod error;
pub mod types;
