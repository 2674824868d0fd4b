//! HTTP layer: salvo routing, depot wiring, and the server binary.

pub mod app;
pub mod config;
pub mod db_handler;
pub mod error;
