//! Persistence layer: diesel schema, row models, and query modules for the
//! calendar store.

pub mod db;
pub mod error;
pub mod model;
