//! SQLite-backed implementations of the stores.

pub mod config;
pub mod constants;
pub mod errors;
pub mod sqlite;
