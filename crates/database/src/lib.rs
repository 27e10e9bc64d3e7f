//! # Racing Database Crate
//!
//! The persistence gateway: relational CRUD for driver, team and race rows
//! on SQLite through `sqlx`.
//!
//! ## Public API
//!
//! - `connect` / `connect_in_memory`: build the connection pool.
//! - `run_migrations`: apply the embedded schema.
//! - `DbRepository`: all queries. It also implements `roster::RosterStore`, so
//!   the relationship engine runs directly against the database.
//! - `DbError`: the error type returned by every operation.

pub mod connection;
pub mod error;
pub mod repository;
mod roster_store;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{connect, connect_in_memory, run_migrations};
pub use error::DbError;
pub use repository::DbRepository;
// The driver is re-exported so callers can name its error type.
pub use sqlx;
