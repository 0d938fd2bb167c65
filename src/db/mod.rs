//! Database module: models and schema for persistent storage.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows
//! - `schema.rs`: SQL DDL for initializing the database
//! - `sqlite.rs`: the `JournalStore` repository over a SQLite pool

pub mod models;
pub mod schema;
pub mod sqlite;

pub use models::{KeyValue, Tab};
pub use schema::SQLITE_INIT;
pub use sqlite::{JournalStore, SqlitePool};
