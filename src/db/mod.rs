//! Database module: models, schema and storage for the clinic tables.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows and request payloads
//! - `schema.rs`: versioned table definitions (SQLite)
//! - `sqlite.rs`: pool wrapper with migration and record operations

pub mod models;
pub mod schema;
pub mod sqlite;

pub use models::{NewRecord, PatientEntry, PatientRecord, RecordTable};
pub use sqlite::{ClinicStorage, SqlitePool};
