//! Versioned table definitions for the clinic database.
//!
//! The record tables share one column list; `ensure_table` creates them when
//! absent and adds any missing columns to databases left behind by older
//! deployments. Read paths always use this fixed list, never live discovery.

/// Shared column list for the patient record tables. Every data column is
/// nullable TEXT so rows written before a column existed keep loading.
pub const RECORD_COLUMNS: &[(&str, &str)] = &[
    ("name", "TEXT"),
    ("mobile", "TEXT"),
    ("email", "TEXT"),
    ("test_name", "TEXT"),
    ("message", "TEXT"),
    ("status", "TEXT DEFAULT 'pending'"),
    ("created_at", "TEXT"),
];

/// Tables migrated against `RECORD_COLUMNS` at boot. `bookings` is a legacy
/// table kept only so old databases keep opening cleanly.
pub const RECORD_TABLES: &[&str] = &["website_leads", "appointments", "bookings"];

/// Admin credential table. `password` holds a bcrypt hash, never plaintext.
pub const ADMIN_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS admin (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    email TEXT UNIQUE,
    password TEXT
);
"#;

/// Fixed SELECT column list matching `PatientRecord`.
pub const RECORD_FIELDS: &str = "id, name, mobile, email, test_name, message, status, created_at";
