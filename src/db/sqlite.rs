use crate::db::models::{NewRecord, PatientRecord, RecordTable};
use crate::db::schema::{ADMIN_INIT, RECORD_COLUMNS, RECORD_FIELDS, RECORD_TABLES};
use crate::error::LabdeskError;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Row, Sqlite};
use std::str::FromStr;
use tracing::debug;

pub type SqlitePool = Pool<Sqlite>;

#[derive(Clone)]
pub struct ClinicStorage {
    pool: SqlitePool,
}

impl ClinicStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if missing) the database file behind `database_url`.
    pub async fn connect(database_url: &str) -> Result<Self, LabdeskError> {
        let connect_opts = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(connect_opts).await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Bring the schema up to date: admin DDL plus an `ensure_table` pass over
    /// every record table. Runs once per process start; safe to re-run.
    pub async fn init_schema(&self) -> Result<(), LabdeskError> {
        // execute multiple statements safely (sqlx::query takes one at a time)
        for stmt in ADMIN_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&self.pool).await?;
        }
        for table in RECORD_TABLES {
            self.ensure_table(table, RECORD_COLUMNS).await?;
        }
        Ok(())
    }

    /// Guarantee `table` exists with at least `columns`, preserving existing
    /// data and any extra columns. Missing columns are added via
    /// `ALTER TABLE ADD COLUMN`; an individual add that conflicts with a
    /// concurrent migration is logged and skipped, never propagated.
    ///
    /// Table and column names come from in-crate constants; values are always
    /// bound.
    pub async fn ensure_table(
        &self,
        table: &str,
        columns: &[(&str, &str)],
    ) -> Result<(), LabdeskError> {
        let exists =
            sqlx::query("SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?")
                .bind(table)
                .fetch_optional(&self.pool)
                .await?;

        if exists.is_none() {
            let cols_sql = columns
                .iter()
                .map(|(name, typ)| format!("{name} {typ}"))
                .collect::<Vec<_>>()
                .join(", ");
            sqlx::query(&format!(
                "CREATE TABLE {table} (id INTEGER PRIMARY KEY AUTOINCREMENT, {cols_sql})"
            ))
            .execute(&self.pool)
            .await?;
            return Ok(());
        }

        let rows = sqlx::query(&format!("PRAGMA table_info({table})"))
            .fetch_all(&self.pool)
            .await?;
        let existing: Vec<String> = rows
            .iter()
            .map(|row| row.try_get("name"))
            .collect::<Result<_, _>>()?;

        for (name, typ) in columns {
            if existing.iter().any(|col| col == name) {
                continue;
            }
            if let Err(e) = sqlx::query(&format!("ALTER TABLE {table} ADD COLUMN {name} {typ}"))
                .execute(&self.pool)
                .await
            {
                debug!(table, column = name, error = %e, "skipping column add");
            }
        }
        Ok(())
    }

    pub async fn list_records(&self, table: RecordTable) -> Result<Vec<PatientRecord>, LabdeskError> {
        let rows = sqlx::query_as::<_, PatientRecord>(&format!(
            "SELECT {RECORD_FIELDS} FROM {} ORDER BY id",
            table.as_str()
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Insert a new record with status `pending`. Empty optional fields are
    /// stored as NULL. Returns the new row id.
    pub async fn insert_record(
        &self,
        table: RecordTable,
        record: &NewRecord,
    ) -> Result<i64, LabdeskError> {
        let non_empty = |s: &str| {
            let t = s.trim();
            (!t.is_empty()).then(|| t.to_string())
        };
        let result = sqlx::query(&format!(
            "INSERT INTO {} (name, mobile, email, test_name, message, status, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            table.as_str()
        ))
        .bind(record.name.trim())
        .bind(record.mobile.trim())
        .bind(non_empty(&record.email))
        .bind(record.test_name.trim())
        .bind(non_empty(&record.message))
        .bind("pending")
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// Update one record's status. Returns the number of rows touched.
    pub async fn update_status(
        &self,
        table: RecordTable,
        id: i64,
        status: &str,
    ) -> Result<u64, LabdeskError> {
        let result = sqlx::query(&format!(
            "UPDATE {} SET status = ? WHERE id = ?",
            table.as_str()
        ))
        .bind(status)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn count_records(&self, table: RecordTable) -> Result<i64, LabdeskError> {
        let count: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table.as_str()))
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// Insert the admin credential if no row for `email` exists yet.
    pub async fn seed_admin(&self, email: &str, password_hash: &str) -> Result<(), LabdeskError> {
        let existing = sqlx::query("SELECT id FROM admin WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        if existing.is_none() {
            sqlx::query("INSERT INTO admin (email, password) VALUES (?, ?)")
                .bind(email)
                .bind(password_hash)
                .execute(&self.pool)
                .await?;
        }
        Ok(())
    }

    pub async fn find_admin_password(&self, email: &str) -> Result<Option<String>, LabdeskError> {
        let row = sqlx::query("SELECT password FROM admin WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| r.try_get("password")).transpose().map_err(Into::into)
    }

    pub async fn update_admin_password(
        &self,
        email: &str,
        password_hash: &str,
    ) -> Result<(), LabdeskError> {
        sqlx::query("UPDATE admin SET password = ? WHERE email = ?")
            .bind(password_hash)
            .bind(email)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
