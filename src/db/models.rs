use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// The two live record tables. `bookings` is migrated but never written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordTable {
    Appointments,
    WebsiteLeads,
}

impl RecordTable {
    pub fn as_str(self) -> &'static str {
        match self {
            RecordTable::Appointments => "appointments",
            RecordTable::WebsiteLeads => "website_leads",
        }
    }
}

/// One row of `appointments` or `website_leads`. All data columns are
/// nullable: rows inserted before a migration added a column carry NULLs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct PatientRecord {
    pub id: i64,
    pub name: Option<String>,
    pub mobile: Option<String>,
    pub email: Option<String>,
    pub test_name: Option<String>,
    pub message: Option<String>,
    pub status: Option<String>,
    pub created_at: Option<String>,
}

/// Insert payload shared by `/book-test` and `/add-appointment`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub mobile: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub test_name: String,
    #[serde(default)]
    pub message: String,
}

impl NewRecord {
    /// Required fields for record creation: name, mobile, test_name.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.name.trim().is_empty()
            || self.mobile.trim().is_empty()
            || self.test_name.trim().is_empty()
        {
            return Err("name, mobile and test_name are required");
        }
        Ok(())
    }
}

/// One entry of the merged patient listing (`/get-all-patients`).
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PatientEntry {
    pub id: String,
    pub name: String,
    pub mobile: String,
    pub email: String,
}
