//! Merged patient listing and the spreadsheet export.

use crate::db::models::{PatientEntry, RecordTable};
use crate::error::LabdeskError;
use crate::middleware::AdminSession;
use crate::router::LabdeskState;
use crate::service::{export, patients};
use axum::Json;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;

/// Appointments and website leads folded into one listing for the staff UI.
pub async fn all_patients(
    State(state): State<LabdeskState>,
) -> Result<Json<Vec<PatientEntry>>, LabdeskError> {
    let appointments = state.storage.list_records(RecordTable::Appointments).await?;
    let leads = state.storage.list_records(RecordTable::WebsiteLeads).await?;
    Ok(Json(patients::merge_patients(&appointments, &leads)))
}

pub async fn download_excel(
    _session: AdminSession,
    State(state): State<LabdeskState>,
) -> Result<impl IntoResponse, LabdeskError> {
    let appointments = state.storage.list_records(RecordTable::Appointments).await?;
    let leads = state.storage.list_records(RecordTable::WebsiteLeads).await?;
    let bytes = export::workbook_bytes(&appointments, &leads)?;

    Ok((
        [
            (
                header::CONTENT_TYPE,
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            ),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"labdesk_records.xlsx\"",
            ),
        ],
        bytes,
    ))
}
