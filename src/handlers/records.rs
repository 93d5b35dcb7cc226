//! Record creation, status updates and the staff read views.

use crate::api::brevo::OutboundEmail;
use crate::db::models::{NewRecord, RecordTable};
use crate::error::LabdeskError;
use crate::middleware::AdminSession;
use crate::middleware::auth::session_email;
use crate::router::LabdeskState;
use axum::extract::State;
use axum::response::Redirect;
use axum::Json;
use axum_extra::extract::cookie::PrivateCookieJar;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

pub async fn dashboard(
    _session: AdminSession,
    State(state): State<LabdeskState>,
) -> Result<Json<Value>, LabdeskError> {
    let appointments = state.storage.count_records(RecordTable::Appointments).await?;
    let leads = state.storage.count_records(RecordTable::WebsiteLeads).await?;
    Ok(Json(json!({
        "appointments": appointments,
        "leads": leads,
        "alerts": 3,
    })))
}

pub async fn appointments(
    _session: AdminSession,
    State(state): State<LabdeskState>,
) -> Result<Json<Value>, LabdeskError> {
    let rows = state.storage.list_records(RecordTable::Appointments).await?;
    Ok(Json(json!({ "appointments": rows })))
}

/// Website leads, latest first.
pub async fn website_leads(
    _session: AdminSession,
    State(state): State<LabdeskState>,
) -> Result<Json<Value>, LabdeskError> {
    let mut rows = state.storage.list_records(RecordTable::WebsiteLeads).await?;
    rows.reverse();
    Ok(Json(json!({ "website_leads": rows })))
}

/// Lead counter for the dashboard badge; unauthenticated callers see zero
/// rather than a redirect.
pub async fn lead_count(
    State(state): State<LabdeskState>,
    jar: PrivateCookieJar,
) -> Result<Json<Value>, LabdeskError> {
    if session_email(&jar).is_none() {
        return Ok(Json(json!({ "count": 0 })));
    }
    let count = state.storage.count_records(RecordTable::WebsiteLeads).await?;
    Ok(Json(json!({ "count": count })))
}

/// Staff manual entry of a walk-in appointment.
pub async fn add_appointment(
    State(state): State<LabdeskState>,
    Json(record): Json<NewRecord>,
) -> Result<Json<Value>, LabdeskError> {
    record
        .validate()
        .map_err(|msg| LabdeskError::Validation(msg.to_string()))?;

    let id = state
        .storage
        .insert_record(RecordTable::Appointments, &record)
        .await?;
    info!(id, "appointment recorded");
    Ok(Json(json!({ "success": true })))
}

/// Public booking submission from the clinic website.
pub async fn book_test(
    State(state): State<LabdeskState>,
    Json(record): Json<NewRecord>,
) -> Result<Json<Value>, LabdeskError> {
    record
        .validate()
        .map_err(|_| LabdeskError::Validation("missing required fields".to_string()))?;

    let id = state
        .storage
        .insert_record(RecordTable::WebsiteLeads, &record)
        .await?;
    info!(id, test = %record.test_name, "website lead recorded");

    state.notifier.send_alert(format!(
        "NEW WEBSITE LEAD\n\nName: {}\nPhone: {}\nTest: {}\nSource: Website",
        record.name.trim(),
        record.mobile.trim(),
        record.test_name.trim()
    ));

    // Only book confirmation mail when the patient left an address.
    let email = record.email.trim();
    if !email.is_empty() {
        state.notifier.send_email(OutboundEmail {
            to: email.to_string(),
            to_name: record.name.trim().to_string(),
            subject: format!("{} booking confirmation", state.config.clinic_name),
            html: booking_email_html(
                &state.config.clinic_name,
                record.name.trim(),
                record.test_name.trim(),
            ),
            attachment: None,
        });
    }

    Ok(Json(json!({
        "status": "success",
        "message": "Booking saved successfully!",
    })))
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub id: Option<i64>,
    pub status: Option<String>,
}

pub async fn update_appointment_status(
    State(state): State<LabdeskState>,
    Json(update): Json<StatusUpdate>,
) -> Result<Json<Value>, LabdeskError> {
    apply_status_update(&state, RecordTable::Appointments, update).await
}

pub async fn update_lead_status(
    State(state): State<LabdeskState>,
    Json(update): Json<StatusUpdate>,
) -> Result<Json<Value>, LabdeskError> {
    apply_status_update(&state, RecordTable::WebsiteLeads, update).await
}

async fn apply_status_update(
    state: &LabdeskState,
    table: RecordTable,
    update: StatusUpdate,
) -> Result<Json<Value>, LabdeskError> {
    let (Some(id), Some(status)) = (update.id, update.status.filter(|s| !s.is_empty())) else {
        return Err(LabdeskError::Validation(
            "id and status are required".to_string(),
        ));
    };
    let touched = state.storage.update_status(table, id, &status).await?;
    info!(table = table.as_str(), id, %status, touched, "status updated");
    Ok(Json(json!({ "success": true })))
}

pub async fn send_whatsapp() -> Redirect {
    Redirect::to("https://wa.me/")
}

fn booking_email_html(clinic_name: &str, name: &str, test_name: &str) -> String {
    format!(
        "<div style=\"font-family: Arial, sans-serif; line-height: 1.6;\">\
         <h2>Booking Confirmation</h2>\
         <p>Dear {name},</p>\
         <p>Thank you for booking your <strong>{test_name}</strong> test with {clinic_name}.</p>\
         <p>We have received your request. Our team will contact you shortly to \
         confirm the details and schedule your appointment.</p>\
         <p>Best regards,<br><strong>{clinic_name}</strong></p>\
         </div>"
    )
}
