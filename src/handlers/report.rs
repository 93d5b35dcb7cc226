//! Image upload → PDF → asynchronous email delivery.

use crate::api::brevo::{EmailAttachment, OutboundEmail};
use crate::error::LabdeskError;
use crate::handlers::run_blocking;
use crate::router::LabdeskState;
use crate::service::report::allowed_file;
use axum::Json;
use axum::extract::{Multipart, Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use serde_json::{Value, json};
use std::path::PathBuf;
use tracing::{debug, info};

/// Multipart contract: `name` and `email` text fields plus one or more
/// `images` file parts. Parts with a disallowed extension are dropped
/// silently; an image that fails to decode aborts the whole request.
pub async fn convert_and_send_report(
    State(state): State<LabdeskState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, LabdeskError> {
    let mut display_name = "Patient".to_string();
    let mut email = String::new();
    let mut any_file = false;
    let mut staged: Vec<PathBuf> = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().map(str::to_string);
        match field_name.as_deref() {
            Some("name") => {
                let value = field.text().await?;
                let trimmed = value.trim();
                if !trimmed.is_empty() {
                    display_name = trimmed.to_string();
                }
            }
            Some("email") => email = field.text().await?.trim().to_string(),
            Some("images") => {
                let Some(filename) = field.file_name().map(str::to_string) else {
                    continue;
                };
                any_file = true;
                let bytes = field.bytes().await?;
                if allowed_file(&filename) {
                    staged.push(state.reports.stage_image(&filename, &bytes)?);
                } else {
                    debug!(%filename, "discarding upload with disallowed extension");
                }
            }
            _ => {}
        }
    }

    if email.is_empty() {
        return Err(LabdeskError::Validation("email required".to_string()));
    }
    if !any_file {
        return Err(LabdeskError::Validation("no images uploaded".to_string()));
    }
    if staged.is_empty() {
        return Err(LabdeskError::Validation("no valid images".to_string()));
    }

    let reports = state.reports.clone();
    let report = run_blocking(move || reports.assemble_pdf(&staged)).await??;
    info!(filename = %report.filename, pages = report.pages, "report assembled");

    let pdf_bytes = tokio::fs::read(&report.path).await?;
    state.notifier.send_email(OutboundEmail {
        to: email,
        to_name: display_name.clone(),
        subject: format!("Your lab test report - {}", state.config.clinic_name),
        html: report_email_html(&state.config.clinic_name, &display_name),
        attachment: Some(EmailAttachment {
            filename: report.filename.clone(),
            content: pdf_bytes,
        }),
    });

    Ok(Json(json!({
        "success": true,
        "message": "Report sent to patient email",
        "pdf_url": format!("/download-pdf/{}", report.filename),
    })))
}

pub async fn download_pdf(
    State(state): State<LabdeskState>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, LabdeskError> {
    let path = state
        .reports
        .pdf_path(&filename)
        .ok_or(LabdeskError::NotFound)?;
    let bytes = tokio::fs::read(path).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    ))
}

fn report_email_html(clinic_name: &str, name: &str) -> String {
    format!(
        "<div style=\"font-family: Arial, sans-serif; line-height: 1.6;\">\
         <h2>Lab Test Report</h2>\
         <p>Dear {name},</p>\
         <p>Your lab test report is now available. Please find the attached PDF \
         document containing your detailed results.</p>\
         <p>Thank you for choosing <strong>{clinic_name}</strong> for your \
         healthcare needs.</p>\
         <p>Warm regards,<br><strong>{clinic_name}</strong></p>\
         </div>"
    )
}
