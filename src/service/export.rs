//! Two-sheet spreadsheet export of the record tables.

use crate::db::models::PatientRecord;
use rust_xlsxwriter::{Workbook, Worksheet, XlsxError};

const HEADERS: &[&str] = &[
    "id",
    "name",
    "mobile",
    "email",
    "test_name",
    "message",
    "status",
    "created_at",
];

/// Build an xlsx workbook with an "Appointments" and a "Website Leads" sheet.
pub fn workbook_bytes(
    appointments: &[PatientRecord],
    leads: &[PatientRecord],
) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();

    let sheet = workbook.add_worksheet();
    sheet.set_name("Appointments")?;
    write_sheet(sheet, appointments)?;

    let sheet = workbook.add_worksheet();
    sheet.set_name("Website Leads")?;
    write_sheet(sheet, leads)?;

    workbook.save_to_buffer()
}

fn write_sheet(sheet: &mut Worksheet, records: &[PatientRecord]) -> Result<(), XlsxError> {
    for (col, header) in HEADERS.iter().enumerate() {
        sheet.write_string(0, col as u16, *header)?;
    }
    for (i, record) in records.iter().enumerate() {
        let row = (i + 1) as u32;
        sheet.write_number(row, 0, record.id as f64)?;
        let text_cells = [
            record.name.as_deref(),
            record.mobile.as_deref(),
            record.email.as_deref(),
            record.test_name.as_deref(),
            record.message.as_deref(),
            record.status.as_deref(),
            record.created_at.as_deref(),
        ];
        for (offset, value) in text_cells.iter().enumerate() {
            sheet.write_string(row, (offset + 1) as u16, value.unwrap_or_default())?;
        }
    }
    Ok(())
}
