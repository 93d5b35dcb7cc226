//! Unified patient listing over the two record tables.

use crate::db::models::{PatientEntry, PatientRecord};

/// Merge appointments and leads into one ordered listing. Appointments come
/// first with `appt_` ids, then leads with `lead_` ids. No de-duplication is
/// attempted even when the same person appears in both tables.
pub fn merge_patients(
    appointments: &[PatientRecord],
    leads: &[PatientRecord],
) -> Vec<PatientEntry> {
    let mut merged = Vec::with_capacity(appointments.len() + leads.len());

    for record in appointments {
        merged.push(PatientEntry {
            id: format!("appt_{}", record.id),
            name: record.name.clone().unwrap_or_default(),
            mobile: record.mobile.clone().unwrap_or_default(),
            email: record.email.clone().unwrap_or_default(),
        });
    }

    for record in leads {
        // Legacy lead rows kept the contact address inside the free-text
        // message; prefer the email column when it has a value.
        let candidate = match record.email.as_deref() {
            Some(email) if !email.is_empty() => Some(email),
            _ => record.message.as_deref(),
        };
        merged.push(PatientEntry {
            id: format!("lead_{}", record.id),
            name: record.name.clone().unwrap_or_default(),
            mobile: record.mobile.clone().unwrap_or_default(),
            email: candidate.filter(|c| looks_like_email(c)).unwrap_or("").to_string(),
        });
    }

    merged
}

/// The historical acceptance rule: contains `@` and no whitespace. Known to
/// accept malformed addresses like `a@@b`; pinned by tests below.
fn looks_like_email(candidate: &str) -> bool {
    candidate.contains('@') && !candidate.contains(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: i64, email: Option<&str>, message: Option<&str>) -> PatientRecord {
        PatientRecord {
            id,
            name: Some(format!("Patient {id}")),
            mobile: Some("9999999999".to_string()),
            email: email.map(str::to_string),
            test_name: Some("CBC".to_string()),
            message: message.map(str::to_string),
            status: Some("pending".to_string()),
            created_at: None,
        }
    }

    #[test]
    fn appointments_precede_leads_with_prefixed_ids() {
        let appts = vec![record(1, Some("a@x.com"), None)];
        let leads = vec![record(1, Some("b@x.com"), None)];
        let merged = merge_patients(&appts, &leads);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].id, "appt_1");
        assert_eq!(merged[0].email, "a@x.com");
        assert_eq!(merged[1].id, "lead_1");
        assert_eq!(merged[1].email, "b@x.com");
    }

    #[test]
    fn missing_emails_default_to_empty() {
        let appts = vec![record(7, None, None)];
        let leads = vec![record(3, None, Some("not-an-email no@ symbol here"))];
        let merged = merge_patients(&appts, &leads);
        assert_eq!(merged[0].email, "");
        assert_eq!(merged[1].email, "");
    }

    #[test]
    fn lead_message_can_stand_in_for_missing_email() {
        let leads = vec![record(4, None, Some("walkin@clinic.test"))];
        let merged = merge_patients(&[], &leads);
        assert_eq!(merged[0].email, "walkin@clinic.test");
    }

    // The exact acceptance boundary of the historical rule, including its
    // known false positive on doubled @.
    #[test]
    fn email_heuristic_boundary() {
        assert!(looks_like_email("a@b"));
        assert!(looks_like_email("a@@b"));
        assert!(!looks_like_email("a b@c"));
        assert!(!looks_like_email("no@ symbol here"));
        assert!(!looks_like_email("nobody"));
        assert!(!looks_like_email("tab\there@x"));
    }

    #[test]
    fn lead_email_column_is_still_subject_to_the_heuristic() {
        let leads = vec![record(9, Some("call me later"), None)];
        let merged = merge_patients(&[], &leads);
        assert_eq!(merged[0].email, "");
    }
}
