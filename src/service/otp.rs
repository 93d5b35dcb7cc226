//! Short-lived one-time passwords for the admin password reset.
//!
//! The store is owned by the application state and handed to the handlers; it
//! never outlives the process. At most one code is outstanding per email and
//! a re-issue overwrites the previous one ("latest OTP wins").

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use std::collections::HashMap;
use std::sync::Mutex;
use subtle::ConstantTimeEq;

/// Codes expire this many minutes after issuance.
pub const OTP_TTL_MINUTES: i64 = 5;

type Clock = Box<dyn Fn() -> DateTime<Utc> + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OtpOutcome {
    /// Correct and fresh; the entry has been consumed.
    Verified,
    /// Issued more than `OTP_TTL` ago; the entry has been discarded.
    Expired,
    /// Wrong code; the entry stays live until expiry.
    Invalid,
    /// No outstanding code for this email.
    NotFound,
}

struct OtpEntry {
    code: String,
    issued_at: DateTime<Utc>,
}

pub struct OtpStore {
    entries: Mutex<HashMap<String, OtpEntry>>,
    clock: Clock,
}

impl OtpStore {
    pub fn new() -> Self {
        Self::with_clock(Box::new(Utc::now))
    }

    /// Build a store reading time from `clock` instead of the system clock.
    pub fn with_clock(clock: Clock) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Issue a fresh 6-digit code for `email`, replacing any previous entry.
    /// Returns the code so the caller can dispatch it.
    pub fn issue(&self, email: &str) -> String {
        let code = generate_code();
        let mut entries = self.entries.lock().expect("otp store poisoned");
        entries.insert(
            email.to_string(),
            OtpEntry {
                code: code.clone(),
                issued_at: (self.clock)(),
            },
        );
        code
    }

    /// Check `submitted` against the outstanding code for `email`.
    pub fn verify(&self, email: &str, submitted: &str) -> OtpOutcome {
        let mut entries = self.entries.lock().expect("otp store poisoned");
        let Some(entry) = entries.get(email) else {
            return OtpOutcome::NotFound;
        };

        // Expiry wins over correctness: a stale entry is discarded unseen.
        if (self.clock)() - entry.issued_at > Duration::minutes(OTP_TTL_MINUTES) {
            entries.remove(email);
            return OtpOutcome::Expired;
        }

        if bool::from(entry.code.as_bytes().ct_eq(submitted.trim().as_bytes())) {
            entries.remove(email);
            OtpOutcome::Verified
        } else {
            OtpOutcome::Invalid
        }
    }
}

impl Default for OtpStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Uniform random 6-digit numeric code.
fn generate_code() -> String {
    let code: u32 = rand::rng().random_range(100_000..1_000_000);
    code.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicI64, Ordering};

    /// Store whose clock is `base + offset_secs`, driven by the test.
    fn clocked_store() -> (OtpStore, Arc<AtomicI64>) {
        let offset = Arc::new(AtomicI64::new(0));
        let in_clock = offset.clone();
        let base = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
        let store = OtpStore::with_clock(Box::new(move || {
            base + Duration::seconds(in_clock.load(Ordering::SeqCst))
        }));
        (store, offset)
    }

    #[test]
    fn code_is_six_digits() {
        let store = OtpStore::new();
        let code = store.issue("admin@example.com");
        assert_eq!(code.len(), 6);
        assert!(code.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn verifies_exactly_once() {
        let (store, _) = clocked_store();
        let code = store.issue("admin@example.com");
        assert_eq!(store.verify("admin@example.com", &code), OtpOutcome::Verified);
        // Consumed: the same value no longer matches anything.
        assert_eq!(store.verify("admin@example.com", &code), OtpOutcome::NotFound);
    }

    #[test]
    fn wrong_code_keeps_entry_live() {
        let (store, _) = clocked_store();
        let code = store.issue("admin@example.com");
        assert_eq!(store.verify("admin@example.com", "000000"), OtpOutcome::Invalid);
        assert_eq!(store.verify("admin@example.com", &code), OtpOutcome::Verified);
    }

    #[test]
    fn expires_after_five_minutes() {
        let (store, offset) = clocked_store();
        let code = store.issue("admin@example.com");

        // Exactly at the limit the code still works; one second past it does not.
        offset.store(5 * 60 + 1, Ordering::SeqCst);
        assert_eq!(store.verify("admin@example.com", &code), OtpOutcome::Expired);
        // The expired entry was discarded entirely.
        assert_eq!(store.verify("admin@example.com", &code), OtpOutcome::NotFound);
    }

    #[test]
    fn fresh_at_exactly_five_minutes() {
        let (store, offset) = clocked_store();
        let code = store.issue("admin@example.com");
        offset.store(5 * 60, Ordering::SeqCst);
        assert_eq!(store.verify("admin@example.com", &code), OtpOutcome::Verified);
    }

    #[test]
    fn reissue_overwrites_previous_code() {
        let (store, _) = clocked_store();
        let first = store.issue("admin@example.com");
        let second = store.issue("admin@example.com");
        if first != second {
            assert_eq!(store.verify("admin@example.com", &first), OtpOutcome::Invalid);
        }
        assert_eq!(store.verify("admin@example.com", &second), OtpOutcome::Verified);
    }

    #[test]
    fn unknown_email_reports_not_found() {
        let (store, _) = clocked_store();
        assert_eq!(store.verify("nobody@example.com", "123456"), OtpOutcome::NotFound);
    }
}
