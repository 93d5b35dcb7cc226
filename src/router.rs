use crate::config::Config;
use crate::db::ClinicStorage;
use crate::handlers;
use crate::service::{NotifierHandle, OtpStore, ReportStore};
use axum::extract::FromRef;
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_extra::extract::cookie::Key;
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::warn;

#[derive(Clone)]
pub struct LabdeskState {
    pub storage: ClinicStorage,
    pub otp: Arc<OtpStore>,
    pub notifier: NotifierHandle,
    pub reports: ReportStore,
    pub config: Arc<Config>,
    cookie_key: Key,
}

impl LabdeskState {
    pub fn new(
        storage: ClinicStorage,
        otp: Arc<OtpStore>,
        notifier: NotifierHandle,
        reports: ReportStore,
        config: Config,
    ) -> Self {
        let cookie_key = match config.session_secret.as_deref() {
            Some(secret) if !secret.is_empty() => Key::from(&pad_secret(secret)),
            _ => {
                warn!("SESSION_SECRET not set; using an ephemeral session key");
                Key::generate()
            }
        };
        Self {
            storage,
            otp,
            notifier,
            reports,
            config: Arc::new(config),
            cookie_key,
        }
    }
}

impl FromRef<LabdeskState> for Key {
    fn from_ref(state: &LabdeskState) -> Key {
        state.cookie_key.clone()
    }
}

/// `cookie::Key` wants at least 64 bytes; shorter secrets are cycled out to
/// length so a given secret always derives the same key.
fn pad_secret(secret: &str) -> Vec<u8> {
    secret
        .as_bytes()
        .iter()
        .copied()
        .cycle()
        .take(secret.len().max(64))
        .collect()
}

pub fn labdesk_router(state: LabdeskState) -> Router {
    Router::new()
        .route("/", get(handlers::auth::login_page).post(handlers::auth::login))
        .route(
            "/forgot",
            get(handlers::auth::forgot_page).post(handlers::auth::forgot),
        )
        .route(
            "/verify-otp",
            get(handlers::auth::verify_otp_page).post(handlers::auth::verify_otp),
        )
        .route(
            "/reset-password",
            get(handlers::auth::reset_password_page).post(handlers::auth::reset_password),
        )
        .route("/logout", get(handlers::auth::logout))
        .route("/dashboard", get(handlers::records::dashboard))
        .route("/appointments", get(handlers::records::appointments))
        .route("/website-leads", get(handlers::records::website_leads))
        .route("/add-appointment", post(handlers::records::add_appointment))
        .route("/book-test", post(handlers::records::book_test))
        .route(
            "/update-appointment-status",
            post(handlers::records::update_appointment_status),
        )
        .route(
            "/update-lead-status",
            post(handlers::records::update_lead_status),
        )
        .route("/get-lead-count", get(handlers::records::lead_count))
        .route("/send-whatsapp", get(handlers::records::send_whatsapp))
        .route("/get-all-patients", get(handlers::patients::all_patients))
        .route("/download-excel", get(handlers::patients::download_excel))
        .route(
            "/convert-and-send-report",
            post(handlers::report::convert_and_send_report),
        )
        .route("/download-pdf/{filename}", get(handlers::report::download_pdf))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
