//! Shared harness for the route tests: a throwaway SQLite file, throwaway
//! upload/pdf directories, and a notification channel whose receiver the
//! test keeps so it can observe what the handlers enqueue.
#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, header};
use labdesk::config::Config;
use labdesk::db::ClinicStorage;
use labdesk::router::{LabdeskState, labdesk_router};
use labdesk::service::notifier::{NotificationJob, NotifierHandle};
use labdesk::service::{OtpStore, ReportStore};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::mpsc::UnboundedReceiver;

pub struct TestApp {
    pub app: Router,
    pub storage: ClinicStorage,
    pub jobs: UnboundedReceiver<NotificationJob>,
    pub db_path: PathBuf,
    pub upload_dir: PathBuf,
    pub pdf_dir: PathBuf,
}

pub fn unique_suffix() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();
    format!("{}-{}", std::process::id(), nanos)
}

pub async fn spawn_app(cfg: Config) -> TestApp {
    let suffix = unique_suffix();

    let mut db_path = std::env::temp_dir();
    db_path.push(format!("labdesk-test-{suffix}.sqlite"));
    let database_url = format!("sqlite:{}", db_path.display());
    let storage = ClinicStorage::connect(&database_url)
        .await
        .expect("failed to open test database");
    storage.init_schema().await.expect("schema init failed");

    let upload_dir = std::env::temp_dir().join(format!("labdesk-uploads-{suffix}"));
    let pdf_dir = std::env::temp_dir().join(format!("labdesk-pdfs-{suffix}"));
    let reports = ReportStore::new(&upload_dir, &pdf_dir).expect("report dirs");

    let (notifier, jobs) = NotifierHandle::channel(cfg.email_configured(), cfg.chat_configured());
    let otp = Arc::new(OtpStore::new());

    let state = LabdeskState::new(storage.clone(), otp, notifier, reports, cfg);
    TestApp {
        app: labdesk_router(state),
        storage,
        jobs,
        db_path,
        upload_dir,
        pdf_dir,
    }
}

impl TestApp {
    /// Drain the notification queue into a Vec for assertions.
    pub fn drain_jobs(&mut self) -> Vec<NotificationJob> {
        let mut jobs = Vec::new();
        while let Ok(job) = self.jobs.try_recv() {
            jobs.push(job);
        }
        jobs
    }

    pub fn cleanup(&self) {
        let _ = std::fs::remove_file(&self.db_path);
        let _ = std::fs::remove_dir_all(&self.upload_dir);
        let _ = std::fs::remove_dir_all(&self.pdf_dir);
    }
}

pub fn json_request(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("failed to build request")
}

pub fn form_request(uri: &str, body: &str, cookies: &[String]) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if !cookies.is_empty() {
        builder = builder.header(header::COOKIE, cookies.join("; "));
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("failed to build request")
}

pub fn get_request(uri: &str, cookies: &[String]) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if !cookies.is_empty() {
        builder = builder.header(header::COOKIE, cookies.join("; "));
    }
    builder
        .body(Body::empty())
        .expect("failed to build request")
}

/// `name=value` pairs from every Set-Cookie header, attributes stripped.
/// Cleared cookies (empty value) are dropped.
pub fn set_cookies<B>(resp: &Response<B>) -> Vec<String> {
    resp.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .filter(|pair| {
            pair.split_once('=')
                .is_some_and(|(_, value)| !value.is_empty())
        })
        .map(str::to_string)
        .collect()
}

/// Merge freshly set cookies over the ones carried so far.
pub fn merge_cookies(carried: &[String], fresh: Vec<String>) -> Vec<String> {
    let mut merged: Vec<String> = carried.to_vec();
    for cookie in fresh {
        let name = cookie.split('=').next().unwrap_or_default().to_string();
        merged.retain(|c| c.split('=').next().unwrap_or_default() != name);
        merged.push(cookie);
    }
    merged
}
