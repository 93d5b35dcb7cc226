mod common;

use axum::body::to_bytes;
use axum::http::{StatusCode, header};
use common::{form_request, get_request, json_request, set_cookies, spawn_app};
use labdesk::config::Config;
use tower::ServiceExt;
use serde_json::json;

#[tokio::test]
async fn merged_listing_prefixes_sources_and_blanks_bad_emails() {
    let app = spawn_app(Config::default()).await;

    app.app
        .clone()
        .oneshot(json_request(
            "/add-appointment",
            json!({ "name": "Walk In", "mobile": "7777777777", "test_name": "CBC" }),
        ))
        .await
        .expect("appointment failed");

    app.app
        .clone()
        .oneshot(json_request(
            "/book-test",
            json!({
                "name": "Lead",
                "mobile": "9999999999",
                "test_name": "CBC",
                "message": "not-an-email no@ symbol here",
            }),
        ))
        .await
        .expect("lead failed");

    let resp = app
        .app
        .clone()
        .oneshot(get_request("/get-all-patients", &[]))
        .await
        .expect("listing failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let body = to_bytes(resp.into_body(), usize::MAX).await.expect("body");
    let entries: serde_json::Value = serde_json::from_slice(&body).expect("json");
    let entries = entries.as_array().expect("array");
    assert_eq!(entries.len(), 2);

    assert!(entries[0]["id"].as_str().unwrap().starts_with("appt_"));
    assert_eq!(entries[0]["email"], "");
    assert!(entries[1]["id"].as_str().unwrap().starts_with("lead_"));
    // The free-text message contains whitespace, so the email heuristic
    // rejects it.
    assert_eq!(entries[1]["email"], "");

    app.cleanup();
}

#[tokio::test]
async fn excel_export_requires_session_and_returns_a_workbook() {
    let cfg = Config {
        admin_email: Some("admin@clinic.test".to_string()),
        session_secret: Some("a-fixed-test-secret".to_string()),
        ..Config::default()
    };
    let app = spawn_app(cfg).await;
    let hash = bcrypt::hash("pw", 4).expect("hash");
    app.storage
        .seed_admin("admin@clinic.test", &hash)
        .await
        .expect("seed");

    // Anonymous: bounced to the login page.
    let resp = app
        .app
        .clone()
        .oneshot(get_request("/download-excel", &[]))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let resp = app
        .app
        .clone()
        .oneshot(form_request("/", "email=admin%40clinic.test&password=pw", &[]))
        .await
        .expect("login failed");
    let cookies = set_cookies(&resp);

    let resp = app
        .app
        .clone()
        .oneshot(get_request("/download-excel", &cookies))
        .await
        .expect("export failed");
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(
        resp.headers()
            .get(header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .contains("attachment")
    );
    let body = to_bytes(resp.into_body(), usize::MAX).await.expect("body");
    // xlsx files are zip archives
    assert_eq!(&body[..2], b"PK");

    app.cleanup();
}

#[tokio::test]
async fn website_leads_view_lists_latest_first() {
    let cfg = Config {
        admin_email: Some("admin@clinic.test".to_string()),
        session_secret: Some("a-fixed-test-secret".to_string()),
        ..Config::default()
    };
    let app = spawn_app(cfg).await;
    let hash = bcrypt::hash("pw", 4).expect("hash");
    app.storage
        .seed_admin("admin@clinic.test", &hash)
        .await
        .expect("seed");

    for name in ["Older", "Newer"] {
        app.app
            .clone()
            .oneshot(json_request(
                "/book-test",
                json!({ "name": name, "mobile": "9999999999", "test_name": "CBC" }),
            ))
            .await
            .expect("insert failed");
    }

    let resp = app
        .app
        .clone()
        .oneshot(form_request("/", "email=admin%40clinic.test&password=pw", &[]))
        .await
        .expect("login failed");
    let cookies = set_cookies(&resp);

    let resp = app
        .app
        .clone()
        .oneshot(get_request("/website-leads", &cookies))
        .await
        .expect("view failed");
    assert_eq!(resp.status(), StatusCode::OK);
    let body = to_bytes(resp.into_body(), usize::MAX).await.expect("body");
    let payload: serde_json::Value = serde_json::from_slice(&body).expect("json");
    let leads = payload["website_leads"].as_array().expect("array");
    assert_eq!(leads[0]["name"], "Newer");
    assert_eq!(leads[1]["name"], "Older");

    app.cleanup();
}

#[tokio::test]
async fn lead_count_degrades_to_zero_without_a_session() {
    let app = spawn_app(Config::default()).await;

    app.app
        .clone()
        .oneshot(json_request(
            "/book-test",
            json!({ "name": "Lead", "mobile": "9999999999", "test_name": "CBC" }),
        ))
        .await
        .expect("insert failed");

    let resp = app
        .app
        .clone()
        .oneshot(get_request("/get-lead-count", &[]))
        .await
        .expect("count failed");
    assert_eq!(resp.status(), StatusCode::OK);
    let body = to_bytes(resp.into_body(), usize::MAX).await.expect("body");
    let payload: serde_json::Value = serde_json::from_slice(&body).expect("json");
    assert_eq!(payload["count"], 0);

    app.cleanup();
}
