//! Admin login and the OTP-gated password reset flow.

use crate::api::brevo::OutboundEmail;
use crate::error::LabdeskError;
use crate::handlers::run_blocking;
use crate::middleware::auth::{
    RESET_ALLOWED_COOKIE, RESET_EMAIL_COOKIE, SESSION_COOKIE, clear_cookie, reset_allowed_cookie,
    reset_email_cookie, session_cookie, session_email,
};
use crate::router::LabdeskState;
use crate::service::OtpOutcome;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::{Form, Json};
use axum_extra::extract::cookie::PrivateCookieJar;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

pub async fn login_page(jar: PrivateCookieJar) -> Response {
    if session_email(&jar).is_some() {
        return Redirect::to("/dashboard").into_response();
    }
    Json(json!({ "message": "admin login required" })).into_response()
}

pub async fn login(
    State(state): State<LabdeskState>,
    jar: PrivateCookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, LabdeskError> {
    let email = form.email.trim().to_string();
    let password = form.password;

    let stored = state.storage.find_admin_password(&email).await?;
    let verified = match stored {
        Some(hash) => run_blocking(move || bcrypt::verify(&password, &hash)).await??,
        None => false,
    };

    if !verified {
        return Ok((
            StatusCode::UNAUTHORIZED,
            Json(json!({ "success": false, "error": "invalid email or password" })),
        )
            .into_response());
    }

    info!(%email, "admin logged in");
    let jar = jar.add(session_cookie(email));
    Ok((jar, Redirect::to("/dashboard")).into_response())
}

pub async fn logout(jar: PrivateCookieJar) -> Response {
    let jar = jar.remove(clear_cookie(SESSION_COOKIE));
    (jar, Redirect::to("/")).into_response()
}

#[derive(Debug, Deserialize)]
pub struct ForgotForm {
    #[serde(default)]
    pub email: String,
}

pub async fn forgot_page() -> Json<serde_json::Value> {
    Json(json!({ "message": "submit the registered admin email to receive an OTP" }))
}

pub async fn forgot(
    State(state): State<LabdeskState>,
    jar: PrivateCookieJar,
    Form(form): Form<ForgotForm>,
) -> Result<Response, LabdeskError> {
    let email = form.email.trim().to_string();

    let registered = state
        .config
        .admin_email
        .as_deref()
        .is_some_and(|admin| admin == email);
    if !registered || state.storage.find_admin_password(&email).await?.is_none() {
        return Err(LabdeskError::Validation("email not registered".to_string()));
    }

    // The only send failure observable before queuing is a channel that was
    // never configured; report it generically, without naming the cause.
    if !state.notifier.email_enabled() {
        return Err(LabdeskError::NotifierUnavailable);
    }

    let code = state.otp.issue(&email);
    state.notifier.send_email(OutboundEmail {
        to: email.clone(),
        to_name: "Admin".to_string(),
        subject: format!("{} admin password reset - OTP", state.config.clinic_name),
        html: otp_email_html(&state.config.clinic_name, &code),
        attachment: None,
    });

    info!("password reset OTP issued");
    let jar = jar.add(reset_email_cookie(email));
    Ok((jar, Redirect::to("/verify-otp")).into_response())
}

#[derive(Debug, Deserialize)]
pub struct VerifyOtpForm {
    #[serde(default)]
    pub otp: String,
}

pub async fn verify_otp_page(jar: PrivateCookieJar) -> Response {
    if jar.get(RESET_EMAIL_COOKIE).is_none() {
        return Redirect::to("/forgot").into_response();
    }
    Json(json!({ "message": "submit the OTP sent to the admin email" })).into_response()
}

pub async fn verify_otp(
    State(state): State<LabdeskState>,
    jar: PrivateCookieJar,
    Form(form): Form<VerifyOtpForm>,
) -> Result<Response, LabdeskError> {
    let Some(email) = jar.get(RESET_EMAIL_COOKIE).map(|c| c.value().to_string()) else {
        return Ok(Redirect::to("/forgot").into_response());
    };

    match state.otp.verify(&email, &form.otp) {
        OtpOutcome::Verified => {
            let jar = jar
                .remove(clear_cookie(RESET_EMAIL_COOKIE))
                .add(reset_allowed_cookie());
            Ok((jar, Redirect::to("/reset-password")).into_response())
        }
        OtpOutcome::Expired => Err(LabdeskError::Validation("OTP expired".to_string())),
        OtpOutcome::Invalid => Err(LabdeskError::Validation("invalid OTP".to_string())),
        OtpOutcome::NotFound => Err(LabdeskError::Validation("OTP not found".to_string())),
    }
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordForm {
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm: String,
}

pub async fn reset_password_page(jar: PrivateCookieJar) -> Response {
    if jar.get(RESET_ALLOWED_COOKIE).is_none() {
        return Redirect::to("/forgot").into_response();
    }
    Json(json!({ "message": "submit the new password twice" })).into_response()
}

pub async fn reset_password(
    State(state): State<LabdeskState>,
    jar: PrivateCookieJar,
    Form(form): Form<ResetPasswordForm>,
) -> Result<Response, LabdeskError> {
    if jar.get(RESET_ALLOWED_COOKIE).is_none() {
        return Ok(Redirect::to("/forgot").into_response());
    }

    if form.password.is_empty() {
        return Err(LabdeskError::Validation("password is required".to_string()));
    }
    if form.password != form.confirm {
        return Err(LabdeskError::Validation(
            "passwords do not match".to_string(),
        ));
    }

    let Some(admin_email) = state.config.admin_email.clone() else {
        return Err(LabdeskError::Validation(
            "admin account not configured".to_string(),
        ));
    };

    let password = form.password;
    let hash = run_blocking(move || bcrypt::hash(&password, bcrypt::DEFAULT_COST)).await??;
    state
        .storage
        .update_admin_password(&admin_email, &hash)
        .await?;

    info!("admin password reset completed");
    // The reset permission is single-use.
    let jar = jar.remove(clear_cookie(RESET_ALLOWED_COOKIE));
    Ok((
        jar,
        Json(json!({ "success": true, "message": "password reset successfully" })),
    )
        .into_response())
}

fn otp_email_html(clinic_name: &str, code: &str) -> String {
    format!(
        "<p>Dear Administrator,</p>\
         <p>We received a request to reset your {clinic_name} admin password.</p>\
         <p><strong>Your One Time Password (OTP) is:</strong></p>\
         <h2>{code}</h2>\
         <p>This OTP is valid for 5 minutes.</p>\
         <p>If you did not request this, please ignore this email.</p>\
         <p>Regards,<br>{clinic_name}</p>"
    )
}
