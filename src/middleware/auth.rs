use crate::error::LabdeskError;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::{Cookie, Key, PrivateCookieJar, SameSite};
use time::Duration;

pub const SESSION_COOKIE: &str = "labdesk_session";
pub const RESET_EMAIL_COOKIE: &str = "labdesk_reset_email";
pub const RESET_ALLOWED_COOKIE: &str = "labdesk_reset_allowed";

const SESSION_TTL: Duration = Duration::hours(24);
const RESET_TTL: Duration = Duration::minutes(15);

/// The authenticated admin identity, read from the private session cookie.
/// Requests without a valid session are redirected to the login page.
#[derive(Debug, Clone)]
pub struct AdminSession(pub String);

impl<S> FromRequestParts<S> for AdminSession
where
    S: Send + Sync,
    Key: FromRef<S>,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = PrivateCookieJar::from_request_parts(parts, state)
            .await
            .map_err(|_| LabdeskError::Unauthorized.into_response())?;
        match session_email(&jar) {
            Some(email) => Ok(Self(email)),
            None => Err(LabdeskError::Unauthorized.into_response()),
        }
    }
}

/// Non-rejecting session read for routes that degrade instead of redirecting.
pub fn session_email(jar: &PrivateCookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE).map(|c| c.value().to_string())
}

pub fn session_cookie(email: String) -> Cookie<'static> {
    build_cookie(SESSION_COOKIE, email, SESSION_TTL)
}

pub fn reset_email_cookie(email: String) -> Cookie<'static> {
    build_cookie(RESET_EMAIL_COOKIE, email, RESET_TTL)
}

pub fn reset_allowed_cookie() -> Cookie<'static> {
    build_cookie(RESET_ALLOWED_COOKIE, "1".to_string(), RESET_TTL)
}

fn build_cookie(name: &str, value: String, max_age: Duration) -> Cookie<'static> {
    Cookie::build(Cookie::new(name.to_string(), value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(max_age)
        .build()
}

pub fn clear_cookie(name: &str) -> Cookie<'static> {
    Cookie::build(Cookie::new(name.to_string(), ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}
