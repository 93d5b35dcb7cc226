use axum::extract::multipart::MultipartError;
use axum::{Json, http::StatusCode, response::IntoResponse, response::Redirect};
use serde::Serialize;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum LabdeskError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("authentication required")]
    Unauthorized,

    #[error("database error: {0}")]
    Database(#[from] SqlxError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("multipart error: {0}")]
    Multipart(#[from] MultipartError),

    #[error("PDF assembly failed: {0}")]
    Pdf(String),

    #[error("spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("password hash error: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),

    #[error("notification channel unavailable")]
    NotifierUnavailable,

    #[error("not found")]
    NotFound,
}

impl IntoResponse for LabdeskError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_body) = match self {
            // Missing session: back to the login page, no payload.
            LabdeskError::Unauthorized => return Redirect::to("/").into_response(),

            LabdeskError::Validation(msg) => (StatusCode::BAD_REQUEST, ApiErrorBody::new(msg)),

            LabdeskError::Multipart(e) => (
                StatusCode::BAD_REQUEST,
                ApiErrorBody::new(format!("malformed upload: {e}")),
            ),

            LabdeskError::Pdf(_) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiErrorBody::new("could not assemble PDF from the uploaded images".to_string()),
            ),

            LabdeskError::NotifierUnavailable => (
                StatusCode::BAD_GATEWAY,
                ApiErrorBody::new("unable to send OTP, please try again later".to_string()),
            ),

            LabdeskError::NotFound => (
                StatusCode::NOT_FOUND,
                ApiErrorBody::new("not found".to_string()),
            ),

            LabdeskError::Database(_)
            | LabdeskError::Io(_)
            | LabdeskError::Xlsx(_)
            | LabdeskError::PasswordHash(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiErrorBody::new("server error".to_string()),
            ),
        };
        (status, Json(error_body)).into_response()
    }
}

/// Standardized API failure body.
#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub success: bool,
    pub error: String,
}

impl ApiErrorBody {
    fn new(error: String) -> Self {
        Self {
            success: false,
            error,
        }
    }
}
