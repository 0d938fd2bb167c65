use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;
use tracing::error;

#[derive(Debug, ThisError)]
pub enum JournalError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0} required")]
    MissingParameter(&'static str),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("{0}")]
    DatabaseError(#[from] SqlxError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] Box<figment::Error>),
}

impl JournalError {
    pub fn status(&self) -> StatusCode {
        match self {
            JournalError::BadRequest(_) | JournalError::MissingParameter(_) => {
                StatusCode::BAD_REQUEST
            }
            JournalError::Unauthorized => StatusCode::UNAUTHORIZED,
            JournalError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            JournalError::DatabaseError(_)
            | JournalError::Io(_)
            | JournalError::Json(_)
            | JournalError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self.status() {
            StatusCode::BAD_REQUEST => "BAD_REQUEST",
            StatusCode::UNAUTHORIZED => "UNAUTHORIZED",
            StatusCode::METHOD_NOT_ALLOWED => "METHOD_NOT_ALLOWED",
            _ => "INTERNAL_ERROR",
        }
    }
}

impl From<figment::Error> for JournalError {
    fn from(e: figment::Error) -> Self {
        JournalError::Config(Box::new(e))
    }
}

impl IntoResponse for JournalError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        // Store failures surface their raw text to the caller.
        let body = ApiErrorBody {
            code: self.code().to_string(),
            message: self.to_string(),
        };
        (status, Json(ApiErrorResponse { error: body })).into_response()
    }
}

/// Standardized API error response body
#[derive(Serialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}
