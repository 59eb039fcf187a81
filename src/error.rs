// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

/// Global Application Error Enum.
/// Centralizes error handling and mapping to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    // 500 Internal Server Error
    InternalServerError(String),

    // 500 once the retry budget is spent; retried internally before that
    StorageBusy(String),

    // 400 Bad Request (payload validation)
    BadRequest(String),

    // 400 Bad Request (operation not allowed in the current state)
    InvalidState(String),

    // 401 Unauthorized
    AuthError(String),

    // 403 Forbidden (learner is not enrolled in the course)
    NotEnrolled(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict (e.g., quiz already assigned)
    Conflict(String),
}

impl AppError {
    /// Returns true for lock contention that is worth retrying.
    pub fn is_transient(&self) -> bool {
        matches!(self, AppError::StorageBusy(_))
    }

    /// Reports unresolved entities as 400 instead of 404.
    ///
    /// The chapter progress endpoints answer every missing entity with 400,
    /// which the frontend relies on.
    pub fn not_found_as_bad_request(self) -> Self {
        match self {
            AppError::NotFound(msg) => AppError::BadRequest(msg),
            other => other,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InternalServerError(_) | AppError::StorageBusy(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::BadRequest(_) | AppError::InvalidState(_) => StatusCode::BAD_REQUEST,
            AppError::AuthError(_) => StatusCode::UNAUTHORIZED,
            AppError::NotEnrolled(_) | AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for AppError {}

/// Implements `IntoResponse` for `AppError`.
/// Converts the error into a `{status, message}` JSON body with the matching status code.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match self {
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                "Internal Server Error".to_string()
            }
            AppError::StorageBusy(msg) => {
                tracing::error!("Storage still busy after retries: {}", msg);
                "Storage is busy, please try again".to_string()
            }
            AppError::BadRequest(msg)
            | AppError::InvalidState(msg)
            | AppError::AuthError(msg)
            | AppError::NotEnrolled(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg) => msg,
        };
        let body = Json(json!({
            "status": "error",
            "message": message,
        }));

        (status, body).into_response()
    }
}

/// SQLite primary result codes for lock contention (SQLITE_BUSY, SQLITE_LOCKED).
/// Extended codes such as SQLITE_BUSY_SNAPSHOT (517) share the low byte.
const SQLITE_BUSY: i64 = 5;
const SQLITE_LOCKED: i64 = 6;

fn is_lock_contention(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            let by_code = db_err
                .code()
                .and_then(|code| code.parse::<i64>().ok())
                .map(|code| matches!(code & 0xff, SQLITE_BUSY | SQLITE_LOCKED))
                .unwrap_or(false);
            by_code || db_err.message().contains("database is locked")
        }
        sqlx::Error::PoolTimedOut => true,
        _ => false,
    }
}

/// Converts `sqlx::Error` into `AppError`.
/// Lock contention becomes `StorageBusy` so the retry helper can pick it up.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        if is_lock_contention(&err) {
            return AppError::StorageBusy(err.to_string());
        }
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".to_string()),
            other => AppError::InternalServerError(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::BadRequest(err.to_string())
    }
}
