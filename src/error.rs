use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Raised when a payload or record does not match the recommendation schema
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct DataValidationError(pub String);

impl DataValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Validation(#[from] DataValidationError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid range: {0}")]
    Range(String),

    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

const GENERIC_INTERNAL_MESSAGE: &str = "An internal error occurred";

/// PostgreSQL `check_violation`
const PG_CHECK_VIOLATION: &str = "23514";

impl AppError {
    /// Resolves the HTTP status and client-facing message for this error.
    ///
    /// Server-side causes are logged here and replaced with a generic message.
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            AppError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            AppError::Range(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::MethodNotAllowed(msg) => (StatusCode::METHOD_NOT_ALLOWED, msg.clone()),
            AppError::UnsupportedMediaType(msg) => {
                (StatusCode::UNSUPPORTED_MEDIA_TYPE, msg.clone())
            }
            AppError::Database(err) => classify_sqlx_error(err),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    GENERIC_INTERNAL_MESSAGE.to_string(),
                )
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::Range(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            AppError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AppError::Database(err) if is_check_violation(err) => StatusCode::BAD_REQUEST,
            AppError::Database(sqlx::Error::RowNotFound) => StatusCode::NOT_FOUND,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn is_check_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(PG_CHECK_VIOLATION))
}

fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, String) {
    match err {
        sqlx::Error::RowNotFound => (StatusCode::NOT_FOUND, "Resource not found".to_string()),
        sqlx::Error::Database(db_err) if is_check_violation(err) => {
            let constraint = db_err.constraint().unwrap_or("unknown");
            (
                StatusCode::BAD_REQUEST,
                format!("Invalid Recommendation: violates constraint {constraint}"),
            )
        }
        other => {
            tracing::error!(error = %other, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                GENERIC_INTERNAL_MESSAGE.to_string(),
            )
        }
    }
}

/// Builds the JSON body shared by every error response
pub fn error_body(status: StatusCode, message: &str) -> serde_json::Value {
    json!({
        "status": status.as_u16(),
        "error": status.canonical_reason().unwrap_or("Unknown"),
        "message": message,
    })
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        (status, Json(error_body(status, &message))).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::MissingJsonContentType(_) => AppError::UnsupportedMediaType(
                "Content-Type must be application/json".to_string(),
            ),
            other => AppError::Validation(DataValidationError::new(format!(
                "Invalid Recommendation: body of request contained bad or no data ({})",
                other.body_text()
            ))),
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(DataValidationError::new(format!(
            "Invalid query string: {}",
            rejection.body_text()
        )))
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        match rejection {
            PathRejection::FailedToDeserializePathParams(err) => AppError::Validation(
                DataValidationError::new(format!("Invalid path: {}", err.body_text())),
            ),
            other => AppError::Internal(other.body_text()),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
