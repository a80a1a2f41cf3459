use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{repository::RepositoryError, storage::StorageError, uploads::UploadError};

/// AppError
///
/// Application-level error type returned by every handler. Each variant maps to one
/// HTTP status and a stable machine-readable code in the `{ "error", "code" }` body.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Missing required fields, schema mismatch or an unreadable request body.
    #[error("{0}")]
    Validation(String),

    /// No row matches the addressed slug.
    #[error("{entity} '{slug}' not found")]
    NotFound { entity: &'static str, slug: String },

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Upload(#[from] UploadError),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

/// ErrorCode
///
/// Attached to every error response as an extension so outer middleware (the production
/// redaction layer) can rebuild the body without parsing it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ErrorCode(pub &'static str);

impl AppError {
    pub fn not_found(entity: &'static str, slug: impl Into<String>) -> Self {
        AppError::NotFound {
            entity,
            slug: slug.into(),
        }
    }

    /// The HTTP status and error code this error is reported with.
    pub fn classify(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::Repository(RepositoryError::Conflict(_)) => {
                (StatusCode::CONFLICT, "CONFLICT")
            }
            AppError::Repository(RepositoryError::Decode(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "DECODE_ERROR")
            }
            AppError::Repository(RepositoryError::Database(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
            AppError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR"),
            AppError::Upload(UploadError::TooLarge { .. }) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "FILE_TOO_LARGE")
            }
            AppError::Upload(UploadError::UnsupportedType { .. }) => {
                (StatusCode::BAD_REQUEST, "UNSUPPORTED_MEDIA")
            }
            AppError::Upload(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.classify();

        match &self {
            AppError::Repository(RepositoryError::Decode(e)) => {
                tracing::error!(entity = e.entity, field = e.field, error = %e.source, "Stored JSON field failed to decode");
            }
            _ if status.is_server_error() => {
                tracing::error!(error = %self, code, "Request failed");
            }
            _ => {
                tracing::debug!(error = %self, code, "Request rejected");
            }
        }

        let body = json!({
            "error": self.to_string(),
            "code": code,
        });

        let mut response = (status, Json(body)).into_response();
        response.extensions_mut().insert(ErrorCode(code));
        response
    }
}
