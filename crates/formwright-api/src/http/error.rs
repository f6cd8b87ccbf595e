//! Application error type mapping to HTTP status codes and envelope format.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use formwright_types::error::{BuilderError, FormError};

use crate::http::response::ApiResponse;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Form library errors.
    Form(FormError),
    /// Builder session errors.
    Builder(BuilderError),
    /// No builder session with the given id.
    SessionNotFound,
    /// Validation error.
    Validation(String),
}

impl From<FormError> for AppError {
    fn from(e: FormError) -> Self {
        AppError::Form(e)
    }
}

impl From<BuilderError> for AppError {
    fn from(e: BuilderError) -> Self {
        AppError::Builder(e)
    }
}

impl AppError {
    /// Status code, machine-readable code and message for the envelope.
    pub fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Form(FormError::NotFound) => {
                (StatusCode::NOT_FOUND, "FORM_NOT_FOUND", "Form not found".to_string())
            }
            AppError::Form(FormError::InvalidSchema(msg)) => {
                (StatusCode::BAD_REQUEST, "INVALID_SCHEMA", msg.clone())
            }
            AppError::Form(e @ FormError::StorageError(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR", e.to_string())
            }
            AppError::Builder(e @ BuilderError::NoOpenForm) => {
                (StatusCode::CONFLICT, "NO_OPEN_FORM", e.to_string())
            }
            AppError::Builder(e @ BuilderError::SessionActive) => {
                (StatusCode::CONFLICT, "SESSION_ACTIVE", e.to_string())
            }
            AppError::Builder(e @ BuilderError::Persistence(_)) => {
                (StatusCode::SERVICE_UNAVAILABLE, "PERSISTENCE_ERROR", e.to_string())
            }
            AppError::SessionNotFound => (
                StatusCode::NOT_FOUND,
                "SESSION_NOT_FOUND",
                "Builder session not found".to_string(),
            ),
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        if status.is_server_error() {
            tracing::error!(code, %message, "request failed");
        }
        let body = ApiResponse::error(code, &message, uuid::Uuid::now_v7().to_string());
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::Form(FormError::NotFound).parts().0, StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::Form(FormError::InvalidSchema("dup".into())).parts().0,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Builder(BuilderError::NoOpenForm).parts().0,
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Builder(BuilderError::Persistence("disk".into())).parts().1,
            "PERSISTENCE_ERROR"
        );
        assert_eq!(AppError::SessionNotFound.parts().0, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_into_response_uses_status() {
        let resp = AppError::Validation("bad sort".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
