// ABOUTME: API error type and its HTTP mapping
// ABOUTME: Every failure renders as `{ "error": message }` without leaking internal detail

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use flowcraft_core::ErrorBody;
use flowcraft_storage::StorageError;
use thiserror::Error;
use tracing::error;

pub const MISSING_AUTHORIZATION: &str = "Missing authorization header";
pub const INVALID_TOKEN: &str = "Invalid or expired token";
pub const INTERNAL_SERVER_ERROR: &str = "Internal server error";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Unauthorized(&'static str),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    /// Message is the public text; the cause is logged where the error is built
    #[error("{0}")]
    Internal(&'static str),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { entity, .. } => {
                ApiError::NotFound(format!("{} not found", entity))
            }
            StorageError::Validation(e) => ApiError::BadRequest(e.to_string()),
            e @ StorageError::InvalidReference { .. } => ApiError::BadRequest(e.to_string()),
            StorageError::Conflict(message) => ApiError::Conflict(message),
            e => {
                error!(error = %e, "Storage failure");
                ApiError::Internal(INTERNAL_SERVER_ERROR)
            }
        }
    }
}

/// Unwrap a JSON body, turning extractor rejections into `{ "error" }` bodies
pub fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(ErrorBody::new(self.to_string()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowcraft_core::ValidationError;

    #[test]
    fn test_storage_errors_map_to_status_codes() {
        let not_found: ApiError = StorageError::issue_not_found("TSK-001").into();
        assert_eq!(not_found.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(not_found.to_string(), "Issue not found");

        let invalid: ApiError = StorageError::Validation(ValidationError::EmptyTitle).into();
        assert_eq!(invalid.status_code(), StatusCode::BAD_REQUEST);

        let conflict: ApiError = StorageError::Conflict("already completed".into()).into();
        assert_eq!(conflict.status_code(), StatusCode::CONFLICT);

        let internal: ApiError = StorageError::InvalidData("bad row".into()).into();
        assert_eq!(internal.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(internal.to_string(), INTERNAL_SERVER_ERROR);
    }
}
