//! Maps domain `AppError` to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use vaultbox_core::error::{AppError, ErrorKind};

/// Result type of handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
}

/// An [`AppError`] on its way to becoming a response.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl ApiError {
    /// Status code for an error kind.
    pub fn status(kind: ErrorKind) -> StatusCode {
        match kind {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Unauthorized => StatusCode::FORBIDDEN,
            ErrorKind::InvalidOperation | ErrorKind::NotEmpty | ErrorKind::Conflict => {
                StatusCode::CONFLICT
            }
            ErrorKind::PasswordRequired
            | ErrorKind::InvalidPassword
            | ErrorKind::Authentication => StatusCode::UNAUTHORIZED,
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::TokenGenerationExhausted => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::ExternalStore => StatusCode::BAD_GATEWAY,
            ErrorKind::Configuration | ErrorKind::Serialization | ErrorKind::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status = Self::status(err.kind);

        let message = match err.kind {
            ErrorKind::Configuration | ErrorKind::Serialization | ErrorKind::Internal => {
                tracing::error!(kind = %err.kind, error = %err.message, "Internal server error");
                "An internal error occurred".to_string()
            }
            ErrorKind::ExternalStore => {
                tracing::error!(error = %err.message, "External store failure");
                "A storage backend is unavailable, please retry".to_string()
            }
            _ => err.message,
        };

        let body = ApiErrorResponse {
            error: err.kind.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::status(ErrorKind::Unauthorized), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::status(ErrorKind::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::status(ErrorKind::NotEmpty), StatusCode::CONFLICT);
        assert_eq!(ApiError::status(ErrorKind::InvalidOperation), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::status(ErrorKind::PasswordRequired),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::status(ErrorKind::InvalidPassword),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::status(ErrorKind::TokenGenerationExhausted),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_internal_detail_is_hidden() {
        let response = ApiError(AppError::internal("db password is hunter2")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
