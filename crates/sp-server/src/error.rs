//! HTTP error responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use sp_security::{FailureKind, SecurityError};
use thiserror::Error;

/// Errors returned by request handlers.
#[derive(Debug, Error)]
pub enum AppError {
    /// The request is not allowed.
    #[error("{0}")]
    AccessDenied(String),

    /// Logout orchestration failed.
    #[error(transparent)]
    Security(#[from] SecurityError),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::AccessDenied(_) => StatusCode::FORBIDDEN,
            Self::Security(SecurityError::Saml(e)) => {
                StatusCode::from_u16(e.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            Self::Security(SecurityError::InvalidRequest(_)) => StatusCode::BAD_REQUEST,
            Self::Security(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the error code for responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::AccessDenied(_) => "access_denied",
            Self::Security(SecurityError::Saml(_)) => "saml_error",
            Self::Security(_) => "logout_error",
        }
    }

    /// Failure class seen by the failure-observing middleware.
    #[must_use]
    pub const fn failure_kind(&self) -> FailureKind {
        match self {
            Self::AccessDenied(_) => FailureKind::AccessDenied,
            Self::Security(_) => FailureKind::Other,
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub error: String,
    /// Human-readable error message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,
}

/// Marks a response as produced by a failed request.
///
/// Attached as a response extension so middleware can inspect the failure
/// after the handler ran.
#[derive(Debug, Clone)]
pub struct RequestFailure {
    /// Failure class.
    pub kind: FailureKind,
    /// Failure message.
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let failure = RequestFailure {
            kind: self.failure_kind(),
            message: self.to_string(),
        };
        let body = ErrorResponse {
            error: self.error_code().to_string(),
            error_description: Some(self.to_string()),
        };

        let mut response = (status, Json(body)).into_response();
        response.extensions_mut().insert(failure);
        response
    }
}

/// Result type for request handlers.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use sp_protocol_saml::SamlError;

    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(
            AppError::AccessDenied("Invalid CSRF token.".to_string()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::from(SecurityError::from(SamlError::MessageNotFound)).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(SecurityError::from(SamlError::Configuration("x".to_string())))
                .status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn response_carries_the_failure() {
        let response = AppError::AccessDenied("Invalid CSRF token.".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let failure = response.extensions().get::<RequestFailure>().unwrap();
        assert_eq!(failure.kind, FailureKind::AccessDenied);
        assert_eq!(failure.message, "Invalid CSRF token.");
    }
}
