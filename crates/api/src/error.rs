//! API error types with HTTP response mapping.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::{DenyReason, DomainError};
use order_store::StoreError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Bad request from the client.
    BadRequest(String),
    /// Request body is not valid JSON or does not match the expected shape.
    InvalidBody(String),
    /// Domain logic error.
    Domain(DomainError),
    /// Catalog read failed.
    Store(StoreError),
}

impl ApiError {
    /// HTTP status, machine-readable kind, and message for this error.
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BadRequest", msg.clone()),
            ApiError::InvalidBody(msg) => (StatusCode::BAD_REQUEST, "ValidationError", msg.clone()),
            ApiError::Domain(err) => domain_error_parts(err),
            ApiError::Store(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "StoreError",
                err.to_string(),
            ),
        }
    }
}

fn domain_error_parts(err: &DomainError) -> (StatusCode, &'static str, String) {
    let (status, kind) = match err {
        DomainError::Validation(_) => (StatusCode::BAD_REQUEST, "ValidationError"),
        DomainError::NotFound { .. } => (StatusCode::NOT_FOUND, "NotFound"),
        DomainError::InsufficientRole { .. } => (StatusCode::FORBIDDEN, "InsufficientRole"),
        DomainError::TransitionDenied(reason @ DenyReason::InsufficientRole { .. }) => {
            (StatusCode::FORBIDDEN, reason.kind())
        }
        DomainError::TransitionDenied(reason) => (StatusCode::CONFLICT, reason.kind()),
        DomainError::Conflict { .. } => (StatusCode::CONFLICT, "Conflict"),
        DomainError::Integrity(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IntegrityError"),
        DomainError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "StoreError"),
    };
    (status, kind, err.to_string())
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind, message) = self.parts();

        if status.is_server_error() {
            tracing::error!(error = %message, kind, "internal server error");
        }

        let body = serde_json::json!({ "error": message, "kind": kind });
        (status, axum::Json(body)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Domain(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidBody(rejection.body_text())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Store(err)
    }
}
