//! API error types with IntoResponse
//!
//! Errors are converted to JSON responses with appropriate status codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use todoctl_core::{StoreError, ValidationErrors};

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Name rules failed (422), nothing was written
    Validation(ValidationErrors),

    /// Referenced list or todo does not exist (404)
    NotFound { resource: &'static str },

    /// Malformed path or body (400)
    BadRequest { message: String },

    /// Storage backend failure (500, logged)
    Store(StoreError),

    /// Internal error (500)
    Internal { message: String },
}

impl ApiError {
    pub fn list_not_found() -> Self {
        Self::NotFound { resource: "list" }
    }

    pub fn todo_not_found() -> Self {
        Self::NotFound { resource: "todo" }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::Validation(e) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({
                    "error": "validation_error",
                    "messages": e.messages()
                }),
            ),
            Self::NotFound { resource } => (
                StatusCode::NOT_FOUND,
                json!({
                    "error": "not_found",
                    "message": format!("The specified {} was not found.", resource)
                }),
            ),
            Self::BadRequest { message } => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "bad_request",
                    "message": message
                }),
            ),
            Self::Store(e) => {
                // Log the actual error, return generic message
                tracing::error!("Storage error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "error": "internal_error",
                        "message": "an internal error occurred"
                    }),
                )
            }
            Self::Internal { message } => {
                tracing::error!("Internal error: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "error": "internal_error",
                        "message": "an internal error occurred"
                    }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(e: ValidationErrors) -> Self {
        Self::Validation(e)
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}
