//! HTTP error handling and response types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::services::VisibilityError;

/// Error payload returned to API clients.
#[derive(Debug, Serialize)]
pub struct ApiError {
    /// Stable machine-readable error code.
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// Optional extra detail.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Application-level errors raised by handlers.
#[derive(Debug)]
pub enum AppError {
    /// The request itself is malformed (unparseable date, bad coordinates).
    BadRequest(String),
    /// The computation ran but could not produce a result for this site.
    Visibility(VisibilityError),
    /// Unexpected server-side failure.
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match self {
            AppError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                "BAD_REQUEST",
                message,
                None,
            ),
            AppError::Visibility(err) => match &err {
                VisibilityError::SunAlwaysUp { .. } => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "SUN_ALWAYS_UP",
                    err.to_string(),
                    None,
                ),
                VisibilityError::SunNeverRises { .. } => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "SUN_NEVER_RISES",
                    err.to_string(),
                    None,
                ),
                VisibilityError::Ephemeris(inner) => (
                    StatusCode::BAD_GATEWAY,
                    "EPHEMERIS_ERROR",
                    "Ephemeris computation failed".to_string(),
                    Some(inner.to_string()),
                ),
            },
            AppError::Internal(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                message,
                None,
            ),
        };

        let body = ApiError {
            code: code.to_string(),
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<VisibilityError> for AppError {
    fn from(err: VisibilityError) -> Self {
        AppError::Visibility(err)
    }
}
