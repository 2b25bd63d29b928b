//! Error codes shared by services and HTTP routes.
//!
//! DESIGN
//! ======
//! Every service error implements `ErrorCode` so route handlers can render a
//! uniform `{code, message, retryable}` body without matching on each enum.
//! Nothing on these paths panics; the operator always gets a message back
//! and the panel stays interactive.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn status(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn retryable(&self) -> bool {
        false
    }
}

/// JSON error body returned by every API route.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ApiError {
    #[serde(skip)]
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
    pub retryable: bool,
}

impl ApiError {
    #[must_use]
    pub fn from_err<E: ErrorCode>(err: E) -> Self {
        Self { status: err.status(), code: err.error_code(), message: err.to_string(), retryable: err.retryable() }
    }

    #[must_use]
    pub fn unauthorized() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            code: "E_AUTH",
            message: "admin session required".into(),
            retryable: false,
        }
    }

    #[must_use]
    pub fn unknown_kind(slug: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            code: "E_UNKNOWN_KIND",
            message: format!("unknown content kind: {slug}"),
            retryable: false,
        }
    }

    #[must_use]
    pub fn payload_too_large(limit: usize) -> Self {
        Self {
            status: StatusCode::PAYLOAD_TOO_LARGE,
            code: "E_UPLOAD_TOO_LARGE",
            message: format!("upload exceeds the {limit}-byte limit"),
            retryable: false,
        }
    }

    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self { status: StatusCode::BAD_REQUEST, code: "E_BAD_REQUEST", message: message.into(), retryable: false }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}
