//! JSON error responses.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

/// Error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Return code.
    pub rc: i32,
    /// Reason code.
    pub reason: i32,
    /// Error category.
    pub category: i32,
    /// Human-readable error message.
    pub message: String,
    /// Additional error details.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

/// An HTTP status paired with an [`ErrorBody`].
#[derive(Debug)]
pub struct ErrorResponse {
    /// HTTP status code.
    pub status: StatusCode,
    /// Error body.
    pub body: ErrorBody,
}

impl ErrorResponse {
    fn with(status: StatusCode, rc: i32, category: i32, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                rc,
                reason: 0,
                category,
                message: message.into(),
                details: Vec::new(),
            },
        }
    }

    /// 400 Bad Request.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::with(StatusCode::BAD_REQUEST, 4, 1, message)
    }

    /// 403 Forbidden.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::with(StatusCode::FORBIDDEN, 8, 3, message)
    }

    /// 404 Not Found.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::with(StatusCode::NOT_FOUND, 8, 4, message)
    }

    /// 405 Method Not Allowed.
    pub fn method_not_allowed(message: impl Into<String>) -> Self {
        Self::with(StatusCode::METHOD_NOT_ALLOWED, 4, 1, message)
    }

    /// 500 Internal Server Error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::with(StatusCode::INTERNAL_SERVER_ERROR, 12, 5, message)
    }

    /// Build from an arbitrary status, choosing rc and category by class.
    pub fn from_status(status: StatusCode, message: impl Into<String>) -> Self {
        match status {
            StatusCode::FORBIDDEN => Self::forbidden(message),
            StatusCode::NOT_FOUND => Self::not_found(message),
            StatusCode::METHOD_NOT_ALLOWED => Self::method_not_allowed(message),
            s if s.is_client_error() => Self::with(s, 4, 1, message),
            s => Self::with(s, 12, 5, message),
        }
    }

    /// Attach a reason code.
    pub fn with_reason(mut self, reason: i32) -> Self {
        self.body.reason = reason;
        self
    }

    /// Attach detail lines.
    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.body.details = details;
        self
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(
                status = %self.status.as_u16(),
                rc = self.body.rc,
                message = %self.body.message,
                "Server error response"
            );
        } else if self.status.is_client_error() {
            tracing::warn!(
                status = %self.status.as_u16(),
                rc = self.body.rc,
                message = %self.body.message,
                "Client error response"
            );
        }

        let body = serde_json::to_string(&self.body).unwrap_or_else(|_| {
            r#"{"rc":12,"reason":0,"category":5,"message":"internal serialization error"}"#
                .to_string()
        });
        (self.status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
    }
}

impl std::fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "error {}: rc={}, reason={}, {}",
            self.status, self.body.rc, self.body.reason, self.body.message
        )
    }
}

impl std::error::Error for ErrorResponse {}
