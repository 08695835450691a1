//! Maps errors and rejected enrollment outcomes to HTTP responses.

use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use coursehub_core::error::{AppError, ErrorKind};
use coursehub_service::BusyReason;

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
    /// Optional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Everything a handler can fail with.
#[derive(Debug)]
pub enum ApiError {
    /// Infrastructure or validation failure.
    App(AppError),
    /// Business rule rejection (full, duplicate, conflict, not found).
    Rejected {
        /// HTTP status.
        status: StatusCode,
        /// Machine-readable code.
        code: &'static str,
        /// Human-readable message.
        message: String,
    },
    /// Transient contention; the client should retry.
    Busy(BusyReason),
}

impl ApiError {
    /// Business rejection with `409 Conflict`.
    pub fn conflict(code: &'static str, message: impl Into<String>) -> Self {
        Self::Rejected {
            status: StatusCode::CONFLICT,
            code,
            message: message.into(),
        }
    }

    /// Business rejection with `404 Not Found`.
    pub fn not_found(code: &'static str, message: impl Into<String>) -> Self {
        Self::Rejected {
            status: StatusCode::NOT_FOUND,
            code,
            message: message.into(),
        }
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self::App(err)
    }
}

fn app_error_status(kind: ErrorKind) -> (StatusCode, &'static str) {
    match kind {
        ErrorKind::Validation => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        ErrorKind::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        ErrorKind::Conflict => (StatusCode::CONFLICT, "CONFLICT"),
        ErrorKind::RateLimit => (StatusCode::TOO_MANY_REQUESTS, "RATE_LIMITED"),
        ErrorKind::Timeout => (StatusCode::SERVICE_UNAVAILABLE, "TIMEOUT"),
        ErrorKind::ServiceUnavailable => (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE"),
        ErrorKind::Database => (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR"),
        ErrorKind::Cache => (StatusCode::INTERNAL_SERVER_ERROR, "COORDINATION_ERROR"),
        ErrorKind::Internal | ErrorKind::Configuration | ErrorKind::Serialization => {
            (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
        }
    }
}

fn body(code: &str, message: String, details: Option<serde_json::Value>) -> Json<ApiErrorResponse> {
    Json(ApiErrorResponse {
        error: code.to_string(),
        message,
        details,
    })
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::App(err) => {
                let (status, code) = app_error_status(err.kind);
                if status.is_server_error() {
                    tracing::error!(kind = %err.kind, error = %err.message, "Request failed");
                }
                (status, body(code, err.message, None)).into_response()
            }
            Self::Rejected {
                status,
                code,
                message,
            } => (status, body(code, message, None)).into_response(),
            Self::Busy(reason) => {
                let status = match reason {
                    BusyReason::RateLimited => StatusCode::TOO_MANY_REQUESTS,
                    _ => StatusCode::SERVICE_UNAVAILABLE,
                };
                let mut response = (
                    status,
                    body(
                        "BUSY",
                        "Server is busy, retry shortly".to_string(),
                        Some(serde_json::json!({ "reason": reason.as_str() })),
                    ),
                )
                    .into_response();
                response
                    .headers_mut()
                    .insert(header::RETRY_AFTER, HeaderValue::from_static("1"));
                response
            }
        }
    }
}
