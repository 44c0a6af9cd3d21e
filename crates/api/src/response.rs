//! Standardized API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use telemetry::MetricsSnapshot;
use tracing::error;

/// Success envelope: `{ "data": ... }`.
#[derive(Debug, Serialize, Deserialize)]
pub struct DataResponse<T> {
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn new(data: T) -> Json<Self> {
        Json(Self { data })
    }
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub store_backend: String,
    pub database_connected: bool,
    pub settings_loaded: bool,
    pub metrics: MetricsSnapshot,
}

/// Error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = Some(details);
        self
    }
}

/// API error with a stable error code.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub response: ErrorResponse,
    pub retry_after: Option<u64>,
}

impl ApiError {
    pub fn with_code(status: StatusCode, code: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            status,
            response: ErrorResponse::new(msg, code),
            retry_after: None,
        }
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::with_code(StatusCode::UNAUTHORIZED, "AUTH_001", msg)
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::with_code(StatusCode::NOT_FOUND, "NOT_FOUND", msg)
    }

    pub fn rate_limited(msg: impl Into<String>, retry_after: Option<u64>) -> Self {
        Self {
            status: StatusCode::TOO_MANY_REQUESTS,
            response: ErrorResponse::new(msg, "RATE_001"),
            retry_after,
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::with_code(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL", msg)
    }

    pub fn validation(code: impl Into<String>, errors: Vec<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            response: ErrorResponse::new("Validation failed", code).with_details(errors),
            retry_after: None,
        }
    }

    pub fn code(&self) -> &str {
        &self.response.code
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = (self.status, Json(self.response)).into_response();

        if let Some(retry_after) = self.retry_after {
            if let Ok(value) = retry_after.to_string().parse() {
                response.headers_mut().insert("Retry-After", value);
            }
        }

        response
    }
}

impl From<site_core::Error> for ApiError {
    fn from(err: site_core::Error) -> Self {
        use site_core::Error;

        let status =
            StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let code = err.error_code();

        match err {
            Error::ValidationWithCode { message, .. } => ApiError::validation(code, vec![message]),
            Error::Validation(message) => ApiError::validation(code, vec![message]),
            Error::Upload { message, .. } => ApiError::with_code(status, code, message),
            Error::NotFound(message) => ApiError::not_found(format!("Not found: {}", message)),
            Error::Unauthorized(message) => ApiError::unauthorized(message),
            Error::RateLimited(message) => ApiError::rate_limited(message, None),
            Error::Database(message) => {
                error!(error = %message, "Storage operation failed");
                Self {
                    status,
                    response: ErrorResponse::new("Storage operation failed", code)
                        .with_details(vec![message]),
                    retry_after: None,
                }
            }
            Error::Serialization(e) => {
                error!(error = %e, "Failed to encode response");
                ApiError::internal(e.to_string())
            }
            Error::Internal(message) => {
                error!(error = %message, "Internal error");
                ApiError::internal(message)
            }
        }
    }
}
