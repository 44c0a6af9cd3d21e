//! Unified error types for the site backend.
//!
//! Error codes:
//! - VALID_001-003: Payload validation errors
//! - UPLOAD_001-002: Upload rejections
//! - AUTH_001: Admin authentication
//! - NOT_FOUND: Missing row
//! - DB_001: Storage errors
//! - RATE_001: Rate limit errors

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Validation error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorCode {
    /// VALID_001: Invalid JSON / invalid payload
    InvalidPayload,
    /// VALID_002: Unknown action or read type
    UnknownType,
    /// VALID_003: Item type not allowed for deletion
    InvalidItemType,
}

impl ValidationErrorCode {
    /// Get the error code string.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidPayload => "VALID_001",
            Self::UnknownType => "VALID_002",
            Self::InvalidItemType => "VALID_003",
        }
    }

    /// Get the HTTP status code.
    pub fn http_status(&self) -> u16 {
        400
    }
}

/// Upload error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadErrorCode {
    /// UPLOAD_001: File exceeds the size cap
    TooLarge,
    /// UPLOAD_002: MIME type not in the allow-list
    UnsupportedType,
}

impl UploadErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            Self::TooLarge => "UPLOAD_001",
            Self::UnsupportedType => "UPLOAD_002",
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            Self::TooLarge => 413,
            Self::UnsupportedType => 400,
        }
    }
}

/// Unified error type for the site backend.
#[derive(Debug, Error)]
pub enum Error {
    /// Validation error with code.
    #[error("[{code}] {message}")]
    ValidationWithCode {
        code: &'static str,
        message: String,
        http_status: u16,
    },

    /// Upload rejection with code.
    #[error("[{code}] {message}")]
    Upload {
        code: &'static str,
        message: String,
        http_status: u16,
    },

    #[error("validation error: {0}")]
    Validation(String),

    /// Encoding a response or column failed; request payloads are decoded
    /// with explicit validation errors instead.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a validation error with code.
    pub fn validation_code(code: ValidationErrorCode, msg: impl Into<String>) -> Self {
        Self::ValidationWithCode {
            code: code.code(),
            message: msg.into(),
            http_status: code.http_status(),
        }
    }

    /// Create an upload rejection.
    pub fn upload(code: UploadErrorCode, msg: impl Into<String>) -> Self {
        Self::Upload {
            code: code.code(),
            message: msg.into(),
            http_status: code.http_status(),
        }
    }

    pub fn unknown_type(msg: impl Into<String>) -> Self {
        Self::validation_code(ValidationErrorCode::UnknownType, msg)
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Get the HTTP status code for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::ValidationWithCode { http_status, .. } => *http_status,
            Self::Upload { http_status, .. } => *http_status,
            Self::Validation(_) => 400,
            Self::Serialization(_) => 500,
            Self::NotFound(_) => 404,
            Self::Database(_) => 500,
            Self::RateLimited(_) => 429,
            Self::Unauthorized(_) => 401,
            Self::Internal(_) => 500,
        }
    }

    /// Get the error code string.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ValidationWithCode { code, .. } => code,
            Self::Upload { code, .. } => code,
            Self::Validation(_) => "VALID_001",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Database(_) => "DB_001",
            Self::RateLimited(_) => "RATE_001",
            Self::Unauthorized(_) => "AUTH_001",
            Self::Serialization(_) | Self::Internal(_) => "INTERNAL",
        }
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}
