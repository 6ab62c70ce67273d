//! Structured API error responses with error codes.
//!
//! Every failure carries a machine-readable code and a human-readable
//! message. Nothing is silently downgraded: a low trust score or an integrity
//! mismatch is always a rejection, never a "soft accept", and duplicates are
//! surfaced distinctly from tampering so clients don't confuse "already
//! recorded" with "tampered".

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

// ============================================================================
// Error Codes
// ============================================================================

/// Error codes for API responses.
///
/// These codes are stable and can be used by clients for programmatic error
/// handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Authentication errors (1xxx)
    /// No authentication credentials provided
    AuthRequired,
    /// Invalid or expired bearer token
    InvalidToken,
    /// Token has expired
    TokenExpired,
    /// Insufficient permissions for this operation
    InsufficientPermissions,

    // Validation errors (3xxx)
    /// Request body is malformed
    InvalidRequestBody,
    /// Required upload fields are missing
    MissingFields,
    /// Field value is invalid
    InvalidFieldValue,
    /// Payload exceeds size limit
    PayloadTooLarge,

    // Resource errors (4xxx)
    /// Requested resource not found
    ResourceNotFound,

    // Conflict errors (5xxx)
    /// This proof (file+location+time) was already recorded
    DuplicateProof,

    // Spoofing / integrity errors (6xxx)
    /// The OS reported the position as injected
    MockedLocation,
    /// The trust score fell below the acceptance threshold
    LowTrustScore,
    /// The recomputed commitment does not match the submitted one
    IntegrityViolation,

    // Infrastructure errors (8xxx)
    /// Database operation failed
    DatabaseError,
    /// Media storage operation failed
    MediaStorageError,
    /// External service unavailable
    ServiceUnavailable,
    /// Internal server error
    InternalError,
}

impl ErrorCode {
    /// Get the numeric code for this error.
    pub fn numeric_code(&self) -> u32 {
        match self {
            // Auth (1xxx)
            ErrorCode::AuthRequired => 1001,
            ErrorCode::InvalidToken => 1002,
            ErrorCode::TokenExpired => 1003,
            ErrorCode::InsufficientPermissions => 1004,

            // Validation (3xxx)
            ErrorCode::InvalidRequestBody => 3001,
            ErrorCode::MissingFields => 3002,
            ErrorCode::InvalidFieldValue => 3003,
            ErrorCode::PayloadTooLarge => 3004,

            // Resource (4xxx)
            ErrorCode::ResourceNotFound => 4001,

            // Conflict (5xxx)
            ErrorCode::DuplicateProof => 5001,

            // Spoofing / integrity (6xxx)
            ErrorCode::MockedLocation => 6001,
            ErrorCode::LowTrustScore => 6002,
            ErrorCode::IntegrityViolation => 6003,

            // Infrastructure (8xxx)
            ErrorCode::DatabaseError => 8001,
            ErrorCode::MediaStorageError => 8002,
            ErrorCode::ServiceUnavailable => 8003,
            ErrorCode::InternalError => 8999,
        }
    }

    /// Get the HTTP status code for this error.
    pub fn http_status(&self) -> StatusCode {
        match self {
            // Auth -> 401/403
            ErrorCode::AuthRequired => StatusCode::UNAUTHORIZED,
            ErrorCode::InvalidToken => StatusCode::UNAUTHORIZED,
            ErrorCode::TokenExpired => StatusCode::UNAUTHORIZED,
            ErrorCode::InsufficientPermissions => StatusCode::FORBIDDEN,

            // Validation -> 400/413
            ErrorCode::InvalidRequestBody => StatusCode::BAD_REQUEST,
            ErrorCode::MissingFields => StatusCode::BAD_REQUEST,
            ErrorCode::InvalidFieldValue => StatusCode::BAD_REQUEST,
            ErrorCode::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,

            // Resource -> 404
            ErrorCode::ResourceNotFound => StatusCode::NOT_FOUND,

            // Conflict -> 409
            ErrorCode::DuplicateProof => StatusCode::CONFLICT,

            // Spoofing / integrity -> business-rule rejection, client error
            ErrorCode::MockedLocation => StatusCode::FORBIDDEN,
            ErrorCode::LowTrustScore => StatusCode::FORBIDDEN,
            ErrorCode::IntegrityViolation => StatusCode::UNPROCESSABLE_ENTITY,

            // Infrastructure -> 500/503
            ErrorCode::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::MediaStorageError => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code_str = match self {
            ErrorCode::AuthRequired => "AUTH_REQUIRED",
            ErrorCode::InvalidToken => "INVALID_TOKEN",
            ErrorCode::TokenExpired => "TOKEN_EXPIRED",
            ErrorCode::InsufficientPermissions => "INSUFFICIENT_PERMISSIONS",
            ErrorCode::InvalidRequestBody => "INVALID_REQUEST_BODY",
            ErrorCode::MissingFields => "MISSING_FIELDS",
            ErrorCode::InvalidFieldValue => "INVALID_FIELD_VALUE",
            ErrorCode::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            ErrorCode::ResourceNotFound => "RESOURCE_NOT_FOUND",
            ErrorCode::DuplicateProof => "DUPLICATE_PROOF",
            ErrorCode::MockedLocation => "MOCKED_LOCATION",
            ErrorCode::LowTrustScore => "LOW_TRUST_SCORE",
            ErrorCode::IntegrityViolation => "INTEGRITY_VIOLATION",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::MediaStorageError => "MEDIA_STORAGE_ERROR",
            ErrorCode::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        };
        write!(f, "{}", code_str)
    }
}

// ============================================================================
// Structured Error Response
// ============================================================================

/// Structured error response for API endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error details
    pub error: ErrorDetails,
}

/// Detailed error information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Numeric error code for easy categorization
    pub numeric_code: u32,

    /// Human-readable error message
    pub message: String,

    /// Additional error details (e.g. trust score and failed checks)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetails {
                code,
                numeric_code: code.numeric_code(),
                message: message.into(),
                details: None,
            },
        }
    }

    /// Set additional details.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.error.details = Some(details);
        self
    }

    /// Get the HTTP status code.
    pub fn status(&self) -> StatusCode {
        self.error.code.http_status()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code_str = self.error.code.to_string();
        let mut response = (status, Json(self)).into_response();

        // Add error code header for easier debugging
        if let Ok(code_value) = axum::http::HeaderValue::from_str(&code_str) {
            response.headers_mut().insert(
                axum::http::header::HeaderName::from_static("x-error-code"),
                code_value,
            );
        }

        response
    }
}

// ============================================================================
// Conversion from ProofError
// ============================================================================

impl From<crate::infra::ProofError> for ApiError {
    fn from(err: crate::infra::ProofError) -> Self {
        use crate::infra::ProofError;

        match err {
            ProofError::MockLocationDetected => ApiError::new(
                ErrorCode::MockedLocation,
                "Location was reported as mocked by the device OS",
            ),
            ProofError::LowTrustScore { score, checks } => ApiError::new(
                ErrorCode::LowTrustScore,
                format!("Location trust score {score} is below the acceptance threshold"),
            )
            .with_details(serde_json::json!({
                "score": score,
                "checks": checks,
                "failedChecks": checks.failed(),
            })),
            ProofError::IntegrityViolation { .. } => ApiError::new(
                ErrorCode::IntegrityViolation,
                "Proof integrity check failed: the submitted data does not match its commitment",
            ),
            ProofError::DuplicateSubmission(hash) => ApiError::new(
                ErrorCode::DuplicateProof,
                "This proof has already been recorded",
            )
            .with_details(serde_json::json!({ "commitmentHash": hash })),
            ProofError::InvalidField { field, message } => ApiError::new(
                ErrorCode::InvalidFieldValue,
                format!("Invalid value for {field}: {message}"),
            )
            .with_details(serde_json::json!({ "field": field })),
            ProofError::Database(e) => {
                ApiError::new(ErrorCode::DatabaseError, format!("Database error: {e}"))
            }
            ProofError::Media(msg) => ApiError::new(
                ErrorCode::MediaStorageError,
                format!("Media storage error: {msg}"),
            ),
            ProofError::Configuration(msg) => {
                ApiError::new(ErrorCode::InternalError, format!("Configuration error: {msg}"))
            }
            ProofError::Internal(msg) => ApiError::new(ErrorCode::InternalError, msg),
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Create a missing-fields error naming each absent field.
pub fn missing_fields(fields: &[&str]) -> ApiError {
    ApiError::new(
        ErrorCode::MissingFields,
        format!("Missing required fields: {}", fields.join(", ")),
    )
    .with_details(serde_json::json!({ "fields": fields }))
}

/// Create a validation error with field details.
pub fn validation_error(field: &str, message: impl Into<String>) -> ApiError {
    ApiError::new(ErrorCode::InvalidFieldValue, message.into())
        .with_details(serde_json::json!({ "field": field }))
}

// ============================================================================
// Tests
// ============================================================================
