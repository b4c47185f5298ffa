//! Error Types for the Warden API
//!
//! This module defines error handling for the API layer, including:
//! - ApiError struct for structured error responses
//! - ErrorCode enum for categorizing errors
//! - IntoResponse implementation for Axum HTTP responses
//!
//! All errors are serialized as JSON with appropriate HTTP status codes.
//! Store failures never reach the client in detail; they are logged here and
//! replaced by a generic message.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;
use warden_core::{StoreError, ValidationError, WardenError};

// ============================================================================
// ERROR CODE ENUM
// ============================================================================

/// Error codes for API responses.
///
/// Each error code maps to a specific HTTP status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================================================
    // Client Errors (400, 404, 429)
    // ========================================================================
    /// No tenant identifier on the request
    MissingTenant,

    /// Request body or parameters could not be parsed
    InvalidInput,

    /// Required field is missing from request
    MissingField,

    /// Document does not exist or belongs to another tenant
    NotFound,

    /// Tenant exceeded its request quota for the current window
    RateLimited,

    // ========================================================================
    // Server Errors (500, 503)
    // ========================================================================
    /// A backing store failed or timed out
    StoreUnavailable,

    /// Internal server error
    InternalError,
}

impl ErrorCode {
    /// Get the HTTP status code for this error code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::MissingTenant
            | ErrorCode::InvalidInput
            | ErrorCode::MissingField => StatusCode::BAD_REQUEST,

            ErrorCode::NotFound => StatusCode::NOT_FOUND,

            ErrorCode::RateLimited => StatusCode::TOO_MANY_REQUESTS,

            ErrorCode::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,

            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get a default message for this error code.
    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorCode::MissingTenant => "Missing tenant identifier",
            ErrorCode::InvalidInput => "Invalid input data",
            ErrorCode::MissingField => "Required field is missing",
            ErrorCode::NotFound => "Document not found",
            ErrorCode::RateLimited => "Rate limit exceeded",
            ErrorCode::StoreUnavailable => "Service temporarily unavailable",
            ErrorCode::InternalError => "Internal server error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ============================================================================
// API ERROR STRUCT
// ============================================================================

/// Structured error response for API operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// Error code categorizing the error
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,

    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Create a new API error with the given code, using the default message.
    pub fn from_code(code: ErrorCode) -> Self {
        Self::new(code, code.default_message())
    }

    /// Add additional details to the error.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        self.code.status_code()
    }

    // ========================================================================
    // Convenience constructors for common errors
    // ========================================================================

    pub fn missing_tenant() -> Self {
        Self::new(
            ErrorCode::MissingTenant,
            "Missing tenant identifier: set the x-tenant-id header or the tenant query parameter",
        )
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    pub fn missing_field(field: &str) -> Self {
        Self::new(
            ErrorCode::MissingField,
            format!("Required field '{}' is missing", field),
        )
    }

    /// The only not-found error. It never names the requested id, so a
    /// foreign document and a missing one produce identical bodies.
    pub fn not_found() -> Self {
        Self::from_code(ErrorCode::NotFound)
    }

    pub fn rate_limited(limit: u32) -> Self {
        Self::from_code(ErrorCode::RateLimited).with_details(serde_json::json!({ "limit": limit }))
    }

    pub fn store_unavailable() -> Self {
        Self::from_code(ErrorCode::StoreUnavailable)
    }

    pub fn internal_error() -> Self {
        Self::from_code(ErrorCode::InternalError)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// ============================================================================
// AXUM INTEGRATION
// ============================================================================

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self);
        (status, body).into_response()
    }
}

// ============================================================================
// CONVERSIONS
// ============================================================================

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::RequiredFieldMissing { field } => ApiError::missing_field(&field),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        // Log the full error; the client only learns that a store is down.
        tracing::error!(store = err.store(), error = %err, "Store operation failed");
        ApiError::store_unavailable()
    }
}

impl From<WardenError> for ApiError {
    fn from(err: WardenError) -> Self {
        match err {
            WardenError::MissingTenant => ApiError::missing_tenant(),
            WardenError::Validation(validation) => validation.into(),
            WardenError::NotFound => ApiError::not_found(),
            WardenError::RateLimited { limit, .. } => ApiError::rate_limited(limit),
            WardenError::StoreUnavailable(store) => store.into(),
            WardenError::Unknown(context) => {
                tracing::error!(context = %context, "Unclassified failure");
                ApiError::internal_error()
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::invalid_input(format!("Invalid JSON body: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::invalid_input(format!("Invalid query string: {}", rejection.body_text()))
    }
}

// ============================================================================
// RESULT TYPE ALIAS
// ============================================================================

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;
