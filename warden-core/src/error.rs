//! Error types for Warden operations

use std::time::Duration;
use thiserror::Error;

/// Failures talking to an external store (document store or counter store).
///
/// "Absent" is never an error: lookups that find nothing return `Ok(None)`
/// or [`crate::Lookup::NotFound`], so this type only describes
/// infrastructure failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("{store} unavailable: {reason}")]
    Unavailable { store: &'static str, reason: String },

    #[error("{store} {operation} timed out after {after:?}")]
    Timeout {
        store: &'static str,
        operation: &'static str,
        after: Duration,
    },

    #[error("{store} returned an invalid response: {reason}")]
    InvalidResponse { store: &'static str, reason: String },
}

impl StoreError {
    pub fn unavailable(store: &'static str, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            store,
            reason: reason.into(),
        }
    }

    pub fn invalid_response(store: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            store,
            reason: reason.into(),
        }
    }

    /// Name of the store that failed.
    pub fn store(&self) -> &'static str {
        match self {
            Self::Unavailable { store, .. }
            | Self::Timeout { store, .. }
            | Self::InvalidResponse { store, .. } => store,
        }
    }
}

/// Validation errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },
}

/// Gateway-level error taxonomy.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WardenError {
    /// No tenant identifier on the request. Raised before any store access.
    #[error("Missing tenant identifier")]
    MissingTenant,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Document absent, or owned by another tenant. The two are deliberately
    /// the same variant.
    #[error("Document not found")]
    NotFound,

    #[error("Rate limit exceeded: {count} requests against a limit of {limit}")]
    RateLimited { count: u64, limit: u32 },

    #[error(transparent)]
    StoreUnavailable(#[from] StoreError),

    #[error("Unclassified failure: {0}")]
    Unknown(String),
}

/// Result type for Warden operations.
pub type WardenResult<T> = Result<T, WardenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_reports_store() {
        let err = StoreError::unavailable("counter-store", "connection refused");
        assert_eq!(err.store(), "counter-store");
        assert!(err.to_string().contains("connection refused"));

        let timeout = StoreError::Timeout {
            store: "document-store",
            operation: "get",
            after: Duration::from_millis(500),
        };
        assert_eq!(timeout.store(), "document-store");
    }

    #[test]
    fn test_store_error_converts_to_unavailable() {
        let err: WardenError = StoreError::unavailable("document-store", "down").into();
        assert!(matches!(err, WardenError::StoreUnavailable(_)));
    }
}
