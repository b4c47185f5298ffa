//! Warden API - Tenant-Gated REST Gateway
//!
//! An axum service in front of two shared dependencies: a full-text
//! document store and a key/value counter store. Every document and search
//! request is resolved to a tenant, counted against that tenant's
//! fixed-window quota, and confined to that tenant's data.
//!
//! - [`middleware`]: tenant resolution and rate limiting
//! - [`services`]: [`RateLimiter`], [`TenantDocumentGuard`], [`SearchCoordinator`]
//! - [`routes`]: the REST surface, assembled by [`create_api_router`]

pub mod config;
pub mod error;
pub mod macros;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod services;
pub mod state;
pub mod telemetry;

// Re-export commonly used types
pub use config::{ApiConfig, LogFormat, StoreConfig};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use middleware::{rate_limit_middleware, tenant_middleware, TenantExtractor};
pub use openapi::ApiDoc;
pub use routes::create_api_router;
pub use services::{
    Admission, AdmissionOutcome, Provenance, RateLimiter, SearchCoordinator, SearchResults,
    TenantDocumentGuard,
};
pub use state::AppState;
