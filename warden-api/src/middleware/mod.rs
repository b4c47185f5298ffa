//! Middleware modules for the Warden API
//!
//! - `tenant`: Tenant Resolver, attaches a [`TenantId`](warden_core::TenantId)
//!   to the request or rejects it
//! - `rate_limit`: per-tenant quota gate and quota headers
//!
//! # Middleware Order
//!
//! The tenant middleware must be outermost so a request without a tenant is
//! rejected before it consumes quota or touches a store:
//!
//! ```ignore
//! Router::new()
//!     .route("/documents", post(handler))
//!     // Innermost
//!     .layer(middleware::from_fn_with_state(limiter, rate_limit_middleware))
//!     // Outermost
//!     .layer(middleware::from_fn(tenant_middleware))
//! ```

mod rate_limit;
mod tenant;

pub use rate_limit::{
    rate_limit_middleware, RATE_LIMIT_LIMIT_HEADER, RATE_LIMIT_REMAINING_HEADER,
};
pub use tenant::{
    resolve_tenant, tenant_middleware, TenantExtractor, TENANT_HEADER, TENANT_QUERY_PARAM,
};
