//! Tenant Resolver
//!
//! Resolves the tenant of every gated request from the `x-tenant-id` header,
//! falling back to the `tenant` query parameter, and stores it in the
//! request extensions for handlers and the rate limiter.

use std::collections::HashMap;

use axum::{
    async_trait,
    extract::{FromRequestParts, Query, Request},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use warden_core::{TenantId, WardenError, WardenResult};

use crate::error::ApiError;

pub const TENANT_HEADER: &str = "x-tenant-id";
pub const TENANT_QUERY_PARAM: &str = "tenant";

/// Header first, then query parameter. An empty value counts as absent;
/// any other value, whitespace included, is taken verbatim.
///
/// # Errors
/// Returns `MissingTenant` when neither source carries a non-empty value.
pub fn resolve_tenant(header: Option<&str>, query_param: Option<&str>) -> WardenResult<TenantId> {
    [header, query_param]
        .into_iter()
        .flatten()
        .find_map(|raw| TenantId::parse(raw).ok())
        .ok_or(WardenError::MissingTenant)
}

/// Reject requests without a tenant; otherwise insert the [`TenantId`] into
/// the request extensions.
pub async fn tenant_middleware(mut request: Request, next: Next) -> Result<Response, ApiError> {
    let query_tenant = Query::<HashMap<String, String>>::try_from_uri(request.uri())
        .ok()
        .and_then(|Query(mut params)| params.remove(TENANT_QUERY_PARAM));

    let header = request
        .headers()
        .get(TENANT_HEADER)
        .and_then(|h| h.to_str().ok());

    let tenant = resolve_tenant(header, query_tenant.as_deref())?;

    request.extensions_mut().insert(tenant);
    Ok(next.run(request).await)
}

/// Typed access to the resolved tenant.
///
/// Requires `tenant_middleware` on the route; without it the extractor
/// rejects with a 500.
#[derive(Debug, Clone)]
pub struct TenantExtractor(pub TenantId);

#[async_trait]
impl<S> FromRequestParts<S> for TenantExtractor
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<TenantId>()
            .cloned()
            .map(TenantExtractor)
            .ok_or_else(|| {
                tracing::error!("TenantId missing from request extensions; tenant_middleware not applied");
                ApiError::internal_error()
            })
    }
}

impl std::ops::Deref for TenantExtractor {
    type Target = TenantId;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

// ============================================================================
// TESTS
// ============================================================================
