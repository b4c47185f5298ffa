//! Rate limiting middleware.
//!
//! Runs inside `tenant_middleware`: every gated request is counted against
//! its tenant's window, and every gated response, admitted or rejected,
//! carries the quota headers.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderName, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use warden_core::TenantId;

use crate::error::ApiError;
use crate::services::{Admission, RateLimiter};

pub const RATE_LIMIT_LIMIT_HEADER: &str = "x-ratelimit-limit";
pub const RATE_LIMIT_REMAINING_HEADER: &str = "x-ratelimit-remaining";

/// Admit or reject the request by its tenant's quota.
///
/// Rejection is a 429 `RATE_LIMITED` error. When the counter store is down
/// the request is admitted and headers report the full limit.
pub async fn rate_limit_middleware(
    State(limiter): State<RateLimiter>,
    request: Request,
    next: Next,
) -> Response {
    let Some(tenant) = request.extensions().get::<TenantId>().cloned() else {
        return ApiError::missing_tenant().into_response();
    };

    let admission = limiter.admit(&tenant).await;

    let mut response = match admission.into_result() {
        Ok(_) => next.run(request).await,
        Err(err) => {
            tracing::debug!(tenant = %tenant, count = admission.count, "Rate limit exceeded");
            ApiError::from(err).into_response()
        }
    };

    attach_quota_headers(response.headers_mut(), &admission);
    response
}

fn attach_quota_headers(headers: &mut HeaderMap, admission: &Admission) {
    headers.insert(
        HeaderName::from_static(RATE_LIMIT_LIMIT_HEADER),
        HeaderValue::from(admission.limit),
    );
    headers.insert(
        HeaderName::from_static(RATE_LIMIT_REMAINING_HEADER),
        HeaderValue::from(admission.remaining()),
    );
}

// ============================================================================
// TESTS
// ============================================================================
