//! Rate Limiter
//!
//! Fixed-window request counting per tenant, kept in the counter store.

use std::sync::Arc;
use std::time::Duration;

use warden_core::{TenantId, WardenError, WardenResult};
use warden_storage::{CounterStore, TenantScopedKey};

/// How an admission decision was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionOutcome {
    /// Counted and within quota.
    Admitted,
    /// Counted and over quota.
    Rejected,
    /// The counter store failed; admitted without counting.
    FailedOpen,
}

/// Result of [`RateLimiter::admit`], carried into the quota headers whether
/// the request proceeds or not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Admission {
    /// Requests observed in the current window, this one included.
    /// Zero when the limiter failed open.
    pub count: u64,
    pub limit: u32,
    pub outcome: AdmissionOutcome,
}

impl Admission {
    /// `max(0, limit - count)`.
    pub fn remaining(&self) -> u32 {
        let remaining = u64::from(self.limit).saturating_sub(self.count);
        u32::try_from(remaining).unwrap_or(u32::MAX)
    }

    pub fn is_admitted(&self) -> bool {
        self.outcome != AdmissionOutcome::Rejected
    }

    /// `Err(RateLimited)` for a rejected admission.
    pub fn into_result(self) -> WardenResult<Self> {
        match self.outcome {
            AdmissionOutcome::Rejected => Err(WardenError::RateLimited {
                count: self.count,
                limit: self.limit,
            }),
            _ => Ok(self),
        }
    }
}

/// Per-tenant fixed-window limiter.
///
/// Any increment that finds the counter without an expiry arms the window.
/// That is normally the first request of a window, but also the request
/// after an increment that landed without arming: a retried increment whose
/// first attempt was applied late, or an expiry call that failed. Increment
/// and expiry are separate store calls; a failed arm is logged at error
/// level with the key and retried on the next request.
#[derive(Clone)]
pub struct RateLimiter {
    counters: Arc<dyn CounterStore>,
    max: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(counters: Arc<dyn CounterStore>, max: u32, window: Duration) -> Self {
        Self {
            counters,
            max,
            window,
        }
    }

    /// Count one request for `tenant` and decide whether it is admitted.
    ///
    /// Never fails. When the counter store is unreachable the request is
    /// admitted and the failure logged.
    pub async fn admit(&self, tenant: &TenantId) -> Admission {
        let key = TenantScopedKey::rate_limit(tenant);

        let increment = match self.counters.increment(&key).await {
            Ok(increment) => increment,
            Err(err) => {
                tracing::warn!(
                    tenant = %tenant,
                    error = %err,
                    "Counter store unavailable, admitting request without counting"
                );
                return Admission {
                    count: 0,
                    limit: self.max,
                    outcome: AdmissionOutcome::FailedOpen,
                };
            }
        };

        if !increment.expiring {
            if let Err(err) = self.counters.expire(&key, self.window).await {
                tracing::error!(
                    key = %key,
                    error = %err,
                    "Failed to arm rate limit window; counter has no expiry"
                );
            }
        }

        let count = u64::try_from(increment.value).unwrap_or(0);
        let outcome = if count > u64::from(self.max) {
            AdmissionOutcome::Rejected
        } else {
            AdmissionOutcome::Admitted
        };

        Admission {
            count,
            limit: self.max,
            outcome,
        }
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("max", &self.max)
            .field("window", &self.window)
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
