//! Shared application state for Axum routers.

use std::sync::Arc;
use std::time::Instant;

use warden_storage::{CounterStore, DependencyProbe, DocumentStore};

use crate::config::ApiConfig;
use crate::services::{RateLimiter, SearchCoordinator, TenantDocumentGuard};

/// Application-wide state shared across all routes.
///
/// Built once at startup from explicit store handles; handlers extract only
/// the service they need.
#[derive(Clone)]
pub struct AppState {
    pub documents: TenantDocumentGuard,
    pub search: SearchCoordinator,
    pub rate_limiter: RateLimiter,
    pub rate_limit_enabled: bool,
    pub probe: DependencyProbe,
    pub start_time: Instant,
}

impl AppState {
    /// Wire the services over one document store and one counter store.
    /// The counter store backs both rate limiting and the search cache.
    pub fn new(
        config: &ApiConfig,
        documents: Arc<dyn DocumentStore>,
        counters: Arc<dyn CounterStore>,
    ) -> Self {
        let guard = TenantDocumentGuard::new(documents.clone());
        let search = SearchCoordinator::new(guard.clone(), counters.clone(), config.search_cache_ttl);
        let rate_limiter = RateLimiter::new(
            counters.clone(),
            config.rate_limit_max,
            config.rate_limit_window,
        );

        Self {
            documents: guard,
            search,
            rate_limiter,
            rate_limit_enabled: config.rate_limit_enabled,
            probe: DependencyProbe::new(documents, counters),
            start_time: Instant::now(),
        }
    }
}

// Use macro to reduce boilerplate for FromRef implementations
crate::impl_from_ref!(TenantDocumentGuard, documents);
crate::impl_from_ref!(SearchCoordinator, search);
crate::impl_from_ref!(RateLimiter, rate_limiter);
crate::impl_from_ref!(DependencyProbe, probe);
crate::impl_from_ref!(Instant, start_time);
