//! Search Coordinator
//!
//! Cache-aside search: look up `(tenant, query)` in the counter store, fall
//! back to a live tenant-filtered query on a miss, then populate the cache.
//! Cache failures never fail a search.

use serde::Serialize;
use serde_json::value::RawValue;
use std::sync::Arc;
use std::time::Duration;
use utoipa::ToSchema;

use warden_core::{Document, TenantId, ValidationError, WardenError, WardenResult};
use warden_storage::{CounterStore, TenantScopedKey};

use super::TenantDocumentGuard;

/// Where a result set came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    Cache,
    Store,
}

/// Search response body.
///
/// `results` is held as serialized JSON so a cache hit returns exactly the
/// bytes the original miss returned.
#[derive(Debug, Serialize, ToSchema)]
pub struct SearchResults {
    pub source: Provenance,
    #[schema(value_type = Vec<Document>)]
    pub results: Box<RawValue>,
}

impl SearchResults {
    /// Decode the result set.
    pub fn documents(&self) -> Result<Vec<Document>, serde_json::Error> {
        serde_json::from_str(self.results.get())
    }
}

#[derive(Clone)]
pub struct SearchCoordinator {
    guard: TenantDocumentGuard,
    cache: Arc<dyn CounterStore>,
    ttl: Duration,
}

impl SearchCoordinator {
    pub fn new(guard: TenantDocumentGuard, cache: Arc<dyn CounterStore>, ttl: Duration) -> Self {
        Self { guard, cache, ttl }
    }

    /// Search `tenant`'s documents for `query`.
    ///
    /// The query text is used verbatim for the cache key; no normalization.
    /// Writes do not invalidate cached results, so a hit can be up to one
    /// TTL stale.
    ///
    /// # Errors
    /// Returns `Validation` for an empty query and `StoreUnavailable` if the
    /// cache missed and the live query failed.
    pub async fn search(&self, tenant: &TenantId, query: &str) -> WardenResult<SearchResults> {
        if query.is_empty() {
            return Err(ValidationError::RequiredFieldMissing {
                field: "q".to_string(),
            }
            .into());
        }

        let key = TenantScopedKey::search(tenant, query);

        match self.cache.get(&key).await {
            Ok(Some(cached)) => match decode_cached(cached) {
                Ok(results) => {
                    return Ok(SearchResults {
                        source: Provenance::Cache,
                        results,
                    })
                }
                Err(err) => {
                    tracing::warn!(key = %key, error = %err, "Discarding unreadable cached search result");
                }
            },
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(key = %key, error = %err, "Search cache read failed, querying store");
            }
        }

        let documents = self.guard.search(tenant, query).await?;
        let results = serde_json::value::to_raw_value(&documents)
            .map_err(|e| WardenError::Unknown(format!("failed to serialize search results: {}", e)))?;

        if let Err(err) = self.cache.set_with_ttl(&key, results.get(), self.ttl).await {
            tracing::warn!(key = %key, error = %err, "Search cache write failed");
        }

        Ok(SearchResults {
            source: Provenance::Store,
            results,
        })
    }
}

/// Accept a cached payload only if it still decodes as a result set.
fn decode_cached(cached: String) -> Result<Box<RawValue>, serde_json::Error> {
    serde_json::from_str::<Vec<Document>>(&cached)?;
    RawValue::from_string(cached)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use warden_storage::{InMemoryCounterStore, InMemoryDocumentStore};
    use warden_test_utils::{acme, other_tenant, sample_new_document};

    struct Fixture {
        coordinator: SearchCoordinator,
        guard: TenantDocumentGuard,
        documents: Arc<InMemoryDocumentStore>,
        cache: Arc<InMemoryCounterStore>,
    }

    fn fixture() -> Fixture {
        let documents = Arc::new(InMemoryDocumentStore::new());
        let cache = Arc::new(InMemoryCounterStore::new());
        let guard = TenantDocumentGuard::new(documents.clone());
        let coordinator =
            SearchCoordinator::new(guard.clone(), cache.clone(), Duration::from_secs(60));
        Fixture {
            coordinator,
            guard,
            documents,
            cache,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_miss_then_hit_is_byte_identical() {
        let f = fixture();
        let document = f.guard.create(&acme(), sample_new_document()).await.unwrap();

        let first = f.coordinator.search(&acme(), "Alpha").await.unwrap();
        let second = f.coordinator.search(&acme(), "Alpha").await.unwrap();

        assert_eq!(first.source, Provenance::Store);
        assert_eq!(second.source, Provenance::Cache);
        assert_eq!(first.results.get(), second.results.get());
        assert_eq!(second.documents().unwrap(), vec![document]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires_after_ttl() {
        let f = fixture();
        f.coordinator.search(&acme(), "Alpha").await.unwrap();

        tokio::time::advance(Duration::from_secs(61)).await;
        let after = f.coordinator.search(&acme(), "Alpha").await.unwrap();
        assert_eq!(after.source, Provenance::Store);
    }

    #[tokio::test(start_paused = true)]
    async fn test_writes_do_not_invalidate() {
        let f = fixture();
        let empty = f.coordinator.search(&acme(), "Alpha").await.unwrap();
        assert_eq!(empty.results.get(), "[]");

        f.guard.create(&acme(), sample_new_document()).await.unwrap();
        let stale = f.coordinator.search(&acme(), "Alpha").await.unwrap();
        assert_eq!(stale.source, Provenance::Cache);
        assert_eq!(stale.results.get(), "[]");
    }

    #[tokio::test(start_paused = true)]
    async fn test_same_query_is_cached_per_tenant() {
        let f = fixture();
        let mine = f.guard.create(&acme(), sample_new_document()).await.unwrap();

        let acme_results = f.coordinator.search(&acme(), "Alpha").await.unwrap();
        let other_results = f.coordinator.search(&other_tenant(), "Alpha").await.unwrap();

        assert_eq!(other_results.source, Provenance::Store);
        assert!(other_results.documents().unwrap().is_empty());
        assert_eq!(acme_results.documents().unwrap(), vec![mine]);
        assert_eq!(f.cache.len(), 2);
    }

    #[tokio::test]
    async fn test_cache_outage_falls_through_to_store() {
        let f = fixture();
        f.guard.create(&acme(), sample_new_document()).await.unwrap();
        f.cache.set_offline(true);

        for _ in 0..2 {
            let results = f.coordinator.search(&acme(), "Alpha").await.unwrap();
            assert_eq!(results.source, Provenance::Store);
            assert_eq!(results.documents().unwrap().len(), 1);
        }
    }

    #[tokio::test]
    async fn test_failed_cache_write_still_returns_results() {
        let f = fixture();
        f.cache.set_fail_writes(true);

        let results = f.coordinator.search(&acme(), "Alpha").await.unwrap();
        assert_eq!(results.source, Provenance::Store);
        assert!(f.cache.is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_cache_entry_is_a_miss() {
        let f = fixture();
        let key = TenantScopedKey::search(&acme(), "Alpha");
        f.cache
            .set_with_ttl(&key, "{not json", Duration::from_secs(60))
            .await
            .unwrap();

        let results = f.coordinator.search(&acme(), "Alpha").await.unwrap();
        assert_eq!(results.source, Provenance::Store);
        assert_eq!(f.cache.get(&key).await.unwrap().as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn test_empty_query_is_rejected_before_any_store_call() {
        let f = fixture();
        let err = f.coordinator.search(&acme(), "").await.unwrap_err();
        assert!(matches!(err, WardenError::Validation(_)));
        assert_eq!(f.cache.operation_count(), 0);
        assert_eq!(f.documents.operation_count(), 0);
    }
}
