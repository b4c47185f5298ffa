use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::Instant;
use warden_core::StoreError;

use crate::counter::{CounterStore, Increment};
use crate::key::TenantScopedKey;
use crate::COUNTER_STORE;

#[derive(Debug, Clone)]
struct CounterEntry {
    value: String,
    expires_at: Option<Instant>,
}

impl CounterEntry {
    fn persistent(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            expires_at: None,
        }
    }

    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| now < at)
    }
}

/// In-memory [`CounterStore`].
///
/// Per-key atomicity comes from DashMap's entry locking, matching the
/// single-key atomicity a real counter store provides.
#[derive(Debug, Default)]
pub struct InMemoryCounterStore {
    entries: DashMap<String, CounterEntry>,
    offline: AtomicBool,
    fail_expire: AtomicBool,
    fail_writes: AtomicBool,
    operations: AtomicU64,
}

impl InMemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call, including `ping`, fail as if the store were down.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Make `expire` fail while everything else keeps working. Simulates a
    /// failure between incrementing a counter and arming its window.
    pub fn set_fail_expire(&self, fail: bool) {
        self.fail_expire.store(fail, Ordering::SeqCst);
    }

    /// Make `set_with_ttl` fail while reads and increments keep working.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of calls received, successful or not.
    pub fn operation_count(&self) -> u64 {
        self.operations.load(Ordering::SeqCst)
    }

    /// Remaining lifetime of a live key. `Some(None)` means the key exists
    /// without an expiry.
    pub fn ttl(&self, key: &TenantScopedKey) -> Option<Option<Duration>> {
        let now = Instant::now();
        self.entries
            .get(&key.encode())
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.expires_at.map(|at| at.saturating_duration_since(now)))
    }

    /// Whether a live value exists at `key`.
    pub fn contains(&self, key: &TenantScopedKey) -> bool {
        self.ttl(key).is_some()
    }

    /// Number of live keys.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries.iter().filter(|entry| entry.is_live(now)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn begin(&self, operation: &'static str) -> Result<(), StoreError> {
        self.operations.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable(
                COUNTER_STORE,
                format!("{} refused: store offline", operation),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl CounterStore for InMemoryCounterStore {
    async fn get(&self, key: &TenantScopedKey) -> Result<Option<String>, StoreError> {
        self.begin("get")?;
        let now = Instant::now();
        Ok(self
            .entries
            .get(&key.encode())
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.value.clone()))
    }

    async fn set_with_ttl(
        &self,
        key: &TenantScopedKey,
        value: &str,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        self.begin("set")?;
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable(COUNTER_STORE, "set rejected"));
        }
        self.entries.insert(
            key.encode(),
            CounterEntry {
                value: value.to_string(),
                expires_at: Some(Instant::now() + ttl),
            },
        );
        Ok(())
    }

    async fn increment(&self, key: &TenantScopedKey) -> Result<Increment, StoreError> {
        self.begin("incr")?;
        let now = Instant::now();
        let mut entry = self
            .entries
            .entry(key.encode())
            .or_insert_with(|| CounterEntry::persistent("0"));

        // An expired key behaves as absent: the count restarts without expiry.
        if !entry.is_live(now) {
            *entry = CounterEntry::persistent("0");
        }

        let current: i64 = entry.value.parse().map_err(|_| {
            StoreError::invalid_response(COUNTER_STORE, "value is not an integer")
        })?;
        let next = current + 1;
        entry.value = next.to_string();
        Ok(Increment {
            value: next,
            expiring: entry.expires_at.is_some(),
        })
    }

    async fn expire(&self, key: &TenantScopedKey, ttl: Duration) -> Result<(), StoreError> {
        self.begin("expire")?;
        if self.fail_expire.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable(COUNTER_STORE, "expire rejected"));
        }
        let now = Instant::now();
        if let Some(mut entry) = self.entries.get_mut(&key.encode()) {
            if entry.is_live(now) {
                entry.expires_at = Some(now + ttl);
            }
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.begin("ping")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_core::TenantId;

    fn key() -> TenantScopedKey {
        TenantScopedKey::rate_limit(&TenantId::parse("acme").unwrap())
    }

    async fn count(store: &InMemoryCounterStore) -> Result<i64, StoreError> {
        store.increment(&key()).await.map(|incr| incr.value)
    }

    #[tokio::test(start_paused = true)]
    async fn test_increment_and_expiry() {
        let store = InMemoryCounterStore::new();
        assert_eq!(
            store.increment(&key()).await,
            Ok(Increment { value: 1, expiring: false })
        );
        assert_eq!(store.ttl(&key()), Some(None));

        store.expire(&key(), Duration::from_secs(60)).await.unwrap();
        assert_eq!(
            store.increment(&key()).await,
            Ok(Increment { value: 2, expiring: true })
        );

        tokio::time::advance(Duration::from_secs(61)).await;
        assert!(!store.contains(&key()));
        assert_eq!(
            store.increment(&key()).await,
            Ok(Increment { value: 1, expiring: false })
        );
        assert_eq!(store.ttl(&key()), Some(None));
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_with_ttl_expires() {
        let store = InMemoryCounterStore::new();
        let cache_key = TenantScopedKey::search(&TenantId::parse("acme").unwrap(), "q");

        store
            .set_with_ttl(&cache_key, "[]", Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(store.get(&cache_key).await, Ok(Some("[]".to_string())));

        tokio::time::advance(Duration::from_secs(60)).await;
        assert_eq!(store.get(&cache_key).await, Ok(None));
    }

    #[tokio::test]
    async fn test_increment_rejects_non_integer() {
        let store = InMemoryCounterStore::new();
        store
            .set_with_ttl(&key(), "not-a-number", Duration::from_secs(60))
            .await
            .unwrap();
        assert!(matches!(
            store.increment(&key()).await,
            Err(StoreError::InvalidResponse { .. })
        ));
    }

    #[tokio::test]
    async fn test_expire_on_missing_key_is_noop() {
        let store = InMemoryCounterStore::new();
        assert!(store.expire(&key(), Duration::from_secs(60)).await.is_ok());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_fault_injection() {
        let store = InMemoryCounterStore::new();

        store.set_offline(true);
        assert!(store.ping().await.is_err());
        assert!(count(&store).await.is_err());
        store.set_offline(false);
        assert!(store.ping().await.is_ok());

        store.set_fail_expire(true);
        assert_eq!(count(&store).await, Ok(1));
        assert!(store.expire(&key(), Duration::from_secs(60)).await.is_err());
        assert_eq!(store.ttl(&key()), Some(None));

        store.set_fail_writes(true);
        assert!(store
            .set_with_ttl(&key(), "1", Duration::from_secs(1))
            .await
            .is_err());

        assert_eq!(store.operation_count(), 6);
    }
}
