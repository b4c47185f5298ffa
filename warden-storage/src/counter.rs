//! Counter store contract.

use async_trait::async_trait;
use std::time::Duration;
use warden_core::StoreError;

use crate::key::TenantScopedKey;

/// State of a counter right after an increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Increment {
    /// Post-increment value.
    pub value: i64,
    /// Whether the key carries an expiry.
    pub expiring: bool,
}

/// Key/value store with atomic single-key operations and expiry.
///
/// Keys are [`TenantScopedKey`]s, so every value written through this trait
/// is namespaced by a tenant. Implementations must make each individual
/// call atomic; no multi-key or multi-call atomicity is assumed.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Read a live value.
    async fn get(&self, key: &TenantScopedKey) -> Result<Option<String>, StoreError>;

    /// Write a value that expires after `ttl`.
    async fn set_with_ttl(
        &self,
        key: &TenantScopedKey,
        value: &str,
        ttl: Duration,
    ) -> Result<(), StoreError>;

    /// Atomically increment the integer at `key`, creating it at zero first
    /// if absent or expired. Returns the post-increment value together with
    /// whether the key has an expiry, read in the same atomic step.
    async fn increment(&self, key: &TenantScopedKey) -> Result<Increment, StoreError>;

    /// Set the expiry of an existing key. A missing key is not an error.
    async fn expire(&self, key: &TenantScopedKey, ttl: Duration) -> Result<(), StoreError>;

    /// Liveness probe.
    async fn ping(&self) -> Result<(), StoreError>;
}
