//! Redis-backed counter store.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{Cmd, ErrorKind, FromRedisValue, Pipeline, RedisError};
use std::fmt;
use std::time::Duration;
use tokio::sync::OnceCell;
use warden_core::StoreError;

use crate::counter::{CounterStore, Increment};
use crate::key::TenantScopedKey;
use crate::retry::RetryPolicy;
use crate::COUNTER_STORE;

/// [`CounterStore`] over a single Redis node.
///
/// The connection is opened on first use, not at construction, so the
/// gateway can start (and fail open) while Redis is down. Every command runs
/// under the configured [`RetryPolicy`].
pub struct RedisCounterStore {
    client: redis::Client,
    connection: OnceCell<ConnectionManager>,
    retry: RetryPolicy,
}

impl fmt::Debug for RedisCounterStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisCounterStore")
            .field("connected", &self.connection.initialized())
            .field("retry", &self.retry)
            .finish()
    }
}

impl RedisCounterStore {
    /// Create a store for `url` (`redis://host:port[/db]`).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the URL cannot be parsed. No
    /// connection is attempted here.
    pub fn new(url: &str, retry: RetryPolicy) -> Result<Self, StoreError> {
        let client = redis::Client::open(url).map_err(|e| {
            StoreError::unavailable(COUNTER_STORE, format!("invalid redis url: {}", e))
        })?;
        Ok(Self {
            client,
            connection: OnceCell::new(),
            retry,
        })
    }

    async fn connection(&self) -> Result<ConnectionManager, StoreError> {
        self.connection
            .get_or_try_init(|| ConnectionManager::new(self.client.clone()))
            .await
            .cloned()
            .map_err(redis_error)
    }

    async fn execute<T>(&self, operation: &'static str, command: Cmd) -> Result<T, StoreError>
    where
        T: FromRedisValue + Send,
    {
        let command = &command;
        self.retry
            .run(COUNTER_STORE, operation, move || async move {
                let mut conn = self.connection().await?;
                let value: T = command.query_async(&mut conn).await.map_err(redis_error)?;
                Ok(value)
            })
            .await
    }

    async fn execute_atomic<T>(
        &self,
        operation: &'static str,
        pipeline: Pipeline,
    ) -> Result<T, StoreError>
    where
        T: FromRedisValue + Send,
    {
        let pipeline = &pipeline;
        self.retry
            .run(COUNTER_STORE, operation, move || async move {
                let mut conn = self.connection().await?;
                let value: T = pipeline.query_async(&mut conn).await.map_err(redis_error)?;
                Ok(value)
            })
            .await
    }
}

/// `PTTL` reply for a key that exists without an expiry. `-2` means the key
/// is missing, which cannot follow an `INCR` in the same transaction.
const NO_EXPIRY: i64 = -1;

fn redis_error(err: RedisError) -> StoreError {
    match err.kind() {
        ErrorKind::TypeError | ErrorKind::ResponseError => {
            StoreError::invalid_response(COUNTER_STORE, err.to_string())
        }
        _ => StoreError::unavailable(COUNTER_STORE, err.to_string()),
    }
}

/// Redis expiries are whole seconds; anything shorter rounds up to one.
fn ttl_secs(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

#[async_trait]
impl CounterStore for RedisCounterStore {
    async fn get(&self, key: &TenantScopedKey) -> Result<Option<String>, StoreError> {
        let mut command = redis::cmd("GET");
        command.arg(key.encode());
        self.execute("get", command).await
    }

    async fn set_with_ttl(
        &self,
        key: &TenantScopedKey,
        value: &str,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let mut command = redis::cmd("SET");
        command.arg(key.encode()).arg(value).arg("EX").arg(ttl_secs(ttl));
        self.execute("set", command).await
    }

    async fn increment(&self, key: &TenantScopedKey) -> Result<Increment, StoreError> {
        let encoded = key.encode();
        let mut pipeline = redis::pipe();
        pipeline
            .atomic()
            .cmd("INCR")
            .arg(&encoded)
            .cmd("PTTL")
            .arg(&encoded);
        let (value, pttl): (i64, i64) = self.execute_atomic("increment", pipeline).await?;
        Ok(Increment {
            value,
            expiring: pttl != NO_EXPIRY,
        })
    }

    async fn expire(&self, key: &TenantScopedKey, ttl: Duration) -> Result<(), StoreError> {
        let mut command = redis::cmd("EXPIRE");
        command.arg(key.encode()).arg(ttl_secs(ttl));
        // 0 means the key was missing, which is fine.
        let _applied: i64 = self.execute("expire", command).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let _pong: String = self.execute("ping", redis::cmd("PING")).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_url_is_rejected_upfront() {
        let err = RedisCounterStore::new("not a url", RetryPolicy::default()).unwrap_err();
        assert_eq!(err.store(), COUNTER_STORE);
    }

    #[test]
    fn test_construction_does_not_connect() {
        let store =
            RedisCounterStore::new("redis://127.0.0.1:1", RetryPolicy::default()).unwrap();
        assert!(!store.connection.initialized());
    }

    #[test]
    fn test_ttl_rounds_up_to_one_second() {
        assert_eq!(ttl_secs(Duration::from_millis(10)), 1);
        assert_eq!(ttl_secs(Duration::from_secs(60)), 60);
    }

    #[tokio::test]
    async fn test_unreachable_server_is_a_bounded_failure() {
        let policy = RetryPolicy::new(Duration::from_millis(200), 1);
        let store = RedisCounterStore::new("redis://127.0.0.1:1", policy).unwrap();

        let started = std::time::Instant::now();
        assert!(store.ping().await.is_err());
        assert!(started.elapsed() < Duration::from_secs(2));
    }
}
