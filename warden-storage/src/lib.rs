//! Warden Storage - Store Contracts and Backends
//!
//! Defines the two external collaborators the gateway sits in front of:
//!
//! - [`DocumentStore`]: documents tagged with a tenant, with global
//!   get/delete by id and a tenant-filtered full-text query.
//! - [`CounterStore`]: a key/value store with atomic increment and expiry,
//!   used for both rate limiting and the search cache.
//!
//! Production backends are [`ElasticsearchDocumentStore`] and
//! [`RedisCounterStore`]. The in-memory backends implement the same
//! contracts in process and carry fault injection for tests.

pub mod counter;
pub mod document;
pub mod elasticsearch;
pub mod key;
pub mod memory;
pub mod probe;
pub mod redis_store;
pub mod retry;

pub use counter::{CounterStore, Increment};
pub use document::DocumentStore;
pub use elasticsearch::{ElasticsearchConfig, ElasticsearchDocumentStore};
pub use key::{KeyNamespace, TenantScopedKey};
pub use memory::{InMemoryCounterStore, InMemoryDocumentStore};
pub use probe::DependencyProbe;
pub use redis_store::RedisCounterStore;
pub use retry::RetryPolicy;

/// Store name reported in errors raised by counter store backends.
pub const COUNTER_STORE: &str = "counter-store";

/// Store name reported in errors raised by document store backends.
pub const DOCUMENT_STORE: &str = "document-store";
