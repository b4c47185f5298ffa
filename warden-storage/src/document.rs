//! Document store contract.

use async_trait::async_trait;
use warden_core::{Document, DocumentId, StoreError, TenantId};

/// Full-text document store.
///
/// Only [`DocumentStore::query`] is tenant-aware. `get_by_id` and
/// `delete_by_id` address documents by global id and will happily return
/// or remove another tenant's document; tenant isolation for those is the
/// caller's job.
///
/// Writes and deletes return only once the change is visible to reads and
/// searches.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Write a document under its id.
    async fn create(&self, document: &Document) -> Result<(), StoreError>;

    /// Fetch by global id, regardless of owner.
    async fn get_by_id(&self, id: &DocumentId) -> Result<Option<Document>, StoreError>;

    /// Delete by global id, regardless of owner. Returns `false` if absent.
    async fn delete_by_id(&self, id: &DocumentId) -> Result<bool, StoreError>;

    /// Full-text query over title and content, filtered to `tenant`, in
    /// relevance order.
    async fn query(&self, tenant: &TenantId, text: &str) -> Result<Vec<Document>, StoreError>;

    /// Liveness probe.
    async fn ping(&self) -> Result<(), StoreError>;
}
