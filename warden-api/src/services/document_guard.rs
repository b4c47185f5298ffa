//! Tenant Document Guard
//!
//! Tenant isolation over a document store whose get and delete primitives
//! address documents by global id alone.

use std::sync::Arc;

use warden_core::{Document, DocumentId, Lookup, NewDocument, TenantId, WardenResult};
use warden_storage::DocumentStore;

/// Tenant-safe document access.
///
/// A document owned by another tenant is reported exactly like a missing
/// one. Delete is a checked read followed by a global delete; the pair is
/// not atomic.
#[derive(Clone)]
pub struct TenantDocumentGuard {
    store: Arc<dyn DocumentStore>,
}

impl TenantDocumentGuard {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Create a document owned by `tenant`.
    ///
    /// The write waits for visibility, so the document can be fetched and
    /// searched as soon as this returns.
    ///
    /// # Errors
    /// Returns `Validation` for a blank title or content (before touching
    /// the store) and `StoreUnavailable` if the write fails.
    pub async fn create(&self, tenant: &TenantId, new: NewDocument) -> WardenResult<Document> {
        new.validate()?;
        let document = Document::create(tenant.clone(), new);
        self.store.create(&document).await?;
        tracing::debug!(tenant = %tenant, id = %document.id, "Document created");
        Ok(document)
    }

    /// Fetch `id` if it exists and belongs to `tenant`.
    pub async fn get(&self, tenant: &TenantId, id: &DocumentId) -> Lookup<Document> {
        Lookup::from(self.store.get_by_id(id).await).filter(|document| document.is_owned_by(tenant))
    }

    /// Delete `id` if it exists and belongs to `tenant`.
    ///
    /// Returns `false` without error when there is nothing the tenant may
    /// delete, including when the document vanished between the check and
    /// the delete.
    ///
    /// # Errors
    /// Returns `StoreUnavailable` if either store call fails.
    pub async fn delete(&self, tenant: &TenantId, id: &DocumentId) -> WardenResult<bool> {
        match self.get(tenant, id).await {
            Lookup::Found(_) => Ok(self.store.delete_by_id(id).await?),
            Lookup::NotFound => Ok(false),
            Lookup::Unavailable(err) => Err(err.into()),
        }
    }

    /// Full-text search over `tenant`'s documents, in store relevance order.
    ///
    /// # Errors
    /// Returns `StoreUnavailable` if the query fails.
    pub async fn search(&self, tenant: &TenantId, text: &str) -> WardenResult<Vec<Document>> {
        Ok(self.store.query(tenant, text).await?)
    }
}

// =============================================================================
// TESTS
// =============================================================================
