use async_trait::async_trait;
use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::RwLock;
use warden_core::{Document, DocumentId, StoreError, TenantId};

use crate::document::DocumentStore;
use crate::DOCUMENT_STORE;

/// In-memory [`DocumentStore`].
///
/// Writes are visible immediately. Like the real store, `get_by_id` and `delete_by_id` ignore tenants; only `query`
/// filters by one.
///
/// Relevance is a plain term count: each query term found in the title
/// scores 2, in the content 1. Ties keep creation order.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    documents: RwLock<HashMap<DocumentId, Document>>,
    offline: AtomicBool,
    operations: AtomicU64,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail as if the store were down.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of calls received, successful or not.
    pub fn operation_count(&self) -> u64 {
        self.operations.load(Ordering::SeqCst)
    }

    /// Number of stored documents across all tenants.
    pub fn len(&self) -> usize {
        self.documents.read().map(|docs| docs.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn begin(&self, operation: &'static str) -> Result<(), StoreError> {
        self.operations.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable(
                DOCUMENT_STORE,
                format!("{} refused: store offline", operation),
            ));
        }
        Ok(())
    }
}

fn lock_poisoned() -> StoreError {
    StoreError::unavailable(DOCUMENT_STORE, "storage lock poisoned")
}

fn terms(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|term| !term.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn relevance(document: &Document, query_terms: &[String]) -> usize {
    let title = terms(&document.title);
    let content = terms(&document.content);
    query_terms
        .iter()
        .map(|term| {
            let in_title = title.iter().filter(|t| *t == term).count();
            let in_content = content.iter().filter(|t| *t == term).count();
            in_title * 2 + in_content
        })
        .sum()
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn create(&self, document: &Document) -> Result<(), StoreError> {
        self.begin("create")?;
        let mut documents = self.documents.write().map_err(|_| lock_poisoned())?;
        documents.insert(document.id.clone(), document.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: &DocumentId) -> Result<Option<Document>, StoreError> {
        self.begin("get")?;
        let documents = self.documents.read().map_err(|_| lock_poisoned())?;
        Ok(documents.get(id).cloned())
    }

    async fn delete_by_id(&self, id: &DocumentId) -> Result<bool, StoreError> {
        self.begin("delete")?;
        let mut documents = self.documents.write().map_err(|_| lock_poisoned())?;
        Ok(documents.remove(id).is_some())
    }

    async fn query(&self, tenant: &TenantId, text: &str) -> Result<Vec<Document>, StoreError> {
        self.begin("search")?;
        let query_terms = terms(text);
        let documents = self.documents.read().map_err(|_| lock_poisoned())?;

        let mut hits: Vec<(usize, &Document)> = documents
            .values()
            .filter(|doc| doc.is_owned_by(tenant))
            .map(|doc| (relevance(doc, &query_terms), doc))
            .filter(|(score, _)| *score > 0)
            .collect();

        hits.sort_by_key(|(score, doc)| (Reverse(*score), doc.created_at, doc.id.clone()));
        Ok(hits.into_iter().map(|(_, doc)| doc.clone()).collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.begin("ping")
    }
}
