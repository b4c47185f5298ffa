//! Elasticsearch-backed document store over the REST API.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use warden_core::{Document, DocumentId, StoreError, TenantId};

use crate::document::DocumentStore;
use crate::DOCUMENT_STORE;

/// Writes and deletes block until the change is searchable.
const WAIT_FOR_REFRESH: &str = "wait_for";

/// Connection settings for [`ElasticsearchDocumentStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElasticsearchConfig {
    /// Base URL of a node, e.g. `http://localhost:9200`.
    pub node: String,
    /// Index holding every tenant's documents.
    pub index: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for ElasticsearchConfig {
    fn default() -> Self {
        Self {
            node: "http://localhost:9200".to_string(),
            index: "documents".to_string(),
            timeout: Duration::from_secs(5),
        }
    }
}

/// [`DocumentStore`] over a single Elasticsearch index.
///
/// All tenants share the index; documents carry a `tenantId` keyword field
/// and searches filter on it.
#[derive(Debug, Clone)]
pub struct ElasticsearchDocumentStore {
    client: Client,
    node: String,
    index: String,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct GetResponse {
    found: bool,
    #[serde(rename = "_source")]
    source: Option<Document>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: SearchHits,
}

#[derive(Debug, Deserialize)]
struct SearchHits {
    hits: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(rename = "_source")]
    source: Document,
}

impl ElasticsearchDocumentStore {
    /// Build a client for `config`. No request is made.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the HTTP client cannot be built.
    pub fn new(config: ElasticsearchConfig) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                StoreError::unavailable(DOCUMENT_STORE, format!("HTTP client setup failed: {}", e))
            })?;

        Ok(Self {
            client,
            node: config.node.trim_end_matches('/').to_string(),
            index: config.index,
            timeout: config.timeout,
        })
    }

    /// Create the index with an explicit mapping if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the node is unreachable or rejects the
    /// mapping.
    pub async fn ensure_index(&self) -> Result<(), StoreError> {
        let url = self.index_url();
        let response = self
            .client
            .head(&url)
            .send()
            .await
            .map_err(|e| self.transport_error("ensure_index", e))?;

        match response.status() {
            status if status.is_success() => return Ok(()),
            StatusCode::NOT_FOUND => {}
            status => {
                return Err(StoreError::unavailable(
                    DOCUMENT_STORE,
                    format!("index check returned {}", status),
                ))
            }
        }

        let response = self
            .client
            .put(&url)
            .json(&index_mapping())
            .send()
            .await
            .map_err(|e| self.transport_error("ensure_index", e))?;
        expect_success(response).await?;

        tracing::info!(index = %self.index, "Created document index");
        Ok(())
    }

    fn index_url(&self) -> String {
        format!("{}/{}", self.node, self.index)
    }

    fn document_url(&self, id: &DocumentId) -> String {
        format!(
            "{}/{}/_doc/{}",
            self.node,
            self.index,
            urlencoding::encode(id.as_str())
        )
    }

    fn transport_error(&self, operation: &'static str, err: reqwest::Error) -> StoreError {
        if err.is_timeout() {
            StoreError::Timeout {
                store: DOCUMENT_STORE,
                operation,
                after: self.timeout,
            }
        } else {
            StoreError::unavailable(DOCUMENT_STORE, format!("{} request failed: {}", operation, err))
        }
    }
}

fn index_mapping() -> Value {
    json!({
        "mappings": {
            "properties": {
                "id": { "type": "keyword" },
                "tenantId": { "type": "keyword" },
                "title": { "type": "text" },
                "content": { "type": "text" },
                "createdAt": { "type": "date" }
            }
        }
    })
}

fn search_body(tenant: &TenantId, text: &str) -> Value {
    json!({
        "query": {
            "bool": {
                "must": [
                    { "multi_match": { "query": text, "fields": ["title", "content"] } }
                ],
                "filter": [
                    { "term": { "tenantId": tenant.as_str() } }
                ]
            }
        }
    })
}

async fn expect_success(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(StoreError::unavailable(
        DOCUMENT_STORE,
        format!("request returned {}: {}", status, body),
    ))
}

async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T, StoreError> {
    let bytes = response.bytes().await.map_err(|e| {
        StoreError::unavailable(DOCUMENT_STORE, format!("failed to read response: {}", e))
    })?;
    parse_body(&bytes)
}

fn parse_body<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, StoreError> {
    serde_json::from_slice(bytes).map_err(|e| StoreError::invalid_response(DOCUMENT_STORE, e.to_string()))
}

fn found_document(body: GetResponse) -> Result<Option<Document>, StoreError> {
    match (body.found, body.source) {
        (false, _) => Ok(None),
        (true, Some(document)) => Ok(Some(document)),
        (true, None) => Err(StoreError::invalid_response(
            DOCUMENT_STORE,
            "document found without _source",
        )),
    }
}

#[async_trait]
impl DocumentStore for ElasticsearchDocumentStore {
    async fn create(&self, document: &Document) -> Result<(), StoreError> {
        let response = self
            .client
            .put(self.document_url(&document.id))
            .query(&[("refresh", WAIT_FOR_REFRESH)])
            .json(document)
            .send()
            .await
            .map_err(|e| self.transport_error("create", e))?;
        expect_success(response).await?;
        Ok(())
    }

    async fn get_by_id(&self, id: &DocumentId) -> Result<Option<Document>, StoreError> {
        let response = self
            .client
            .get(self.document_url(id))
            .send()
            .await
            .map_err(|e| self.transport_error("get", e))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = expect_success(response).await?;
        found_document(parse_json(response).await?)
    }

    async fn delete_by_id(&self, id: &DocumentId) -> Result<bool, StoreError> {
        let response = self
            .client
            .delete(self.document_url(id))
            .query(&[("refresh", WAIT_FOR_REFRESH)])
            .send()
            .await
            .map_err(|e| self.transport_error("delete", e))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        expect_success(response).await?;
        Ok(true)
    }

    async fn query(&self, tenant: &TenantId, text: &str) -> Result<Vec<Document>, StoreError> {
        let response = self
            .client
            .post(format!("{}/_search", self.index_url()))
            .json(&search_body(tenant, text))
            .send()
            .await
            .map_err(|e| self.transport_error("search", e))?;

        let response = expect_success(response).await?;
        let body: SearchResponse = parse_json(response).await?;
        Ok(body.hits.hits.into_iter().map(|hit| hit.source).collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let response = self
            .client
            .get(format!("{}/_cluster/health", self.node))
            .send()
            .await
            .map_err(|e| self.transport_error("ping", e))?;
        expect_success(response).await?;
        Ok(())
    }
}
