//! Router fixture over in-memory stores.
#![allow(dead_code)]

use axum::{
    body::{Body, Bytes},
    http::{HeaderMap, Method, Request, StatusCode},
    Router,
};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use warden_api::{create_api_router, ApiConfig, AppState};
use warden_core::{Document, TenantId};
use warden_storage::{InMemoryCounterStore, InMemoryDocumentStore};

pub const TENANT_HEADER: &str = "x-tenant-id";

/// Gateway configuration used unless a test overrides it.
pub fn test_config() -> ApiConfig {
    ApiConfig {
        rate_limit_max: 20,
        rate_limit_window: Duration::from_secs(60),
        search_cache_ttl: Duration::from_secs(60),
        ..ApiConfig::default()
    }
}

/// The full router wired to inspectable in-memory stores.
pub struct TestGateway {
    pub app: Router,
    pub documents: Arc<InMemoryDocumentStore>,
    pub counters: Arc<InMemoryCounterStore>,
}

impl TestGateway {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: ApiConfig) -> Self {
        let documents = Arc::new(InMemoryDocumentStore::new());
        let counters = Arc::new(InMemoryCounterStore::new());
        let state = AppState::new(&config, documents.clone(), counters.clone());
        Self {
            app: create_api_router(state),
            documents,
            counters,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Result<TestResponse, String> {
        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .map_err(|e| format!("Request failed: {:?}", e))?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .map_err(|e| format!("Failed to read body: {:?}", e))?;

        Ok(TestResponse {
            status,
            headers,
            body,
        })
    }

    pub async fn create(
        &self,
        tenant: &TenantId,
        title: &str,
        content: &str,
    ) -> Result<TestResponse, String> {
        let body = serde_json::json!({ "title": title, "content": content });
        self.send(request(Method::POST, "/documents", Some(tenant.as_str()), Some(body))?)
            .await
    }

    /// Create a document and return it, failing unless the gateway answered 201.
    pub async fn create_document(
        &self,
        tenant: &TenantId,
        title: &str,
        content: &str,
    ) -> Result<Document, String> {
        let response = self.create(tenant, title, content).await?;
        if response.status != StatusCode::CREATED {
            return Err(format!("create returned {}: {}", response.status, response.text()));
        }
        response.json()
    }

    pub async fn get(&self, tenant: &TenantId, id: &str) -> Result<TestResponse, String> {
        let uri = format!("/documents/{}", urlencoding::encode(id));
        self.send(request(Method::GET, &uri, Some(tenant.as_str()), None)?)
            .await
    }

    pub async fn delete(&self, tenant: &TenantId, id: &str) -> Result<TestResponse, String> {
        let uri = format!("/documents/{}", urlencoding::encode(id));
        self.send(request(Method::DELETE, &uri, Some(tenant.as_str()), None)?)
            .await
    }

    pub async fn search(&self, tenant: &TenantId, query: &str) -> Result<TestResponse, String> {
        let uri = format!("/search?q={}", urlencoding::encode(query));
        self.send(request(Method::GET, &uri, Some(tenant.as_str()), None)?)
            .await
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, String> {
        serde_json::from_slice(&self.body)
            .map_err(|e| format!("Failed to parse response: {} ({})", e, self.text()))
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// The `code` field of an error body.
    pub fn error_code(&self) -> Option<String> {
        self.json::<serde_json::Value>()
            .ok()
            .and_then(|v| v["code"].as_str().map(str::to_string))
    }
}

pub fn request(
    method: Method,
    uri: &str,
    tenant: Option<&str>,
    body: Option<serde_json::Value>,
) -> Result<Request<Body>, String> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(tenant) = tenant {
        builder = builder.header(TENANT_HEADER, tenant);
    }
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    builder
        .body(body)
        .map_err(|e| format!("Failed to build request: {}", e))
}
