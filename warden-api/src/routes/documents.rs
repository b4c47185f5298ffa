//! Document REST API Routes
//!
//! Create, fetch, and delete documents on behalf of the request's tenant.
//! A document owned by another tenant is reported exactly like a missing
//! one.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use warden_core::{Document, DocumentId, NewDocument};

use crate::error::{ApiError, ApiResult};
use crate::middleware::TenantExtractor;
use crate::services::TenantDocumentGuard;
use crate::state::AppState;

/// Body of `POST /documents`. Both fields are required and must be
/// non-empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CreateDocumentRequest {
    pub title: Option<String>,
    pub content: Option<String>,
}

// ============================================================================
// HANDLERS
// ============================================================================

/// POST /documents - Create a document owned by the caller's tenant
#[utoipa::path(
    post,
    path = "/documents",
    tag = "Documents",
    request_body = CreateDocumentRequest,
    params(("x-tenant-id" = String, Header, description = "Tenant identifier")),
    responses(
        (status = 201, description = "Document created", body = Document),
        (status = 400, description = "Missing tenant or invalid payload", body = ApiError),
        (status = 429, description = "Rate limit exceeded", body = ApiError),
        (status = 503, description = "Document store unavailable", body = ApiError),
    ),
)]
pub async fn create_document(
    State(guard): State<TenantDocumentGuard>,
    TenantExtractor(tenant): TenantExtractor,
    payload: Result<Json<CreateDocumentRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(payload) = payload?;
    let new = NewDocument::from_parts(payload.title, payload.content)?;
    let document = guard.create(&tenant, new).await?;
    Ok((StatusCode::CREATED, Json(document)))
}

/// GET /documents/{id} - Fetch one of the caller's documents
#[utoipa::path(
    get,
    path = "/documents/{id}",
    tag = "Documents",
    params(
        ("id" = String, Path, description = "Document ID"),
        ("x-tenant-id" = String, Header, description = "Tenant identifier"),
    ),
    responses(
        (status = 200, description = "Document found", body = Document),
        (status = 404, description = "Document not found", body = ApiError),
        (status = 429, description = "Rate limit exceeded", body = ApiError),
        (status = 503, description = "Document store unavailable", body = ApiError),
    ),
)]
pub async fn get_document(
    State(guard): State<TenantDocumentGuard>,
    TenantExtractor(tenant): TenantExtractor,
    Path(id): Path<String>,
) -> ApiResult<Json<Document>> {
    let document = guard.get(&tenant, &DocumentId::from(id)).await.into_result()?;
    Ok(Json(document))
}

/// DELETE /documents/{id} - Delete one of the caller's documents
#[utoipa::path(
    delete,
    path = "/documents/{id}",
    tag = "Documents",
    params(
        ("id" = String, Path, description = "Document ID"),
        ("x-tenant-id" = String, Header, description = "Tenant identifier"),
    ),
    responses(
        (status = 204, description = "Document deleted"),
        (status = 404, description = "Document not found", body = ApiError),
        (status = 429, description = "Rate limit exceeded", body = ApiError),
        (status = 503, description = "Document store unavailable", body = ApiError),
    ),
)]
pub async fn delete_document(
    State(guard): State<TenantDocumentGuard>,
    TenantExtractor(tenant): TenantExtractor,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    if guard.delete(&tenant, &DocumentId::from(id)).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found())
    }
}

// ============================================================================
// ROUTER
// ============================================================================

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/documents", post(create_document))
        .route("/documents/:id", get(get_document).delete(delete_document))
}
