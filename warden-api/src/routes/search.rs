//! Search REST API Routes

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::error::ApiResult;
use crate::middleware::TenantExtractor;
use crate::services::{SearchCoordinator, SearchResults};
use crate::state::AppState;

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// Full-text query over title and content. Required.
    pub q: Option<String>,
}

/// GET /search - Search the caller's documents
#[utoipa::path(
    get,
    path = "/search",
    tag = "Search",
    params(
        SearchParams,
        ("x-tenant-id" = String, Header, description = "Tenant identifier"),
    ),
    responses(
        (status = 200, description = "Matching documents, tagged with their source", body = SearchResults),
        (status = 400, description = "Missing tenant or query", body = crate::error::ApiError),
        (status = 429, description = "Rate limit exceeded", body = crate::error::ApiError),
        (status = 503, description = "Document store unavailable", body = crate::error::ApiError),
    ),
)]
pub async fn search_documents(
    State(search): State<SearchCoordinator>,
    TenantExtractor(tenant): TenantExtractor,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> ApiResult<Json<SearchResults>> {
    let Query(params) = params?;
    let query = params.q.unwrap_or_default();
    let results = search.search(&tenant, &query).await?;
    Ok(Json(results))
}

pub fn create_router() -> Router<AppState> {
    Router::new().route("/search", get(search_documents))
}
