//! OpenAPI Specification for the Warden API

use utoipa::OpenApi;
use warden_core::{ComponentStatus, Document, GatewayStatus};

use crate::error::{ApiError, ErrorCode};
use crate::routes::{documents, health, search};
use crate::services::{Provenance, SearchResults};

/// OpenAPI document for the Warden gateway.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Warden API",
        description = "Tenant-gated gateway in front of a shared document store and counter store",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers((url = "http://localhost:3000", description = "Local Development")),
    tags(
        (name = "Documents", description = "Tenant-scoped document storage"),
        (name = "Search", description = "Cached full-text search within a tenant"),
        (name = "Health", description = "Dependency and process health"),
    ),
    paths(
        documents::create_document,
        documents::get_document,
        documents::delete_document,
        search::search_documents,
        health::health,
        health::liveness,
    ),
    components(schemas(
        ApiError,
        ErrorCode,
        Document,
        documents::CreateDocumentRequest,
        SearchResults,
        Provenance,
        health::HealthResponse,
        health::DependencyStatus,
        health::LivenessResponse,
        GatewayStatus,
        ComponentStatus,
    ))
)]
pub struct ApiDoc;
