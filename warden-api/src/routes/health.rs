//! Health Check Endpoints
//!
//! - /health - Dependency reachability (200 up, 503 degraded)
//! - /health/live - Process alive check
//!
//! Health endpoints are neither tenant-gated nor rate limited.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use warden_core::{ComponentStatus, DependencyHealth, GatewayStatus};
use warden_storage::DependencyProbe;

use crate::state::AppState;

// ============================================================================
// TYPES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: GatewayStatus,
    pub dependencies: DependencyStatus,
    pub version: String,
    pub uptime_seconds: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DependencyStatus {
    pub document_store: ComponentStatus,
    pub counter_store: ComponentStatus,
}

impl From<DependencyHealth> for DependencyStatus {
    fn from(health: DependencyHealth) -> Self {
        Self {
            document_store: health.store_up.into(),
            counter_store: health.counter_up.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LivenessResponse {
    pub status: String,
}

// ============================================================================
// HANDLERS
// ============================================================================

/// GET /health - Dependency reachability
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Both stores reachable", body = HealthResponse),
        (status = 503, description = "At least one store unreachable", body = HealthResponse),
    ),
)]
pub async fn health(
    State(probe): State<DependencyProbe>,
    State(start_time): State<std::time::Instant>,
) -> impl IntoResponse {
    let dependencies = probe.check_dependencies().await;
    let status = dependencies.status();

    let response = HealthResponse {
        status,
        dependencies: dependencies.into(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: start_time.elapsed().as_secs(),
    };

    let status_code = match status {
        GatewayStatus::Up => StatusCode::OK,
        GatewayStatus::Degraded => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(response))
}

/// GET /health/live - Process liveness check
#[utoipa::path(
    get,
    path = "/health/live",
    tag = "Health",
    responses(
        (status = 200, description = "Process is alive", body = LivenessResponse),
    ),
)]
pub async fn liveness() -> impl IntoResponse {
    let response = LivenessResponse {
        status: "alive".to_string(),
    };
    (StatusCode::OK, Json(response))
}

// ============================================================================
// ROUTER
// ============================================================================

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/live", get(liveness))
}
