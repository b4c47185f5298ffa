//! REST API Routes
//!
//! Router assembly. Document and search routes are gated: the tenant
//! middleware runs first, then the rate limiter. Health and the OpenAPI
//! document sit outside the gate.

use axum::{
    middleware::{from_fn, from_fn_with_state},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::middleware::{rate_limit_middleware, tenant_middleware};
use crate::openapi::ApiDoc;
use crate::state::AppState;

pub mod documents;
pub mod health;
pub mod search;

/// Handler for /openapi.json endpoint.
async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

/// Build the complete gateway router.
pub fn create_api_router(state: AppState) -> Router {
    let mut gated = Router::new()
        .merge(documents::create_router())
        .merge(search::create_router());

    // Layers wrap outward: the limiter is added first so it runs after the
    // tenant middleware.
    if state.rate_limit_enabled {
        gated = gated.layer(from_fn_with_state(
            state.rate_limiter.clone(),
            rate_limit_middleware,
        ));
    }
    let gated = gated.layer(from_fn(tenant_middleware));

    Router::new()
        .merge(health::create_router())
        .route("/openapi.json", get(openapi_json))
        .merge(gated)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
