//! Warden API Server Entry Point
//!
//! Loads `.env`, reads configuration, builds the store clients once, and
//! serves the gateway until ctrl-c.

use std::sync::Arc;

use axum::Router;
use warden_api::telemetry::init_tracing;
use warden_api::{create_api_router, ApiConfig, ApiError, ApiResult, AppState, ErrorCode, StoreConfig};
use warden_storage::{ElasticsearchDocumentStore, RedisCounterStore};

#[tokio::main]
async fn main() -> ApiResult<()> {
    // A missing .env file is normal outside development.
    dotenvy::dotenv().ok();

    let api_config = ApiConfig::from_env();
    init_tracing(api_config.log_format)?;
    let store_config = StoreConfig::from_env();

    let documents = Arc::new(
        ElasticsearchDocumentStore::new(store_config.elasticsearch.clone())
            .map_err(|e| startup_error("document store client", e))?,
    );
    match documents.ensure_index().await {
        Ok(()) => tracing::info!(
            node = %store_config.elasticsearch.node,
            index = %store_config.elasticsearch.index,
            "Document index ready"
        ),
        Err(err) => tracing::warn!(
            error = %err,
            index = %store_config.elasticsearch.index,
            "Document index bootstrap failed, continuing"
        ),
    }

    // Connects lazily; the gateway starts and fails open without Redis.
    let counters = Arc::new(
        RedisCounterStore::new(&store_config.redis_url, store_config.counter_retry)
            .map_err(|e| startup_error("counter store client", e))?,
    );

    let state = AppState::new(&api_config, documents, counters);
    let app: Router = create_api_router(state);

    let addr = api_config.bind_addr();
    tracing::info!(
        %addr,
        rate_limit_enabled = api_config.rate_limit_enabled,
        rate_limit_max = api_config.rate_limit_max,
        "Starting Warden API server"
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| startup_error("listener", format!("failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result.map_err(|e| startup_error("server", e))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}

fn startup_error(component: &str, err: impl std::fmt::Display) -> ApiError {
    ApiError::new(ErrorCode::InternalError, format!("{}: {}", component, err))
}
