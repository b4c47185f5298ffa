//! Tracing Subscriber Initialization
//!
//! Structured logs through `tracing-subscriber`: an `EnvFilter` from
//! `RUST_LOG` and a fmt layer, JSON by default.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LogFormat;
use crate::error::{ApiError, ApiResult, ErrorCode};

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_LOG_FILTER: &str = "warden_api=debug,warden_storage=info,tower_http=info,info";

/// Install the global subscriber. Call once, before anything logs.
pub fn init_tracing(format: LogFormat) -> ApiResult<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let registry = tracing_subscriber::registry().with(env_filter);
    let result = match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .try_init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().pretty())
            .try_init(),
    };

    result.map_err(|e| {
        ApiError::new(
            ErrorCode::InternalError,
            format!("Failed to initialize tracing subscriber: {}", e),
        )
    })
}
