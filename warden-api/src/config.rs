//! API Configuration Module
//!
//! Listener, rate limiting, search cache, and backend settings. Everything is
//! read once from environment variables at startup, with development
//! defaults.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use warden_storage::{ElasticsearchConfig, RetryPolicy};

// ============================================================================
// API CONFIGURATION
// ============================================================================

/// Gateway behaviour: where to listen and how to gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    // ========================================================================
    // Listener
    // ========================================================================
    pub bind_host: IpAddr,
    pub port: u16,

    // ========================================================================
    // Rate Limiting Configuration
    // ========================================================================
    /// When false, gated routes skip the limiter and carry no quota headers.
    pub rate_limit_enabled: bool,

    /// Requests admitted per tenant per window.
    pub rate_limit_max: u32,

    /// Fixed window length.
    pub rate_limit_window: Duration,

    // ========================================================================
    // Search Cache
    // ========================================================================
    /// Lifetime of a cached search result. Independent of the rate limit window.
    pub search_cache_ttl: Duration,

    // ========================================================================
    // Logging
    // ========================================================================
    pub log_format: LogFormat,
}

/// Output format of the fmt layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

impl LogFormat {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "json" => Some(LogFormat::Json),
            "pretty" | "text" => Some(LogFormat::Pretty),
            _ => None,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 3000,
            rate_limit_enabled: true,
            rate_limit_max: 20,
            rate_limit_window: Duration::from_secs(60),
            search_cache_ttl: Duration::from_secs(60),
            log_format: LogFormat::Json,
        }
    }
}

impl ApiConfig {
    /// Create ApiConfig from environment variables.
    ///
    /// Environment variables:
    /// - `WARDEN_API_BIND`: Bind address (default: 0.0.0.0)
    /// - `PORT` or `WARDEN_API_PORT`: Bind port (default: 3000)
    /// - `WARDEN_RATE_LIMIT_ENABLED`: "true" or "false" (default: true)
    /// - `WARDEN_RATE_LIMIT_MAX` or `RATE_LIMIT_MAX`: Requests per window (default: 20)
    /// - `WARDEN_RATE_LIMIT_WINDOW_SECS`: Window length (default: 60)
    /// - `WARDEN_SEARCH_CACHE_TTL_SECS`: Search cache TTL (default: 60)
    /// - `WARDEN_LOG_FORMAT`: "json" or "pretty" (default: json)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Unparseable values fall back
    /// to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let bind_host = lookup("WARDEN_API_BIND")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.bind_host);

        let port = lookup("PORT")
            .or_else(|| lookup("WARDEN_API_PORT"))
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.port);

        let rate_limit_enabled = lookup("WARDEN_RATE_LIMIT_ENABLED")
            .map(|s| s.to_lowercase() != "false")
            .unwrap_or(defaults.rate_limit_enabled);

        let rate_limit_max = lookup("WARDEN_RATE_LIMIT_MAX")
            .or_else(|| lookup("RATE_LIMIT_MAX"))
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.rate_limit_max);

        let rate_limit_window = lookup("WARDEN_RATE_LIMIT_WINDOW_SECS")
            .and_then(|s| s.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.rate_limit_window);

        let search_cache_ttl = lookup("WARDEN_SEARCH_CACHE_TTL_SECS")
            .and_then(|s| s.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.search_cache_ttl);

        let log_format = lookup("WARDEN_LOG_FORMAT")
            .and_then(|s| LogFormat::parse(&s))
            .unwrap_or(defaults.log_format);

        Self {
            bind_host,
            port,
            rate_limit_enabled,
            rate_limit_max,
            rate_limit_window,
            search_cache_ttl,
            log_format,
        }
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_host, self.port)
    }
}

// ============================================================================
// STORE CONFIGURATION
// ============================================================================

/// Backend connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub elasticsearch: ElasticsearchConfig,
    pub redis_url: String,
    pub counter_retry: RetryPolicy,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            elasticsearch: ElasticsearchConfig::default(),
            redis_url: "redis://localhost:6379".to_string(),
            counter_retry: RetryPolicy::default(),
        }
    }
}

impl StoreConfig {
    /// Create StoreConfig from environment variables.
    ///
    /// Environment variables:
    /// - `WARDEN_ELASTICSEARCH_URL` or `ELASTICSEARCH_NODE` (default: http://localhost:9200)
    /// - `WARDEN_ELASTICSEARCH_INDEX` (default: documents)
    /// - `WARDEN_DOCUMENT_STORE_TIMEOUT_MS` (default: 5000)
    /// - `WARDEN_REDIS_URL`, else built from `REDIS_HOST` and `REDIS_PORT`
    ///   (default: redis://localhost:6379)
    /// - `WARDEN_COUNTER_STORE_TIMEOUT_MS` (default: 500)
    /// - `WARDEN_COUNTER_STORE_RETRIES` (default: 1)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let node = lookup("WARDEN_ELASTICSEARCH_URL")
            .or_else(|| lookup("ELASTICSEARCH_NODE"))
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(defaults.elasticsearch.node);

        let index = lookup("WARDEN_ELASTICSEARCH_INDEX")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(defaults.elasticsearch.index);

        let document_timeout = millis(&lookup, "WARDEN_DOCUMENT_STORE_TIMEOUT_MS")
            .unwrap_or(defaults.elasticsearch.timeout);

        let redis_url = lookup("WARDEN_REDIS_URL")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| {
                let host = lookup("REDIS_HOST").unwrap_or_else(|| "localhost".to_string());
                let port = lookup("REDIS_PORT").unwrap_or_else(|| "6379".to_string());
                format!("redis://{}:{}", host, port)
            });

        let counter_timeout = millis(&lookup, "WARDEN_COUNTER_STORE_TIMEOUT_MS")
            .unwrap_or(defaults.counter_retry.timeout);

        let counter_retries = lookup("WARDEN_COUNTER_STORE_RETRIES")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.counter_retry.max_retries);

        Self {
            elasticsearch: ElasticsearchConfig {
                node,
                index,
                timeout: document_timeout,
            },
            redis_url,
            counter_retry: RetryPolicy::new(counter_timeout, counter_retries),
        }
    }
}

fn millis(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<Duration> {
    lookup(key)
        .and_then(|s| s.trim().parse::<u64>().ok())
        .filter(|ms| *ms > 0)
        .map(Duration::from_millis)
}
