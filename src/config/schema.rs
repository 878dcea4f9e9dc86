//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from a TOML file,
//! and every section has defaults so a minimal (or absent) config works.

use serde::{Deserialize, Serialize};

/// Root configuration for the relay.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Ingress listener settings.
    pub listener: ListenerConfig,

    /// Downstream target settings.
    pub forward: ForwardConfig,

    /// Retry queue settings.
    pub retry: RetryConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Ingress listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:8080").
    pub bind_address: String,

    /// Maximum inbound body size in bytes.
    pub max_body_size: usize,

    /// Total timeout for handling one inbound request, in seconds.
    pub request_timeout_secs: u64,

    /// How long in-flight requests may drain after a shutdown signal,
    /// in seconds.
    pub shutdown_grace_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
            max_body_size: 2 * 1024 * 1024,
            request_timeout_secs: 30,
            shutdown_grace_secs: 10,
        }
    }
}

/// Downstream target configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ForwardConfig {
    /// Base URL requests are relayed to; scheme and authority replace
    /// the inbound ones, path and query are preserved.
    pub target: String,

    /// Per-attempt delivery timeout in milliseconds.
    pub request_timeout_ms: u64,
}

impl Default for ForwardConfig {
    fn default() -> Self {
        Self {
            target: "http://localhost:8081".to_string(),
            request_timeout_ms: 3000,
        }
    }
}

/// Retry queue configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Time between retry cycles in milliseconds.
    pub interval_ms: u64,

    /// Maximum number of buffered requests.
    pub capacity: usize,

    /// Abort a retry cycle on the first failure, deferring the rest of
    /// the batch so cross-request order is preserved.
    pub abort_on_error: bool,

    /// Drop a request after this many retries; 0 retries forever.
    pub max_retries: u32,

    /// Drop a request older than this many milliseconds; 0 keeps
    /// requests regardless of age.
    pub max_age_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            interval_ms: 5000,
            capacity: 100,
            abort_on_error: true,
            max_retries: 0,
            max_age_ms: 0,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
