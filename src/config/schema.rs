//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files.
//! Every section falls back to its defaults so an empty file is valid.

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Backend query engine settings.
    pub backend: BackendConfig,

    /// Identity source settings.
    pub identity: IdentityConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8090").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8090".to_string(),
        }
    }
}

/// Backend query engine configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Backend address as `host:port`. Resolved on every connect.
    pub address: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            address: "localhost:5767".to_string(),
        }
    }
}

/// Identity source configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Path to the `key|identity` file.
    pub path: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            path: "/usr/share/barzer/auth_keys.txt".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Verbose output: logs loaded identities and outgoing frames.
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
