//! Structured logging.
//!
//! `RUST_LOG` takes precedence. Otherwise the gateway and tower-http log at
//! the configured level, or at `debug` when verbose output is on.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;

/// Default filter directive for the given settings.
pub fn default_directive(config: &ObservabilityConfig) -> String {
    let level = if config.verbose {
        "debug"
    } else {
        config.log_level.as_str()
    };
    format!("barzer_gateway={level},tower_http={level}")
}

/// Install the global subscriber. Later calls are ignored.
pub fn init_tracing(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_directive(config).into());

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
