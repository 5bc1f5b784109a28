//! Startup orchestration.
//!
//! # Responsibilities
//! - Load the identity table before anything can serve
//! - Start the optional metrics endpoint
//! - Bind the listener last (traffic only when ready)
//!
//! # Design Decisions
//! - A missing identity file is not fatal; the table is simply empty
//! - Failing to bind the listen address is fatal

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::GatewayConfig;
use crate::http::GatewayServer;
use crate::identity::IdentityTable;
use crate::observability::metrics;

/// Errors that abort startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Unable to listen on {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
}

/// Everything needed to start serving.
pub struct Startup {
    pub server: GatewayServer,
    pub listener: TcpListener,
}

/// Build the server from a validated config and bind its listener.
pub async fn prepare(config: &GatewayConfig) -> Result<Startup, StartupError> {
    let identities = Arc::new(IdentityTable::load(
        Path::new(&config.identity.path),
        config.observability.verbose,
    ));

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let server = GatewayServer::new(config, identities);

    let listener = TcpListener::bind(config.listener.bind_address.as_str())
        .await
        .map_err(|source| StartupError::Bind {
            address: config.listener.bind_address.clone(),
            source,
        })?;

    Ok(Startup { server, listener })
}
