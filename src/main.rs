//! Barzer query gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌────────────────────────────────────────────────┐
//!                         │                    GATEWAY                     │
//!     Client Request      │  ┌─────────┐    ┌───────────┐    ┌──────────┐  │
//!     ────────────────────┼─▶│  http   │───▶│  routing  │───▶│  query   │  │
//!                         │  │ server  │    │  (action) │    │translator│  │
//!                         │  └─────────┘    └───────────┘    └────┬─────┘  │
//!                         │                                       │        │
//!                         │                   identity table ◀────┤        │
//!                         │                                       ▼        │
//!     Client Response     │  ┌─────────┐                     ┌──────────┐  │
//!     ◀───────────────────┼──│ format  │◀────── raw bytes ───│  relay   │◀─┼──── Backend
//!                         │  │envelope │                     │ (TCP)    │  │     (TCP)
//!                         │  └─────────┘                     └──────────┘  │
//!                         └────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;

use barzer_gateway::config::{load_config, validate_config, GatewayConfig};
use barzer_gateway::lifecycle::{self, Shutdown};
use barzer_gateway::observability::init_tracing;

#[derive(Parser, Debug)]
#[command(name = "barzer-gateway")]
#[command(about = "HTTP gateway for the Barzer query engine", long_about = None)]
struct Cli {
    /// TOML configuration file. Flags below override its values.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Key file (key|uid per line)
    #[arg(long)]
    kfile: Option<String>,

    /// Backend hostname:port
    #[arg(long)]
    bhost: Option<String>,

    /// Listen on addr:port (":8090" listens on all interfaces)
    #[arg(long)]
    listen: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn apply(self, config: &mut GatewayConfig) {
        if let Some(kfile) = self.kfile {
            config.identity.path = kfile;
        }
        if let Some(bhost) = self.bhost {
            config.backend.address = bhost;
        }
        if let Some(listen) = self.listen {
            config.listener.bind_address = normalize_listen(&listen);
        }
        if self.verbose {
            config.observability.verbose = true;
        }
    }
}

/// `:8090` → `0.0.0.0:8090`.
fn normalize_listen(addr: &str) -> String {
    match addr.strip_prefix(':') {
        Some(port) => format!("0.0.0.0:{port}"),
        None => addr.to_string(),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };
    cli.apply(&mut config);

    init_tracing(&config.observability);

    if let Err(errors) = validate_config(&config) {
        for error in &errors {
            tracing::error!(%error, "Invalid configuration");
        }
        return Err(format!("{} configuration error(s)", errors.len()).into());
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        backend = %config.backend.address,
        identity_path = %config.identity.path,
        verbose = config.observability.verbose,
        "Configuration loaded"
    );

    let startup = lifecycle::prepare(&config).await.map_err(|e| {
        tracing::error!(error = %e, "Startup failed");
        e
    })?;

    let shutdown = Shutdown::new();
    startup
        .server
        .run(startup.listener, shutdown.subscribe())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
