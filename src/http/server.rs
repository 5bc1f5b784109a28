//! HTTP server setup and request dispatch.
//!
//! # Responsibilities
//! - Create the Axum Router with the gateway handler on every path
//! - Wire up middleware (tracing)
//! - Dispatch requests: router → translator → relay
//! - Map pipeline errors to diagnostics or error envelopes
//!
//! Every response uses the default 200 status.

use axum::{
    extract::State,
    http::Uri,
    response::Response,
    routing::any,
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::config::GatewayConfig;
use crate::http::format::{diagnostic, UNKNOWN_ACTION, UNKNOWN_QUERY_TYPE};
use crate::identity::IdentityTable;
use crate::lifecycle::ShutdownSignal;
use crate::observability::metrics::{self, Outcome};
use crate::query::{parse_query_string, QueryTranslator, TranslateError, UNKNOWN_USER_MESSAGE};
use crate::relay::{BackendRelay, CONNECT_ERROR_MESSAGE};
use crate::routing::{decode_path, Action, RequestRouter};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub router: RequestRouter,
    pub translator: QueryTranslator,
    pub relay: BackendRelay,
}

/// HTTP front end of the gateway.
pub struct GatewayServer {
    router: Router,
    state: AppState,
}

impl GatewayServer {
    /// Create a server. `identities` must be fully loaded.
    pub fn new(config: &GatewayConfig, identities: Arc<IdentityTable>) -> Self {
        let state = AppState {
            router: RequestRouter::new(),
            translator: QueryTranslator::new(identities),
            relay: BackendRelay::new(
                config.backend.address.clone(),
                config.observability.verbose,
            ),
        };

        let router = Self::build_router(state.clone());
        Self { router, state }
    }

    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(gateway_handler))
            .route("/", any(gateway_handler))
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    /// The Axum router, for serving or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn identities(&self) -> &IdentityTable {
        self.state.translator.identities()
    }

    pub fn relay(&self) -> &BackendRelay {
        &self.state.relay
    }

    /// Serve until Ctrl+C or `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: ShutdownSignal,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            backend = %self.state.relay.address(),
            users = self.identities().len(),
            "Serving..."
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown.wait())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Handles every path and method.
async fn gateway_handler(State(state): State<AppState>, uri: Uri) -> Response {
    let request_id = Uuid::new_v4();
    let path = decode_path(uri.path());

    match state.router.route(&path) {
        Action::Unknown => {
            tracing::debug!(request_id = %request_id, path = %path, "Unknown action");
            metrics::record_request(Outcome::UnknownAction);
            diagnostic(UNKNOWN_ACTION)
        }
        Action::Query { format_tag } => {
            handle_query(&state, request_id, format_tag, uri.query()).await
        }
    }
}

async fn handle_query(
    state: &AppState,
    request_id: Uuid,
    format_tag: &str,
    raw_query: Option<&str>,
) -> Response {
    let params = parse_query_string(raw_query);

    let request = match state.translator.translate(format_tag, &params) {
        Ok(request) => request,
        Err(TranslateError::UnknownFormat(tag)) => {
            tracing::debug!(request_id = %request_id, format = %tag, "Unknown query type");
            metrics::record_request(Outcome::UnknownFormat);
            return diagnostic(UNKNOWN_QUERY_TYPE);
        }
        Err(TranslateError::UnknownUser { format }) => {
            tracing::debug!(request_id = %request_id, format = %format, "Unknown user");
            metrics::record_request(Outcome::UnknownUser);
            return format.formatter().error_response(UNKNOWN_USER_MESSAGE);
        }
    };

    let formatter = request.format().formatter();
    match state.relay.relay(&request).await {
        Ok(body) => {
            tracing::debug!(
                request_id = %request_id,
                format = %request.format(),
                identity = %request.identity(),
                "Relaying backend response"
            );
            metrics::record_request(Outcome::Relayed);
            formatter.response(body)
        }
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Backend unavailable");
            metrics::record_request(Outcome::BackendUnavailable);
            formatter.error_response(CONNECT_ERROR_MESSAGE)
        }
    }
}
