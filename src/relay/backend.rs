//! TCP round-trip to the backend query engine.
//!
//! # Responsibilities
//! - Dial a fresh connection per request
//! - Write the encoded frame once
//! - Stream every byte the backend returns into the response body
//!
//! # Design Decisions
//! - No pooling, retries or timeouts: a slow backend holds the request open
//! - The backend response is not parsed or buffered; EOF or a read error
//!   ends the body
//! - A failed frame write is logged and the response is still relayed

use axum::body::Body;
use futures_util::{future, StreamExt};
use std::convert::Infallible;
use std::time::Instant;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio_util::io::ReaderStream;

use crate::observability::metrics;
use crate::query::QueryRequest;
use crate::relay::frame::WireFrame;
use crate::relay::session::{SessionGuard, SessionTracker};

/// Message placed in the client's error envelope when dialing fails.
pub const CONNECT_ERROR_MESSAGE: &str = "Error connecting to backend";

/// Errors that can occur while relaying to the backend.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Error connecting to backend {address}: {source}")]
    Connect {
        address: String,
        #[source]
        source: std::io::Error,
    },
}

/// Opens one backend session per request.
#[derive(Debug, Clone)]
pub struct BackendRelay {
    address: String,
    verbose: bool,
    sessions: SessionTracker,
}

impl BackendRelay {
    pub fn new(address: impl Into<String>, verbose: bool) -> Self {
        Self {
            address: address.into(),
            verbose,
            sessions: SessionTracker::new(),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn sessions(&self) -> &SessionTracker {
        &self.sessions
    }

    /// Dial the backend.
    pub async fn connect(&self) -> Result<BackendSession, RelayError> {
        let start = Instant::now();
        let stream = TcpStream::connect(self.address.as_str()).await.map_err(|source| {
            metrics::record_connect_failure();
            RelayError::Connect {
                address: self.address.clone(),
                source,
            }
        })?;
        metrics::record_connect_duration(start);

        let guard = self.sessions.track();
        tracing::debug!(
            session_id = %guard.id(),
            backend = %self.address,
            "Backend session opened"
        );
        Ok(BackendSession { stream, guard })
    }

    /// Send `request` and return a body streaming the backend's reply.
    pub async fn relay(&self, request: &QueryRequest) -> Result<Body, RelayError> {
        let frame = WireFrame::encode(request);
        let mut session = self.connect().await?;

        if let Err(e) = session.send(&frame).await {
            tracing::warn!(
                session_id = %session.guard.id(),
                error = %e,
                "Failed to write query frame"
            );
        }
        if self.verbose {
            tracing::info!(session_id = %session.guard.id(), "{}", frame.message());
        }

        Ok(session.into_body())
    }
}

/// One exclusively owned backend connection.
#[derive(Debug)]
pub struct BackendSession {
    stream: TcpStream,
    guard: SessionGuard,
}

impl BackendSession {
    /// Write the whole frame.
    pub async fn send(&mut self, frame: &WireFrame) -> std::io::Result<()> {
        self.stream.write_all(frame.as_bytes()).await?;
        self.stream.flush().await
    }

    /// Stream the backend's bytes until it closes or a read fails. Dropping
    /// the body closes the connection.
    pub fn into_body(self) -> Body {
        let Self { stream, guard } = self;
        let chunks = ReaderStream::new(stream).scan(guard, |guard, chunk| {
            future::ready(match chunk {
                Ok(bytes) => {
                    guard.add_bytes(bytes.len());
                    Some(bytes)
                }
                Err(e) => {
                    tracing::debug!(session_id = %guard.id(), error = %e, "Backend read failed");
                    None
                }
            })
        });
        Body::from_stream(chunks.map(Ok::<_, Infallible>))
    }
}
