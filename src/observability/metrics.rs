//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total{outcome}` (counter): requests by how they ended
//! - `gateway_backend_connect_failures_total` (counter): failed dials
//! - `gateway_backend_connect_seconds` (histogram): dial latency
//! - `gateway_backend_sessions_active` (gauge): open backend connections
//! - `gateway_relayed_bytes_total` (counter): bytes streamed back to clients
//!
//! Without an installed recorder every call here is a no-op.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

pub const REQUESTS_TOTAL: &str = "gateway_requests_total";
pub const CONNECT_FAILURES_TOTAL: &str = "gateway_backend_connect_failures_total";
pub const CONNECT_DURATION: &str = "gateway_backend_connect_seconds";
pub const ACTIVE_SESSIONS: &str = "gateway_backend_sessions_active";
pub const RELAYED_BYTES_TOTAL: &str = "gateway_relayed_bytes_total";

/// How a request finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    UnknownAction,
    UnknownFormat,
    UnknownUser,
    BackendUnavailable,
    Relayed,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::UnknownAction => "unknown_action",
            Outcome::UnknownFormat => "unknown_format",
            Outcome::UnknownUser => "unknown_user",
            Outcome::BackendUnavailable => "backend_unavailable",
            Outcome::Relayed => "relayed",
        }
    }
}

/// Install the Prometheus recorder and its scrape endpoint on `addr`.
///
/// Must run inside a Tokio runtime. Failure is logged and the gateway keeps
/// serving without metrics.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => {
            describe_counter!(REQUESTS_TOTAL, "Total requests by outcome");
            describe_counter!(CONNECT_FAILURES_TOTAL, "Failed backend connection attempts");
            describe_histogram!(CONNECT_DURATION, "Backend connect latency in seconds");
            describe_gauge!(ACTIVE_SESSIONS, "Open backend sessions");
            describe_counter!(RELAYED_BYTES_TOTAL, "Bytes relayed from the backend");
            tracing::info!(address = %addr, "Prometheus metrics endpoint started");
        }
        Err(e) => {
            tracing::error!(address = %addr, error = %e, "Failed to start metrics endpoint");
        }
    }
}

pub fn record_request(outcome: Outcome) {
    counter!(REQUESTS_TOTAL, "outcome" => outcome.as_str()).increment(1);
}

pub fn record_connect_failure() {
    counter!(CONNECT_FAILURES_TOTAL).increment(1);
}

pub fn record_connect_duration(start: Instant) {
    histogram!(CONNECT_DURATION).record(start.elapsed().as_secs_f64());
}

pub fn record_active_sessions(count: u64) {
    gauge!(ACTIVE_SESSIONS).set(count as f64);
}

pub fn record_relayed_bytes(bytes: u64) {
    counter!(RELAYED_BYTES_TOTAL).increment(bytes);
}
