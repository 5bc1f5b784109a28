//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout via tracing-subscriber fmt layer
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Logging is a side channel only; it never changes bytes on the wire
//! - Request IDs are attached to handler spans for correlation

pub mod logging;
pub mod metrics;

pub use logging::init_tracing;
