//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, tracing middleware)
//!     → routing (action from path)
//!     → query translator (format, whitelist, identity)
//!     → relay (backend round-trip)
//!     → format.rs (Content-Type, error envelopes)
//!     → Send to client
//! ```

pub mod format;
pub mod server;

pub use format::{OutputFormat, ResponseFormatter};
pub use server::{AppState, GatewayServer};
