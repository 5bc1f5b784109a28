//! Barzer query gateway library.
//!
//! Accepts `/query[/<format>]` HTTP requests, authorizes them against a
//! preloaded key table, forwards them to the backend query engine as an
//! XML-framed TCP message and streams the raw reply back.

pub mod config;
pub mod http;
pub mod identity;
pub mod lifecycle;
pub mod observability;
pub mod query;
pub mod relay;
pub mod routing;

pub use config::GatewayConfig;
pub use http::GatewayServer;
pub use identity::IdentityTable;
pub use lifecycle::Shutdown;
