//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Validated config → Load identities → Metrics → Bind listener
//!
//! Shutdown (shutdown.rs):
//!     Ctrl+C or Shutdown::trigger → stop accepting → drain in-flight → exit
//! ```

pub mod shutdown;
pub mod startup;

pub use shutdown::{Shutdown, ShutdownSignal};
pub use startup::{prepare, Startup, StartupError};
