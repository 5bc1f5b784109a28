//! Identity subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (single task, before the listener serves):
//!     key file → table.rs (parse key|identity lines) → IdentityTable
//!
//! Per request:
//!     Arc<IdentityTable> → lookup(key) → Option<identity>
//! ```

pub mod table;

pub use table::{IdentityError, IdentityTable, DELIMITER};
