//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request path
//!     → decode_path (percent-decoding)
//!     → router.rs (segment split, action lookup)
//!     → Action::Query { format_tag } → query translator
//!     → Action::Unknown             → "Unknown action" diagnostic
//! ```

pub mod router;

pub use router::{decode_path, Action, RequestRouter};
