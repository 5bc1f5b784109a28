//! Backend relay subsystem.
//!
//! # Data Flow
//! ```text
//! QueryRequest
//!     → frame.rs (XML-escaped <query> element + terminator)
//!     → backend.rs (dial, write frame)
//!     → session.rs (track connection until the body is done)
//!     → response body ← raw backend bytes until EOF
//! ```

pub mod backend;
pub mod frame;
pub mod session;

pub use backend::{BackendRelay, BackendSession, RelayError, CONNECT_ERROR_MESSAGE};
pub use frame::{escape_text, WireFrame};
pub use session::{SessionGuard, SessionId, SessionTracker};
