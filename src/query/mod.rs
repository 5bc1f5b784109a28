//! Query translation subsystem.
//!
//! # Data Flow
//! ```text
//! format tag + raw query string
//!     → parse_query_string (name → values)
//!     → translator.rs (format check, whitelist, key lookup)
//!     → QueryRequest (always carries an identity)
//!     → relay
//! ```

pub mod translator;

pub use translator::{
    parse_query_string, QueryParams, QueryRequest, QueryTranslator, TranslateError,
    PASSTHROUGH_PARAMS, UNKNOWN_USER_MESSAGE,
};
