//! Inbound parameter validation and identity resolution.
//!
//! # Responsibilities
//! - Validate the output-format tag
//! - Whitelist query-string parameters
//! - Resolve `key` to an identity
//! - Produce a [`QueryRequest`] that is guaranteed to carry an identity
//!
//! # Design Decisions
//! - Only the first value of a repeated parameter is used
//! - Parameters are walked in hash-map order. When both `query` and `q` are
//!   given, whichever is visited last wins, so the winner is not stable
//!   across requests.
//! - Unlisted parameter names are dropped without comment

use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use crate::http::format::OutputFormat;
use crate::identity::IdentityTable;

/// Parameters passed through verbatim as backend attributes.
pub const PASSTHROUGH_PARAMS: [&str; 10] = [
    "now", "beni", "zurch", "flag", "route", "extra", "u", "uname", "byid", "zdtag",
];

/// Message placed in the error envelope when no `key` resolved.
pub const UNKNOWN_USER_MESSAGE: &str = "Unknown User";

/// Inbound query parameters, name → every value supplied.
pub type QueryParams = HashMap<String, Vec<String>>;

/// Decode a raw URL query string into [`QueryParams`].
pub fn parse_query_string(raw: Option<&str>) -> QueryParams {
    let mut params = QueryParams::new();
    if let Some(raw) = raw {
        for (name, value) in url::form_urlencoded::parse(raw.as_bytes()) {
            params
                .entry(name.into_owned())
                .or_default()
                .push(value.into_owned());
        }
    }
    params
}

/// Reasons a request is turned away before reaching the backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslateError {
    #[error("Unknown query type '{0}'")]
    UnknownFormat(String),

    #[error("{}", UNKNOWN_USER_MESSAGE)]
    UnknownUser { format: OutputFormat },
}

/// A validated request with a resolved identity, ready for the relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    format: OutputFormat,
    query: String,
    identity: String,
    params: HashMap<String, String>,
}

impl QueryRequest {
    pub(crate) fn new(
        format: OutputFormat,
        query: impl Into<String>,
        identity: impl Into<String>,
        params: HashMap<String, String>,
    ) -> Self {
        Self {
            format,
            query: query.into(),
            identity: identity.into(),
            params,
        }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Raw (unescaped) query text.
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Whitelisted parameters supplied by the client.
    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }
}

/// Turns inbound parameters into a [`QueryRequest`].
#[derive(Debug, Clone)]
pub struct QueryTranslator {
    identities: Arc<IdentityTable>,
}

impl QueryTranslator {
    pub fn new(identities: Arc<IdentityTable>) -> Self {
        Self { identities }
    }

    pub fn identities(&self) -> &IdentityTable {
        &self.identities
    }

    /// Validate `format_tag` and `params`.
    ///
    /// Fails with [`TranslateError::UnknownFormat`] for an unrecognized tag and
    /// with [`TranslateError::UnknownUser`] when no `key` resolved.
    pub fn translate(
        &self,
        format_tag: &str,
        params: &QueryParams,
    ) -> Result<QueryRequest, TranslateError> {
        let format = OutputFormat::from_tag(format_tag)
            .ok_or_else(|| TranslateError::UnknownFormat(format_tag.to_string()))?;

        let mut query = String::new();
        let mut identity = None;
        let mut passthrough = HashMap::new();

        for (name, values) in params {
            let Some(value) = values.first() else {
                continue;
            };
            match name.as_str() {
                "query" | "q" => query = value.clone(),
                "key" => {
                    if let Some(found) = self.identities.lookup(value) {
                        identity = Some(found.to_string());
                    }
                }
                "ver" => {}
                other if PASSTHROUGH_PARAMS.contains(&other) => {
                    passthrough.insert(other.to_string(), value.clone());
                }
                _ => {}
            }
        }

        let identity = identity.ok_or(TranslateError::UnknownUser { format })?;
        Ok(QueryRequest::new(format, query, identity, passthrough))
    }
}
