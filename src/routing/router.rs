//! Path-based action dispatch.
//!
//! # Responsibilities
//! - Split the request path into segments
//! - Select the action from the first segment
//! - Pull the raw output-format tag for the query action
//!
//! # Design Decisions
//! - Only `query` is an action; anything else is reported, not 404'd
//! - The format tag is not validated here; the translator owns that
//! - Segments after the format tag are ignored
//! - Paths are percent-decoded before splitting, so an encoded `/` acts as
//!   a separator

use std::borrow::Cow;

use percent_encoding::percent_decode_str;

use crate::http::format::OutputFormat;

/// Percent-decode a raw request path. Invalid UTF-8 is replaced lossily.
pub fn decode_path(raw: &str) -> Cow<'_, str> {
    percent_decode_str(raw).decode_utf8_lossy()
}

/// Action selected by the request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action<'a> {
    /// `/query[/<format>]` with the raw (unvalidated) format tag.
    Query { format_tag: &'a str },
    /// Any other path.
    Unknown,
}

/// Stateless request router.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestRouter;

impl RequestRouter {
    pub fn new() -> Self {
        Self
    }

    /// Resolve an action from a URL path such as `/query/xml`.
    pub fn route<'a>(&self, path: &'a str) -> Action<'a> {
        let path = path.strip_prefix('/').unwrap_or(path);
        let mut segments = path.split('/');

        match segments.next() {
            Some("query") => {
                let format_tag = match segments.next() {
                    Some(tag) if !tag.is_empty() => tag,
                    _ => OutputFormat::DEFAULT_TAG,
                };
                Action::Query { format_tag }
            }
            _ => Action::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_defaults_to_json() {
        let router = RequestRouter::new();
        assert_eq!(router.route("/query"), Action::Query { format_tag: "json" });
        assert_eq!(router.route("/query/"), Action::Query { format_tag: "json" });
    }

    #[test]
    fn query_with_format() {
        let router = RequestRouter::new();
        assert_eq!(router.route("/query/xml"), Action::Query { format_tag: "xml" });
        assert_eq!(router.route("/query/sjson/extra"), Action::Query { format_tag: "sjson" });
    }

    #[test]
    fn unknown_format_tag_passes_through() {
        let router = RequestRouter::new();
        assert_eq!(router.route("/query/csv"), Action::Query { format_tag: "csv" });
    }

    #[test]
    fn encoded_segments_are_decoded() {
        let router = RequestRouter::new();
        let path = decode_path("/query/%78ml");
        assert_eq!(router.route(&path), Action::Query { format_tag: "xml" });

        let path = decode_path("/%71uery");
        assert_eq!(router.route(&path), Action::Query { format_tag: "json" });

        let path = decode_path("/query%2Fsjson");
        assert_eq!(router.route(&path), Action::Query { format_tag: "sjson" });
    }

    #[test]
    fn plus_is_not_a_space_in_paths() {
        assert_eq!(decode_path("/query/a+b"), "/query/a+b");
    }

    #[test]
    fn other_actions_are_unknown() {
        let router = RequestRouter::new();
        assert_eq!(router.route("/"), Action::Unknown);
        assert_eq!(router.route("/status"), Action::Unknown);
        assert_eq!(router.route("/queryx"), Action::Unknown);
        assert_eq!(router.route("//query"), Action::Unknown);
    }
}
