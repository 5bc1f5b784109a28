//! Output formats and error envelopes.
//!
//! # Responsibilities
//! - Map the output-format tag from the path to a response format
//! - Pick the Content-Type for that format
//! - Render error envelopes in that format
//!
//! # Design Decisions
//! - Error messages are written into envelopes unescaped. A message with a
//!   `"` or `<` produces malformed JSON/XML; all messages used today are fixed
//!   ASCII literals.
//! - Every response is sent with the default 200 status

use axum::{
    body::Body,
    http::{header, HeaderValue},
    response::Response,
};

/// Sent when the path names no known action.
pub const UNKNOWN_ACTION: &str = "Unknown action\n";
/// Sent when the query path names no known output format.
pub const UNKNOWN_QUERY_TYPE: &str = "Unknown query type\n";

/// Output format requested by the client (`/query/<tag>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Json,
    Sjson,
    Xml,
}

impl OutputFormat {
    /// Used when the path has no format segment.
    pub const DEFAULT_TAG: &'static str = "json";

    /// Parse a format tag. Unknown tags return `None`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "json" => Some(Self::Json),
            "sjson" => Some(Self::Sjson),
            "xml" => Some(Self::Xml),
            _ => None,
        }
    }

    /// The tag as it is forwarded to the backend.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Sjson => "sjson",
            Self::Xml => "xml",
        }
    }

    /// Formatter used for responses in this format.
    pub fn formatter(&self) -> ResponseFormatter {
        match self {
            Self::Json | Self::Sjson => ResponseFormatter::Json,
            Self::Xml => ResponseFormatter::Xml,
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// Renders content types and error envelopes for one response format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormatter {
    Json,
    Xml,
}

impl ResponseFormatter {
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Json => "application/json; charset=utf-8",
            Self::Xml => "text/xml; charset=utf-8",
        }
    }

    /// Error envelope body. The message is inserted verbatim.
    pub fn error_body(&self, message: &str) -> String {
        match self {
            Self::Json => format!("{{\"error\": \"{}\"}}", message),
            Self::Xml => format!("<error>{}</error>", message),
        }
    }

    /// Build a response with this format's Content-Type and the given body.
    pub fn response(&self, body: Body) -> Response {
        let mut response = Response::new(body);
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(self.content_type()),
        );
        response
    }

    /// Error envelope response.
    pub fn error_response(&self, message: &str) -> Response {
        self.response(Body::from(self.error_body(message)))
    }
}

/// Plain diagnostic body without any Content-Type header.
pub fn diagnostic(message: &'static str) -> Response {
    Response::new(Body::from(message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_parse() {
        assert_eq!(OutputFormat::from_tag("json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_tag("sjson"), Some(OutputFormat::Sjson));
        assert_eq!(OutputFormat::from_tag("xml"), Some(OutputFormat::Xml));
        assert_eq!(OutputFormat::from_tag("XML"), None);
        assert_eq!(OutputFormat::from_tag("yaml"), None);
    }

    #[test]
    fn sjson_uses_json_formatter() {
        assert_eq!(OutputFormat::Sjson.formatter(), ResponseFormatter::Json);
        assert_eq!(OutputFormat::Sjson.tag(), "sjson");
    }

    #[test]
    fn envelopes() {
        assert_eq!(
            ResponseFormatter::Json.error_body("Unknown User"),
            r#"{"error": "Unknown User"}"#
        );
        assert_eq!(
            ResponseFormatter::Xml.error_body("Unknown User"),
            "<error>Unknown User</error>"
        );
    }

    #[test]
    fn envelope_message_is_not_escaped() {
        assert_eq!(
            ResponseFormatter::Xml.error_body("a<b"),
            "<error>a<b</error>"
        );
        assert_eq!(
            ResponseFormatter::Json.error_body("say \"hi\""),
            "{\"error\": \"say \"hi\"\"}"
        );
    }

    #[test]
    fn error_response_sets_content_type() {
        let response = ResponseFormatter::Xml.error_response("Unknown User");
        assert_eq!(response.status(), axum::http::StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/xml; charset=utf-8"
        );
    }

    #[test]
    fn diagnostic_has_no_content_type() {
        let response = diagnostic(UNKNOWN_ACTION);
        assert!(response.headers().get(header::CONTENT_TYPE).is_none());
    }
}
