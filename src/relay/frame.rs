//! Backend wire frame encoding.
//!
//! ```text
//! <query name="value" ...>escaped query text</query>\r\n.\r\n
//! ```
//!
//! Attribute values and the query text are XML-escaped. Attributes come
//! from a hash map, so their order differs between runs; consumers must not
//! compare frames byte for byte.

use std::collections::HashMap;

use crate::query::QueryRequest;

/// Two-line sentinel that ends every frame.
pub const TERMINATOR: &str = "\r\n.\r\n";
/// Attribute carrying the resolved identity.
pub const IDENTITY_ATTRIBUTE: &str = "u";
/// Attribute carrying the output-format tag.
pub const FORMAT_ATTRIBUTE: &str = "ret";

/// One encoded backend message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireFrame {
    encoded: String,
}

impl WireFrame {
    /// Encode a request. The identity attribute overrides a client-supplied
    /// `u` parameter.
    pub fn encode(request: &QueryRequest) -> Self {
        let mut attributes: HashMap<&str, &str> = request
            .params()
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
            .collect();
        attributes.insert(FORMAT_ATTRIBUTE, request.format().tag());
        attributes.insert(IDENTITY_ATTRIBUTE, request.identity());

        let mut encoded = String::with_capacity(64 + request.query().len());
        encoded.push_str("<query");
        for (name, value) in &attributes {
            encoded.push(' ');
            encoded.push_str(name);
            encoded.push_str("=\"");
            escape_into(&mut encoded, value);
            encoded.push('"');
        }
        encoded.push('>');
        escape_into(&mut encoded, request.query());
        encoded.push_str("</query>");
        encoded.push_str(TERMINATOR);

        Self { encoded }
    }

    /// Full frame including the terminator.
    pub fn as_bytes(&self) -> &[u8] {
        self.encoded.as_bytes()
    }

    /// The `<query ...>...</query>` element without the terminator.
    pub fn message(&self) -> &str {
        &self.encoded[..self.encoded.len() - TERMINATOR.len()]
    }

    pub fn len(&self) -> usize {
        self.encoded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.encoded.is_empty()
    }
}

/// XML-escape `text` into `out`.
///
/// Markup characters and quotes become entities; tab, newline and carriage
/// return become character references so they survive attribute-value
/// normalization. Characters outside the XML character range are replaced
/// with U+FFFD.
pub fn escape_into(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\t' => out.push_str("&#x9;"),
            '\n' => out.push_str("&#xA;"),
            '\r' => out.push_str("&#xD;"),
            c if is_xml_char(c) => out.push(c),
            _ => out.push(char::REPLACEMENT_CHARACTER),
        }
    }
}

/// Convenience wrapper around [`escape_into`].
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    escape_into(&mut out, text);
    out
}

fn is_xml_char(c: char) -> bool {
    matches!(c, '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}')
}
