//! HTML fragment parsing using html5ever
//!
//! Post bodies scraped from the platform are fragments, not full documents,
//! so they are parsed in a `body` context. html5ever implements the WHATWG
//! HTML5 recovery algorithm: malformed markup yields a best-effort tree
//! instead of an error, which is exactly the degradation the translator
//! requires (unparseable input must become plain text, never a failure).
//!
//! # Examples
//!
//! ```rust
//! use jvcode::parser::parse_fragment;
//!
//! // Well-formed fragment
//! let dom = parse_fragment("<p>Hello</p>");
//!
//! // Malformed fragment (missing closing tag) parses too
//! let dom = parse_fragment("<p>Hello");
//! # let _ = dom;
//! ```

use html5ever::tendril::TendrilSink;
use html5ever::{local_name, namespace_url, ns, parse_fragment as html5_parse_fragment, QualName};
use markup5ever_rcdom::RcDom;

/// Parse an HTML fragment into a DOM tree
///
/// The fragment is parsed as if it were the content of a `<body>` element.
/// Parsing is infallible: the HTML5 algorithm recovers from unclosed tags,
/// misnesting and broken attributes, and an empty input produces an empty
/// tree.
///
/// The returned tree is freshly built and exclusively owned by the caller,
/// which is what makes the translator's in-place mutation passes safe.
pub fn parse_fragment(html: &str) -> RcDom {
    let context = QualName::new(None, ns!(html), local_name!("body"));
    html5_parse_fragment(RcDom::default(), Default::default(), context, Vec::new()).one(html)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{select_all, text_excluding, Selector};

    #[test]
    fn test_parse_simple_fragment() {
        let dom = parse_fragment("<p>Hello</p>");
        assert_eq!(select_all(&dom.document, &Selector::tag("p")).len(), 1);
    }

    #[test]
    fn test_parse_empty_fragment() {
        let dom = parse_fragment("");
        assert_eq!(text_excluding(&dom.document, &[]), "");
    }

    #[test]
    fn test_parse_malformed_fragment() {
        // Unclosed tag is auto-closed per the HTML5 recovery algorithm.
        let dom = parse_fragment("<p>Hello");
        assert_eq!(select_all(&dom.document, &Selector::tag("p")).len(), 1);
    }

    #[test]
    fn test_parse_bare_text() {
        let dom = parse_fragment("just text");
        assert_eq!(text_excluding(&dom.document, &[]), "just text");
    }

    #[test]
    fn test_parse_misnested_tags() {
        let dom = parse_fragment("<b><i>text</b></i>");
        assert_eq!(text_excluding(&dom.document, &[]), "text");
    }
}
