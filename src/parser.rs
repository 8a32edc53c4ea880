//! HTML5 parser using html5ever
//!
//! This module turns raw reference pages into the owned [`HtmlDocument`]
//! tree the converter walks.
//!
//! # Overview
//!
//! Parsing uses html5ever, which implements the WHATWG HTML5 parsing
//! algorithm, so unclosed and misnested tags in generated pages are repaired
//! the same way a browser would repair them. The resulting `RcDom` is then
//! snapshotted into plain owned nodes: comments, doctypes and processing
//! instructions are dropped, element names are lower-cased.
//!
//! Note that html5ever inserts implied elements (`html`, `head`, `body`,
//! `tbody`), so even a bare fragment comes back wrapped in a document.
//!
//! # Examples
//!
//! ```rust
//! use apidocs_markdown_converter::parser::parse_document;
//!
//! let doc = parse_document("<h1>Hello</h1>").expect("parses");
//! let html = doc.html_element().expect("html5ever adds <html>");
//! assert_eq!(html.child_element("body").map(|b| b.children.len()), Some(1));
//! ```
//!
//! # Malformed input
//!
//! html5ever never rejects markup, so "does not parse" means the input is not
//! HTML at all: it is empty, contains NUL bytes (binary content), or cannot
//! be decoded with its detected charset. All three surface as
//! [`ConversionError::MalformedFragment`].

use html5ever::parse_document as parse_rcdom;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use std::borrow::Cow;
use std::collections::BTreeMap;

use crate::charset::detect_charset;
use crate::dom::{Element, HtmlDocument, HtmlNode};
use crate::error::ConversionError;

/// Parse HTML text into an owned document tree
///
/// # Errors
///
/// Returns `ConversionError::MalformedFragment` if the input is blank or
/// contains NUL characters.
pub fn parse_document(html: &str) -> Result<HtmlDocument, ConversionError> {
    let dom = parse_dom(html)?;

    let children = dom
        .document
        .children
        .borrow()
        .iter()
        .filter_map(snapshot)
        .collect();

    Ok(HtmlDocument { children })
}

/// Parse HTML text into html5ever's mutable `RcDom`
///
/// Callers that rewrite and re-serialize markup (the sanitizer) work on
/// this tree; the converter uses the owned snapshot from
/// [`parse_document`].
pub fn parse_dom(html: &str) -> Result<RcDom, ConversionError> {
    if html.trim().is_empty() {
        return Err(ConversionError::MalformedFragment(
            "HTML input is empty".to_string(),
        ));
    }

    if let Some(position) = html.find('\0') {
        return Err(ConversionError::MalformedFragment(format!(
            "NUL character at byte position {} (binary input?)",
            position
        )));
    }

    Ok(parse_rcdom(RcDom::default(), Default::default()).one(html))
}

/// Decode raw document bytes to UTF-8 text using the detected charset
///
/// Charset resolution follows a three-level cascade:
///
/// 1. the charset parameter of `content_type`, when given;
/// 2. a `<meta charset>` or `<meta http-equiv="Content-Type">` tag;
/// 3. UTF-8.
///
/// A leading UTF-8 byte order mark is dropped.
///
/// # Errors
///
/// `ConversionError::MalformedFragment` when the bytes are invalid for the
/// detected charset, or the charset is unsupported.
pub fn decode_html(html: &[u8], content_type: Option<&str>) -> Result<String, ConversionError> {
    let detected_charset = detect_charset(content_type, html);
    let decoded = decode_html_to_utf8(html, &detected_charset)?;
    Ok(decoded
        .strip_prefix('\u{feff}')
        .unwrap_or(&decoded)
        .to_string())
}

fn decode_html_to_utf8<'a>(
    html: &'a [u8],
    detected_charset: &str,
) -> Result<Cow<'a, str>, ConversionError> {
    if detected_charset.eq_ignore_ascii_case("UTF-8") {
        return std::str::from_utf8(html).map(Cow::Borrowed).map_err(|e| {
            ConversionError::MalformedFragment(format!(
                "Invalid UTF-8 at byte position {}: {} (detected charset: {})",
                e.valid_up_to(),
                e,
                detected_charset
            ))
        });
    }

    let encoding =
        encoding_rs::Encoding::for_label(detected_charset.as_bytes()).ok_or_else(|| {
            ConversionError::MalformedFragment(format!(
                "Unsupported charset '{}' for HTML parsing",
                detected_charset
            ))
        })?;

    encoding
        .decode_without_bom_handling_and_without_replacement(html)
        .ok_or_else(|| {
            ConversionError::MalformedFragment(format!(
                "Invalid byte sequence for charset '{}'",
                detected_charset
            ))
        })
}

/// Copy one rcdom node (and its subtree) into an owned node
fn snapshot(handle: &Handle) -> Option<HtmlNode> {
    match handle.data {
        NodeData::Element {
            ref name,
            ref attrs,
            ..
        } => {
            let attrs: BTreeMap<String, String> = attrs
                .borrow()
                .iter()
                .map(|attr| {
                    let value: &str = &attr.value;
                    (
                        attr.name.local.to_ascii_lowercase().to_string(),
                        value.to_string(),
                    )
                })
                .collect();

            let children = handle
                .children
                .borrow()
                .iter()
                .filter_map(snapshot)
                .collect();

            Some(HtmlNode::Element(Element {
                name: name.local.to_ascii_lowercase().to_string(),
                attrs,
                children,
            }))
        }
        NodeData::Text { ref contents } => {
            let text: &str = &contents.borrow();
            Some(HtmlNode::Text(text.to_string()))
        }
        NodeData::Document
        | NodeData::Comment { .. }
        | NodeData::Doctype { .. }
        | NodeData::ProcessingInstruction { .. } => None,
    }
}
