//! API-reference HTML to Markdown converter
//!
//! This library turns pages of generated API documentation (the
//! Unity-style scripting reference layout) into Markdown suitable for
//! static documentation hosting.
//!
//! # Architecture
//!
//! The library is structured into several modules:
//! - `normalizer`: collapses source-formatting whitespace
//! - `charset`: character encoding detection for pages read from disk
//! - `parser`: HTML5 parsing using html5ever into an owned tree (`dom`)
//! - `sanitizer`: removes template chrome (head, header, sidebar, footer)
//! - `converter`: recursive tree-to-Markdown conversion
//! - `cleanup`: regex post-pass over the converted Markdown
//! - `pipeline`: the four steps above for one document
//! - `batch`: parallel conversion of a directory of pages
//!
//! # Examples
//!
//! ```rust
//! use apidocs_markdown_converter::{convert_document, ConversionOptions};
//!
//! let markdown = convert_document(
//!     "<h2>Description</h2><p>Adds a force to the <a href=\"Rigidbody.html\">Rigidbody</a>.</p>",
//!     &ConversionOptions::default(),
//! )
//! .expect("Conversion failed");
//! assert_eq!(
//!     markdown,
//!     "## Description\n\nAdds a force to the [Rigidbody](Rigidbody.md \"Rigidbody\").\n"
//! );
//! ```

pub mod batch;
pub mod charset;
pub mod cleanup;
pub mod converter;
pub mod dom;
pub mod error;
pub mod normalizer;
pub mod parser;
pub mod pipeline;
pub mod sanitizer;

// Re-export main types for convenience
pub use batch::{BatchReport, FileFailure, convert_directory};
pub use converter::{ConversionOptions, ExclusionSet, MarkdownConverter};
pub use dom::{Element, HtmlDocument, HtmlNode};
pub use error::{BatchError, ConversionError};
pub use pipeline::convert_document;
pub use sanitizer::{DocumentSanitizer, RemovalRule};
