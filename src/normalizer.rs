//! Source whitespace normalization
//!
//! Generated reference pages are pretty-printed: tags are split across lines
//! and indented. Those newlines and indentation runs are not content, and
//! leaving them in place makes every later whitespace-sensitive rule
//! (text-node emission, cleanup regexes) depend on how the generator
//! formatted its output.
//!
//! Two passes run in this order:
//!
//! 1. A newline together with all whitespace around it is removed, joining
//!    tag boundaries that were split across source lines.
//! 2. Any remaining run of two or more whitespace characters becomes a
//!    single space.
//!
//! # Examples
//!
//! ```rust
//! use apidocs_markdown_converter::normalizer::normalize;
//!
//! let html = "<ul>\n    <li>Abc</li>\n    <li>Def   Ghi</li>\n</ul>";
//! assert_eq!(normalize(html), "<ul><li>Abc</li><li>Def Ghi</li></ul>");
//! ```

use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;

/// Normalize source whitespace in raw HTML
pub fn normalize(html: &str) -> String {
    static LINE_BREAK_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    static WHITESPACE_RUN_REGEX: OnceLock<Option<Regex>> = OnceLock::new();

    let line_breaks = LINE_BREAK_REGEX.get_or_init(|| Regex::new(r"\s*\n\s*").ok());
    let whitespace_runs = WHITESPACE_RUN_REGEX.get_or_init(|| Regex::new(r"\s{2,}").ok());

    let joined = match line_breaks {
        Some(regex) => regex.replace_all(html, ""),
        None => Cow::Borrowed(html),
    };

    match whitespace_runs {
        Some(regex) => regex.replace_all(&joined, " ").into_owned(),
        None => joined.into_owned(),
    }
}
