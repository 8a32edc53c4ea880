//! Character encoding detection for reference pages read from disk
//!
//! Generated documentation is usually UTF-8, but older doc sets were
//! written in a legacy code page and only say so in a meta tag. Detection
//! follows a three-level cascade:
//!
//! 1. **Explicit hint**: a Content-Type style value supplied by the caller
//!    (`text/html; charset=windows-1252`)
//! 2. **HTML meta tags**: `<meta charset>` or
//!    `<meta http-equiv="Content-Type" content="...; charset=...">` within
//!    the first kilobyte of the page
//! 3. **UTF-8** when neither says anything
//!
//! ```rust
//! use apidocs_markdown_converter::charset::detect_charset;
//!
//! assert_eq!(detect_charset(Some("text/html; charset=iso-8859-1"), b""), "ISO-8859-1");
//! assert_eq!(detect_charset(None, b"<meta charset=\"utf-8\">"), "UTF-8");
//! assert_eq!(detect_charset(None, b"<p>plain</p>"), "UTF-8");
//! ```

use regex::Regex;
use std::sync::OnceLock;

/// Default charset when detection fails
const DEFAULT_CHARSET: &str = "UTF-8";

/// Maximum bytes to scan for meta charset tags
const META_SCAN_LIMIT: usize = 1024;

/// Detect the character encoding of a page
///
/// The returned name is upper-cased (`"windows-1252"` becomes
/// `"WINDOWS-1252"`) and always non-empty.
pub fn detect_charset(content_type: Option<&str>, html: &[u8]) -> String {
    if let Some(ct) = content_type
        && let Some(charset) = charset_from_content_type(ct)
    {
        return charset.to_uppercase();
    }

    if let Some(charset) = charset_from_meta(html) {
        return charset.to_uppercase();
    }

    DEFAULT_CHARSET.to_string()
}

/// Charset parameter of a Content-Type value, quoted or not
fn charset_from_content_type(content_type: &str) -> Option<String> {
    static CHARSET_PARAM_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    let regex = CHARSET_PARAM_REGEX
        .get_or_init(|| Regex::new(r#"(?i)charset\s*=\s*"?([^";,\s]+)"?"#).ok())
        .as_ref()?;

    regex
        .captures(content_type)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Charset declared by a meta tag near the top of the page
fn charset_from_meta(html: &[u8]) -> Option<String> {
    static META_CHARSET_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    static META_HTTP_EQUIV_REGEX: OnceLock<Option<Regex>> = OnceLock::new();

    let prefix = &html[..html.len().min(META_SCAN_LIMIT)];
    // Lossy is fine: meta tags are ASCII.
    let prefix = String::from_utf8_lossy(prefix);

    let meta_charset = META_CHARSET_REGEX
        .get_or_init(|| Regex::new(r#"(?i)<meta\s+charset\s*=\s*"?([^";>\s]+)"?"#).ok())
        .as_ref()?;
    if let Some(m) = meta_charset.captures(&prefix).and_then(|caps| caps.get(1)) {
        return Some(m.as_str().to_string());
    }

    let http_equiv = META_HTTP_EQUIV_REGEX
        .get_or_init(|| {
            Regex::new(
                r#"(?i)<meta\s+http-equiv\s*=\s*"?Content-Type"?\s+content\s*=\s*"?[^">]*charset\s*=\s*([^";>\s]+)"?"#,
            )
            .ok()
        })
        .as_ref()?;
    http_equiv
        .captures(&prefix)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
