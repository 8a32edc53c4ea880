//! Single-document conversion pipeline
//!
//! normalize → sanitize → convert → cleanup

use crate::cleanup::cleanup;
use crate::converter::{ConversionOptions, MarkdownConverter};
use crate::error::ConversionError;
use crate::normalizer::normalize;
use crate::parser::decode_html;
use crate::sanitizer::DocumentSanitizer;

/// Convert one reference page to cleaned-up Markdown
///
/// ```rust
/// use apidocs_markdown_converter::converter::ConversionOptions;
/// use apidocs_markdown_converter::pipeline::convert_document;
///
/// let html = "<html><head><title>T</title></head><body>\
///             <div class=\"header-wrapper\">Menu</div>\
///             <h1>Vector3</h1><p>Representation of 3D vectors.</p></body></html>";
/// let markdown = convert_document(html, &ConversionOptions::default()).expect("converts");
/// assert_eq!(markdown, "# Vector3\n\nRepresentation of 3D vectors.\n");
/// ```
pub fn convert_document(html: &str, options: &ConversionOptions) -> Result<String, ConversionError> {
    let _span = tracing::debug_span!("convert_document", bytes = html.len()).entered();

    let normalized = normalize(html);
    let converter = MarkdownConverter::with_options(options.clone());
    let markdown = if options.sanitize {
        let sanitized =
            DocumentSanitizer::with_rules(options.sanitizer_rules.clone()).sanitize(&normalized)?;
        converter.convert_html(&sanitized)?
    } else {
        converter.convert_html(&normalized)?
    };
    let cleaned = cleanup(&markdown);

    tracing::debug!(
        raw_len = markdown.len(),
        cleaned_len = cleaned.len(),
        "document converted"
    );
    Ok(cleaned)
}

/// Like [`convert_document`], for raw bytes of unknown encoding
///
/// `content_type` is an optional Content-Type style charset hint.
pub fn convert_bytes(
    html: &[u8],
    content_type: Option<&str>,
    options: &ConversionOptions,
) -> Result<String, ConversionError> {
    if html.is_empty() {
        return Err(ConversionError::MalformedFragment(
            "HTML input is empty".to_string(),
        ));
    }
    let text = decode_html(html, content_type)?;
    convert_document(&text, options)
}
