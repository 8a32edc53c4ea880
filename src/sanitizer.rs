//! Template chrome removal
//!
//! Generated reference pages wrap the documented member in site chrome:
//! the page head, a header bar with search, a sidebar table of contents,
//! feedback widgets and a footer. None of it belongs in the Markdown copy.
//! The sanitizer parses the page with html5ever, unlinks every subtree
//! matched by one of its [`RemovalRule`]s and serializes what is left back
//! to HTML with html5ever's serializer.
//!
//! The caller's markup is never modified; rules are applied to a freshly
//! parsed tree.
//!
//! ```rust
//! use apidocs_markdown_converter::sanitizer::DocumentSanitizer;
//!
//! let sanitizer = DocumentSanitizer::new();
//! let html = sanitizer
//!     .sanitize("<div id=\"sidebar\">toc</div><p>Body</p>")
//!     .expect("sanitizes");
//! assert!(html.contains("<p>Body</p>"));
//! assert!(!html.contains("toc"));
//! ```

use html5ever::Attribute;
use html5ever::serialize::{SerializeOpts, serialize};
use markup5ever_rcdom::{Handle, NodeData, SerializableHandle};

use crate::error::ConversionError;
use crate::parser::parse_dom;

/// A subtree selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemovalRule {
    /// Every element with this tag name
    Tag(String),
    /// Every element with this `id`
    Id(String),
    /// Every element whose class list contains this class
    Class(String),
}

impl RemovalRule {
    pub fn tag(name: &str) -> Self {
        RemovalRule::Tag(name.to_string())
    }

    pub fn id(id: &str) -> Self {
        RemovalRule::Id(id.to_string())
    }

    pub fn class(class: &str) -> Self {
        RemovalRule::Class(class.to_string())
    }

    /// Chrome of the Unity-style scripting reference template
    pub fn reference_docs_defaults() -> Vec<RemovalRule> {
        vec![
            RemovalRule::tag("head"),
            RemovalRule::class("header-wrapper"),
            RemovalRule::id("sidebar"),
            RemovalRule::id("feedbackbox"),
            RemovalRule::class("footer-wrapper"),
            RemovalRule::class("suggest"),
            RemovalRule::class("scrollToFeedback"),
        ]
    }

    /// Whether an element with this tag, `id` and `class` attribute is selected
    pub fn matches(&self, tag: &str, id: Option<&str>, classes: Option<&str>) -> bool {
        match self {
            RemovalRule::Tag(name) => tag.eq_ignore_ascii_case(name),
            RemovalRule::Id(wanted) => id == Some(wanted.as_str()),
            RemovalRule::Class(wanted) => {
                classes.is_some_and(|classes| classes.split_whitespace().any(|c| c == wanted))
            }
        }
    }
}

fn attribute<'a>(attrs: &'a [Attribute], name: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|attr| &*attr.name.local == name)
        .map(|attr| &*attr.value)
}

/// Removes template chrome from reference pages
#[derive(Debug, Clone)]
pub struct DocumentSanitizer {
    rules: Vec<RemovalRule>,
}

impl Default for DocumentSanitizer {
    fn default() -> Self {
        Self::with_rules(RemovalRule::reference_docs_defaults())
    }
}

impl DocumentSanitizer {
    /// Sanitizer with the reference-docs default rules
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(rules: Vec<RemovalRule>) -> Self {
        Self { rules }
    }

    /// Parse `html`, drop matching subtrees and serialize the rest
    ///
    /// Subtrees that are absent are simply not removed.
    ///
    /// # Errors
    ///
    /// `ConversionError::MalformedFragment` when `html` cannot be parsed
    /// (see [`crate::parser::parse_dom`]).
    pub fn sanitize(&self, html: &str) -> Result<String, ConversionError> {
        let dom = parse_dom(html)?;
        self.remove_matching(&dom.document);

        let mut bytes = Vec::with_capacity(html.len());
        let handle = SerializableHandle::from(dom.document.clone());
        serialize(&mut bytes, &handle, SerializeOpts::default()).map_err(|e| {
            ConversionError::StructuralViolation(format!("Failed to serialize sanitized tree: {}", e))
        })?;

        String::from_utf8(bytes).map_err(|e| {
            ConversionError::StructuralViolation(format!("Sanitized tree is not UTF-8: {}", e))
        })
    }

    fn remove_matching(&self, handle: &Handle) {
        handle.children.borrow_mut().retain(|child| !self.is_selected(child));
        for child in handle.children.borrow().iter() {
            self.remove_matching(child);
        }
    }

    fn is_selected(&self, handle: &Handle) -> bool {
        match handle.data {
            NodeData::Element {
                ref name,
                ref attrs,
                ..
            } => {
                let attrs = attrs.borrow();
                let id = attribute(&attrs, "id");
                let classes = attribute(&attrs, "class");
                self.rules
                    .iter()
                    .any(|rule| rule.matches(&name.local, id, classes))
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><head><title>Rigidbody</title></head><body>
<div class="header-wrapper"><div class="menu">Manual</div></div>
<div id="sidebar"><ul><li>Classes</li></ul></div>
<div class="content-wrap"><h1>Rigidbody</h1><p>Control of an object's position.</p>
<div class="suggest">Suggest a change</div>
<div id="feedbackbox">Was this helpful?</div>
<a class="scrollToFeedback btn" href="">Leave feedback</a></div>
<div class="footer-wrapper">Copyright</div></body></html>"#;

    #[test]
    fn test_default_rules_remove_chrome() {
        let html = DocumentSanitizer::new().sanitize(PAGE).expect("Sanitize failed");
        for chrome in [
            "<title>",
            "header-wrapper",
            "Classes",
            "Suggest a change",
            "Was this helpful?",
            "Leave feedback",
            "Copyright",
        ] {
            assert!(!html.contains(chrome), "{chrome:?} left in {html}");
        }
    }

    #[test]
    fn test_content_is_kept() {
        let html = DocumentSanitizer::new().sanitize(PAGE).expect("Sanitize failed");
        assert!(html.contains("<h1>Rigidbody</h1>"));
        assert!(html.contains("<p>Control of an object's position.</p>"));
        assert!(html.contains("class=\"content-wrap\""));
    }

    #[test]
    fn test_page_without_chrome_is_unchanged_apart_from_serialization() {
        let html = DocumentSanitizer::new()
            .sanitize("<div><div><ul><li>a</li></ul></div></div>")
            .expect("Sanitize failed");
        assert_eq!(
            html,
            "<html><body><div><div><ul><li>a</li></ul></div></div></body></html>"
        );
    }

    #[test]
    fn test_class_rule_matches_whole_class_tokens() {
        let sanitizer = DocumentSanitizer::with_rules(vec![RemovalRule::class("suggest")]);
        let html = sanitizer
            .sanitize("<div class=\"suggestion\">keep</div><div class=\"x suggest\">drop</div>")
            .expect("Sanitize failed");
        assert!(html.contains("keep"));
        assert!(!html.contains("drop"));
    }

    #[test]
    fn test_custom_rules_replace_defaults() {
        let sanitizer = DocumentSanitizer::with_rules(vec![RemovalRule::tag("nav")]);
        let html = sanitizer
            .sanitize("<nav>menu</nav><div id=\"sidebar\">toc</div>")
            .expect("Sanitize failed");
        assert!(!html.contains("menu"));
        assert!(html.contains("toc"));
    }

    #[test]
    fn test_rule_matching() {
        assert!(RemovalRule::tag("head").matches("head", None, None));
        assert!(RemovalRule::id("sidebar").matches("div", Some("sidebar"), None));
        assert!(!RemovalRule::id("sidebar").matches("div", Some("sidebar-2"), None));
        assert!(RemovalRule::class("footer-wrapper").matches("div", None, Some("dark footer-wrapper")));
        assert!(!RemovalRule::class("footer").matches("div", None, Some("footer-wrapper")));
    }

    #[test]
    fn test_text_is_reescaped_for_reparsing() {
        let html = DocumentSanitizer::new()
            .sanitize("<pre>List&lt;int&gt; a &amp;&amp; b</pre>")
            .expect("Sanitize failed");
        assert!(html.contains("<pre>List&lt;int&gt; a &amp;&amp; b</pre>"));
    }

    #[test]
    fn test_raw_text_elements_are_not_escaped() {
        let html = DocumentSanitizer::new()
            .sanitize("<body><style>a > b {}</style><script>if (a < b) {}</script><p>x</p></body>")
            .expect("Sanitize failed");
        assert!(html.contains("<style>a > b {}</style>"), "{html}");
        assert!(html.contains("<script>if (a < b) {}</script>"), "{html}");
        assert!(html.contains("<p>x</p>"));
    }

    #[test]
    fn test_void_elements_have_no_end_tag() {
        let html = DocumentSanitizer::new()
            .sanitize("<p>a<br>b<img src=\"x.png\" alt=\"say &quot;hi&quot;\"></p>")
            .expect("Sanitize failed");
        assert!(html.contains("<p>a<br>b<img src=\"x.png\" alt=\"say &quot;hi&quot;\"></p>"), "{html}");
    }

    #[test]
    fn test_empty_input_is_malformed() {
        assert!(matches!(
            DocumentSanitizer::new().sanitize(""),
            Err(ConversionError::MalformedFragment(_))
        ));
    }
}
