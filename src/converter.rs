//! Markdown converter - transforms the parsed tree into Markdown
//!
//! This module holds the recursive core of the conversion. Every element is
//! dispatched on its (lower-cased) tag name to a handler that returns the
//! element's Markdown as a string; parents concatenate their children's
//! output in document order.
//!
//! # Content tags
//!
//! Reference pages wrap everything in layout containers (`div`, `table`,
//! `tr`) whose direct text children are indentation and separators, not
//! prose. A text node is therefore only emitted when its parent is one of
//! the content tags: `p`, `ul`, `ol`, `h1`-`h6`, `b`, `i`, `img`, `pre`,
//! `code`, `a`, `td`, `th`, `li`.
//!
//! # Exclusion sets
//!
//! Some contexts may only produce inline output: anchor labels, paragraph
//! bodies, list-item lines, table cells, headings. Handlers for those
//! contexts derive an [`ExclusionSet`] (the parent's set plus their own
//! restriction) and pass it to the children. An excluded element converts
//! to nothing. Layout containers (`div`, `span`, `body`, `html`) pass their
//! parent's set through unchanged, so a restriction holds across wrappers.
//!
//! # Element handlers
//!
//! | Element | Output |
//! |---------|--------|
//! | `a` | `[text](href "title")`, `.html` targets rewritten to `.md` |
//! | `img` | `![alt](src "title")` |
//! | `b` / `i` / `code` | `**text**` / `_text_` / `` `text` `` |
//! | `br` | blank line |
//! | `p` | inline children, then a blank line |
//! | `ul` / `ol` | `*` / `1.` items, nested lists indented by two spaces |
//! | `table` | pipe table with a `---` divider row |
//! | `pre` | fenced code block with a fixed language tag |
//! | `h1`-`h6` | ATX heading |
//! | `div` / `body` / `html` / `span` | children |
//!
//! Everything else (`head`, `script`, `nav`, forms, unknown tags) is
//! dropped together with its subtree.
//!
//! # Escaped angle brackets
//!
//! Text taken from the document has `<` and `>` written as `&lt;` / `&gt;`
//! so that the cleanup regexes, which look for leftover markup, treat it as
//! inert. Markdown renders the entities as brackets in prose;
//! [`crate::cleanup::cleanup`] turns them back into literal brackets inside
//! code spans and fenced blocks, where entities would show verbatim.
//!
//! # Examples
//!
//! ```rust
//! use apidocs_markdown_converter::converter::MarkdownConverter;
//!
//! let converter = MarkdownConverter::new();
//! let markdown = converter
//!     .to_markdown("<p>See <a href=\"Transform.html\">Transform</a>.</p>")
//!     .expect("Conversion failed");
//! assert_eq!(markdown, "See [Transform](Transform.md \"Transform\").\n\n");
//! ```

use crate::dom::{Element, HtmlNode};
use crate::error::ConversionError;
use crate::normalizer::normalize;
use crate::parser::parse_document;
use crate::sanitizer::RemovalRule;
use regex::Regex;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::OnceLock;

/// Separator appended after block-level output
const BLANK_LINE: &str = "\n\n";

/// Tags whose direct text children are prose (headings are matched separately)
const CONTENT_TAGS: &[&str] = &[
    "p", "ul", "ol", "b", "i", "img", "pre", "code", "a", "td", "th", "li",
];

/// Tags suppressed in inline-only contexts (headings are matched separately)
const BLOCK_LEVEL_TAGS: &[&str] = &[
    "p", "ul", "ol", "table", "tr", "tbody", "thead", "th", "pre", "div", "span", "body", "html",
    "head", "header", "section", "footer",
];

/// Cell content of a header row may not carry these (plus headings)
const TABLE_HEADER_EXCLUDES: &[&str] = &["img", "p", "br", "pre"];

/// Cell content of a data row may not carry these (plus headings)
const TABLE_DATA_EXCLUDES: &[&str] = &["br", "p"];

/// Heading text may not carry these
const HEADING_EXCLUDES: &[&str] = &["img", "pre", "br"];

/// Conversion options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionOptions {
    /// Language tag written after the opening code fence
    pub code_language: String,
    /// Number of spaces each tab in a code block expands to
    pub tab_width: usize,
    /// Strip template chrome before converting
    pub sanitize: bool,
    /// Subtrees the sanitizer removes
    pub sanitizer_rules: Vec<RemovalRule>,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            code_language: "csharp".to_string(),
            tab_width: 5,
            sanitize: true,
            sanitizer_rules: RemovalRule::reference_docs_defaults(),
        }
    }
}

/// Tag names suppressed during one recursive conversion call
///
/// Sets are values: handlers derive new sets with [`ExclusionSet::union`]
/// and never modify the set they were given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet {
    tags: BTreeSet<String>,
    headings: bool,
}

impl ExclusionSet {
    /// The empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// A set holding exactly `tags`
    pub fn of(tags: &[&str]) -> Self {
        Self {
            tags: tags.iter().map(|tag| tag.to_string()).collect(),
            headings: false,
        }
    }

    /// The same set, also excluding every heading level
    pub fn with_headings(mut self) -> Self {
        self.headings = true;
        self
    }

    /// Everything that may not appear in an inline-only context
    pub fn block_level() -> Self {
        Self::of(BLOCK_LEVEL_TAGS).with_headings()
    }

    /// A new set containing the members of both sets
    pub fn union(&self, other: &ExclusionSet) -> ExclusionSet {
        ExclusionSet {
            tags: self.tags.union(&other.tags).cloned().collect(),
            headings: self.headings || other.headings,
        }
    }

    pub fn excludes(&self, tag: &str) -> bool {
        self.tags.contains(tag) || (self.headings && heading_level(tag).is_some())
    }

}

/// Heading level of an `h1`..`h6` tag name
pub fn heading_level(tag: &str) -> Option<usize> {
    static HEADING_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    let regex = HEADING_REGEX
        .get_or_init(|| Regex::new(r"^h([1-6])$").ok())
        .as_ref()?;

    regex
        .captures(tag)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Whether direct text children of `tag` are emitted
pub fn is_content_tag(tag: &str) -> bool {
    CONTENT_TAGS.contains(&tag) || heading_level(tag).is_some()
}

/// Rewrite a cross-document link target from `.html` to `.md`
///
/// Only a trailing `.html` is rewritten; everything else passes through,
/// which makes the rewrite idempotent.
///
/// ```rust
/// use apidocs_markdown_converter::converter::rewrite_link;
///
/// assert_eq!(rewrite_link("../Manual/index.html"), "../Manual/index.md");
/// assert_eq!(rewrite_link("index.md"), "index.md");
/// assert_eq!(rewrite_link("logo.png"), "logo.png");
/// ```
pub fn rewrite_link(target: &str) -> String {
    match target.strip_suffix(".html") {
        Some(stem) => format!("{}.md", stem),
        None => target.to_string(),
    }
}

/// Mark angle brackets in document text as inert entities
fn escape_angle_brackets(text: &str) -> String {
    text.replace('<', "&lt;").replace('>', "&gt;")
}

/// Terminate non-empty block output with a blank line
fn block(content: String) -> String {
    if content.is_empty() {
        content
    } else {
        content + BLANK_LINE
    }
}

fn expect_tag(element: &Element, expected: &'static str) -> Result<(), ConversionError> {
    if element.name == expected {
        Ok(())
    } else {
        Err(ConversionError::TagMismatch {
            expected,
            found: element.name.clone(),
        })
    }
}

/// Main Markdown converter
///
/// The converter holds only its options; each call works on its own tree,
/// so one instance can be shared across threads.
///
/// ```rust
/// use apidocs_markdown_converter::converter::{ConversionOptions, MarkdownConverter};
///
/// let converter = MarkdownConverter::with_options(ConversionOptions {
///     code_language: "js".to_string(),
///     ..Default::default()
/// });
/// let markdown = converter.to_markdown("<pre>let x = 1;</pre>").expect("Conversion failed");
/// assert_eq!(markdown, "```js\nlet x = 1;\n```\n\n");
/// ```
#[derive(Debug, Clone, Default)]
pub struct MarkdownConverter {
    options: ConversionOptions,
}

impl MarkdownConverter {
    /// Create a new converter with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new converter with custom options
    pub fn with_options(options: ConversionOptions) -> Self {
        Self { options }
    }

    /// Convert a whole HTML document
    ///
    /// Normalizes source whitespace, then hands over to
    /// [`MarkdownConverter::convert_html`]. No cleanup pass is applied here;
    /// see [`crate::pipeline::convert_document`] for the full pipeline.
    pub fn to_markdown(&self, html: &str) -> Result<String, ConversionError> {
        self.convert_html(&normalize(html))
    }

    /// Convert HTML whose whitespace is already normalized
    ///
    /// Parses, then converts each child of the `<html>` element (or of the
    /// document root when there is none) and concatenates the results.
    pub fn convert_html(&self, html: &str) -> Result<String, ConversionError> {
        let document = parse_document(html)?;

        let mut output = String::with_capacity(html.len() / 2);
        match document.html_element() {
            Some(root) => {
                let exclude = ExclusionSet::new();
                for child in &root.children {
                    output.push_str(&self.convert_node(child, Some(root.name.as_str()), &exclude)?);
                }
            }
            None => {
                for child in &document.children {
                    output.push_str(&self.convert_node(child, None, &ExclusionSet::new())?);
                }
            }
        }

        Ok(output)
    }

    /// Convert one node and its subtree
    ///
    /// A text node passed here has no parent and converts to an empty
    /// string.
    ///
    /// # Errors
    ///
    /// `ConversionError::StructuralViolation` when an element in the subtree
    /// has an empty tag name.
    pub fn convert(&self, node: &HtmlNode, exclude: &ExclusionSet) -> Result<String, ConversionError> {
        self.convert_node(node, None, exclude)
    }

    fn convert_node(
        &self,
        node: &HtmlNode,
        parent: Option<&str>,
        exclude: &ExclusionSet,
    ) -> Result<String, ConversionError> {
        match node {
            HtmlNode::Text(data) => {
                if parent.is_some_and(is_content_tag) {
                    let stripped: String = data.chars().filter(|c| *c != '\n' && *c != '\r').collect();
                    Ok(escape_angle_brackets(&stripped))
                } else {
                    Ok(String::new())
                }
            }
            HtmlNode::Element(element) => self.convert_element(element, exclude),
        }
    }

    fn convert_element(
        &self,
        element: &Element,
        exclude: &ExclusionSet,
    ) -> Result<String, ConversionError> {
        if element.name.trim().is_empty() {
            return Err(ConversionError::StructuralViolation(
                "element node without a tag name".to_string(),
            ));
        }

        if exclude.excludes(&element.name) {
            return Ok(String::new());
        }

        match element.name.as_str() {
            "a" => self.handle_anchor(element, exclude),
            "br" => Ok(BLANK_LINE.to_string()),
            "img" => self.handle_image(element),
            "b" => Ok(format!("**{}**", self.flattened_text(element))),
            "i" => Ok(format!("_{}_", self.flattened_text(element))),
            "code" => Ok(format!("`{}`", self.flattened_text(element))),
            "ol" | "ul" => Ok(block(self.handle_list(element, 0, exclude)?)),
            "p" => Ok(self.handle_paragraph(element, exclude)? + BLANK_LINE),
            "table" => Ok(block(self.handle_table(element, exclude)?)),
            "pre" => Ok(self.handle_code_block(element)? + BLANK_LINE),
            "div" | "body" | "html" => {
                let mut content = self.convert_children(element, exclude)?;
                if !content.trim().is_empty() && !content.ends_with(BLANK_LINE) {
                    if content.ends_with('\n') {
                        content.push('\n');
                    } else {
                        content.push_str(BLANK_LINE);
                    }
                }
                Ok(content)
            }
            "span" => self.convert_children(element, exclude),
            name if heading_level(name).is_some() => {
                Ok(self.handle_heading(element, exclude)? + BLANK_LINE)
            }
            _ => Ok(String::new()),
        }
    }

    /// Concatenate the converted children of `element` in document order
    fn convert_children(
        &self,
        element: &Element,
        exclude: &ExclusionSet,
    ) -> Result<String, ConversionError> {
        let mut output = String::new();
        for child in &element.children {
            output.push_str(&self.convert_node(child, Some(element.name.as_str()), exclude)?);
        }
        Ok(output)
    }

    fn flattened_text(&self, element: &Element) -> String {
        escape_angle_brackets(&element.inner_text())
    }

    fn handle_paragraph(
        &self,
        element: &Element,
        exclude: &ExclusionSet,
    ) -> Result<String, ConversionError> {
        expect_tag(element, "p")?;
        self.convert_children(element, &exclude.union(&ExclusionSet::block_level()))
    }

    /// Anchors render as `[text](href "title")`
    ///
    /// The label keeps inline formatting and images; an anchor without a
    /// visible label (icon placeholders, empty logo links) is dropped.
    fn handle_anchor(
        &self,
        element: &Element,
        exclude: &ExclusionSet,
    ) -> Result<String, ConversionError> {
        expect_tag(element, "a")?;

        let text = if element.has_element_children() {
            self.convert_children(element, &exclude.union(&ExclusionSet::block_level()))?
        } else {
            escape_angle_brackets(element.inner_text().trim())
        };

        if text.trim().is_empty() {
            return Ok(String::new());
        }

        let href = rewrite_link(element.attr("href").unwrap_or("#"));
        let title = match element.attr("title") {
            Some(title) => title.to_string(),
            None => escape_angle_brackets(element.inner_text().trim()),
        };

        Ok(format!("[{}]({} \"{}\")", text, href, title))
    }

    fn handle_image(&self, element: &Element) -> Result<String, ConversionError> {
        expect_tag(element, "img")?;

        let src = element.attr("src").unwrap_or("");
        let alt = match element.attr("alt") {
            Some(alt) => alt.to_string(),
            None => Path::new(src)
                .file_stem()
                .and_then(|stem| stem.to_str())
                .unwrap_or("")
                .to_string(),
        };
        let title = element.attr("title").map(str::to_string).unwrap_or_else(|| alt.clone());

        let title_segment = if title.is_empty() {
            String::new()
        } else {
            format!(" \"{}\"", title)
        };

        Ok(format!("![{}]({}{})", alt, rewrite_link(src), title_segment))
    }

    /// Lists render one line per item run, nested lists two spaces deeper
    ///
    /// `indent` is the number of spaces in front of this list's markers.
    fn handle_list(
        &self,
        element: &Element,
        indent: usize,
        exclude: &ExclusionSet,
    ) -> Result<String, ConversionError> {
        let ordered = match element.name.as_str() {
            "ol" => true,
            "ul" => false,
            _ => {
                return Err(ConversionError::TagMismatch {
                    expected: "ul",
                    found: element.name.clone(),
                });
            }
        };

        let mut items = Vec::new();
        for (index, item) in element.child_elements().filter(|c| c.name == "li").enumerate() {
            let marker = if ordered {
                format!("{}.", index + 1)
            } else {
                "*".to_string()
            };
            let converted = self.handle_list_item(item, &marker, indent, exclude)?;
            if !converted.is_empty() {
                items.push(converted);
            }
        }

        Ok(items.join("\n"))
    }

    /// Convert one `li`
    ///
    /// Consecutive non-list children form one inline run which becomes one
    /// marker line; nested lists are emitted as their own lines in place.
    fn handle_list_item(
        &self,
        element: &Element,
        marker: &str,
        indent: usize,
        exclude: &ExclusionSet,
    ) -> Result<String, ConversionError> {
        expect_tag(element, "li")?;

        let inline = exclude.union(&ExclusionSet::block_level());
        let prefix = " ".repeat(indent);
        let mut lines: Vec<String> = Vec::new();
        let mut run = String::new();

        let flush = |run: &mut String, lines: &mut Vec<String>| {
            let text = run.trim();
            if !text.is_empty() {
                lines.push(format!("{}{} {}", prefix, marker, text));
            }
            run.clear();
        };

        for child in &element.children {
            match child {
                HtmlNode::Element(nested) if nested.name == "ul" || nested.name == "ol" => {
                    flush(&mut run, &mut lines);
                    let converted = self.handle_list(nested, indent + 2, exclude)?;
                    if !converted.is_empty() {
                        lines.push(converted);
                    }
                }
                _ => run.push_str(&self.convert_node(child, Some(element.name.as_str()), &inline)?),
            }
        }
        flush(&mut run, &mut lines);

        Ok(lines.join("\n"))
    }

    /// Tables render as pipe tables
    ///
    /// Decorative tables (no rows, or no data cells at all) produce nothing.
    fn handle_table(
        &self,
        element: &Element,
        exclude: &ExclusionSet,
    ) -> Result<String, ConversionError> {
        expect_tag(element, "table")?;

        let rows = element.descendants("tr");
        if rows.is_empty() || element.descendants("td").is_empty() {
            return Ok(String::new());
        }

        let header_exclude = exclude.union(&ExclusionSet::of(TABLE_HEADER_EXCLUDES).with_headings());
        let header_scope = element.child_element("thead").unwrap_or(element);
        let mut headers = header_scope
            .descendants("th")
            .into_iter()
            .map(|cell| self.handle_table_cell(cell, "th", &header_exclude))
            .collect::<Result<Vec<_>, _>>()?;

        if headers.is_empty() {
            let columns = rows[0].child_elements().filter(|c| c.name == "td").count();
            headers = vec![String::new(); columns];
        }

        let mut lines = Vec::with_capacity(rows.len() + 2);
        lines.push(format!("| {} |", headers.join(" | ")));
        lines.push(format!(
            "| {} |",
            vec!["---"; headers.len()].join(" | ")
        ));

        let data_exclude = exclude.union(&ExclusionSet::of(TABLE_DATA_EXCLUDES).with_headings());
        let body_scope = element.child_element("tbody").unwrap_or(element);
        for row in body_scope.descendants("tr") {
            let cells = row.descendants("td");
            // Header-only rows that html5ever moved into the implied tbody
            if cells.is_empty() {
                continue;
            }
            let cells = cells
                .into_iter()
                .map(|cell| self.handle_table_cell(cell, "td", &data_exclude))
                .collect::<Result<Vec<_>, _>>()?;
            lines.push(format!("| {} |", cells.join(" | ")));
        }

        Ok(lines.join("\n"))
    }

    fn handle_table_cell(
        &self,
        element: &Element,
        expected: &'static str,
        exclude: &ExclusionSet,
    ) -> Result<String, ConversionError> {
        expect_tag(element, expected)?;
        Ok(self.convert_children(element, exclude)?.trim().to_string())
    }

    /// Code blocks render as fenced blocks
    ///
    /// Samples in reference pages use `<br>` for line breaks and wrap
    /// identifiers in links; only the text survives, with breaks as
    /// newlines.
    fn handle_code_block(&self, element: &Element) -> Result<String, ConversionError> {
        expect_tag(element, "pre")?;

        let text = element.inner_text_with_breaks();
        let text = text.trim().replace('\t', &" ".repeat(self.options.tab_width));

        Ok(format!(
            "```{}\n{}\n```",
            self.options.code_language,
            escape_angle_brackets(&text)
        ))
    }

    fn handle_heading(
        &self,
        element: &Element,
        exclude: &ExclusionSet,
    ) -> Result<String, ConversionError> {
        let level = heading_level(&element.name).ok_or_else(|| ConversionError::TagMismatch {
            expected: "h1",
            found: element.name.clone(),
        })?;

        let content = self.convert_children(element, &exclude.union(&ExclusionSet::of(HEADING_EXCLUDES)))?;
        Ok(format!("{} {}", "#".repeat(level), content))
    }
}
