//! Owned, immutable HTML tree
//!
//! html5ever builds a reference-counted `RcDom` with interior mutability.
//! The converter never needs shared or mutable nodes, so the parser
//! snapshots that tree into plain owned values: each node exclusively owns
//! its children, there are no parent links and nothing is mutated after
//! parsing. Parent context (needed for text-node emission) is passed down
//! the recursion instead.

use std::collections::BTreeMap;

/// A node of the parsed document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HtmlNode {
    Element(Element),
    Text(String),
}

/// An element with its attributes and children in document order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    /// Lower-cased local tag name
    pub name: String,
    pub attrs: BTreeMap<String, String>,
    pub children: Vec<HtmlNode>,
}

/// A parsed document: the ordered top-level nodes below the document root
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HtmlDocument {
    pub children: Vec<HtmlNode>,
}

impl HtmlNode {
    /// Shorthand for an element node without attributes
    pub fn element(name: &str, children: Vec<HtmlNode>) -> Self {
        HtmlNode::Element(Element::new(name, children))
    }

    /// Shorthand for a text node
    pub fn text(data: &str) -> Self {
        HtmlNode::Text(data.to_string())
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            HtmlNode::Element(element) => Some(element),
            HtmlNode::Text(_) => None,
        }
    }

    fn collect_text(&self, output: &mut String, breaks_as_newlines: bool) {
        match self {
            HtmlNode::Text(data) => output.push_str(data),
            HtmlNode::Element(element) => {
                if breaks_as_newlines && element.name == "br" {
                    output.push('\n');
                    return;
                }
                for child in &element.children {
                    child.collect_text(output, breaks_as_newlines);
                }
            }
        }
    }
}

impl Element {
    pub fn new(name: &str, children: Vec<HtmlNode>) -> Self {
        Self {
            name: name.to_string(),
            attrs: BTreeMap::new(),
            children,
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// Direct element children
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(HtmlNode::as_element)
    }

    /// First direct child element with the given tag
    pub fn child_element(&self, tag: &str) -> Option<&Element> {
        self.child_elements().find(|child| child.name == tag)
    }

    /// All descendant elements with the given tag, in document order
    pub fn descendants(&self, tag: &str) -> Vec<&Element> {
        let mut found = Vec::new();
        self.collect_descendants(tag, &mut found);
        found
    }

    fn collect_descendants<'a>(&'a self, tag: &str, found: &mut Vec<&'a Element>) {
        for child in self.child_elements() {
            if child.name == tag {
                found.push(child);
            }
            child.collect_descendants(tag, found);
        }
    }

    pub fn has_element_children(&self) -> bool {
        self.child_elements().next().is_some()
    }

    /// Concatenated text of all descendants
    pub fn inner_text(&self) -> String {
        let mut output = String::new();
        for child in &self.children {
            child.collect_text(&mut output, false);
        }
        output
    }

    /// Like [`Element::inner_text`], but every `<br>` reads as `\n`
    pub fn inner_text_with_breaks(&self) -> String {
        let mut output = String::new();
        for child in &self.children {
            child.collect_text(&mut output, true);
        }
        output
    }
}

impl HtmlDocument {
    /// The top-level `<html>` element, if the document has one
    pub fn html_element(&self) -> Option<&Element> {
        self.children
            .iter()
            .filter_map(HtmlNode::as_element)
            .find(|element| element.name == "html")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Element {
        Element::new(
            "table",
            vec![
                HtmlNode::element(
                    "thead",
                    vec![HtmlNode::element(
                        "tr",
                        vec![HtmlNode::element("th", vec![HtmlNode::text("H")])],
                    )],
                ),
                HtmlNode::element(
                    "tbody",
                    vec![HtmlNode::element(
                        "tr",
                        vec![
                            HtmlNode::element("td", vec![HtmlNode::text("a")]),
                            HtmlNode::element("td", vec![HtmlNode::text("b")]),
                        ],
                    )],
                ),
            ],
        )
    }

    #[test]
    fn test_descendants_in_document_order() {
        let table = sample();
        let cells: Vec<String> = table.descendants("td").iter().map(|td| td.inner_text()).collect();
        assert_eq!(cells, vec!["a", "b"]);
        assert_eq!(table.descendants("tr").len(), 2);
    }

    #[test]
    fn test_child_element_only_looks_at_direct_children() {
        let table = sample();
        assert!(table.child_element("thead").is_some());
        assert!(table.child_element("tr").is_none());
    }

    #[test]
    fn test_inner_text_concatenates_descendants() {
        assert_eq!(sample().inner_text(), "Hab");
    }

    #[test]
    fn test_inner_text_with_breaks() {
        let pre = Element::new(
            "pre",
            vec![
                HtmlNode::text("a;"),
                HtmlNode::element("br", vec![]),
                HtmlNode::text("b;"),
            ],
        );
        assert_eq!(pre.inner_text(), "a;b;");
        assert_eq!(pre.inner_text_with_breaks(), "a;\nb;");
    }
}
