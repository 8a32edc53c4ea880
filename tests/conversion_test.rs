//! End-to-end conversion tests
//!
//! Full pages go through normalize → sanitize → convert → cleanup via the
//! public API only.

use apidocs_markdown_converter::cleanup::cleanup;
use apidocs_markdown_converter::pipeline::convert_bytes;
use apidocs_markdown_converter::{
    ConversionError, ConversionOptions, DocumentSanitizer, MarkdownConverter, RemovalRule,
    convert_document,
};
use proptest::prelude::*;

/// A scripting-reference page with the full template chrome
const REFERENCE_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Unity - Scripting API: Rigidbody.AddForce</title>
</head>
<body>
  <div class="header-wrapper">
    <div id="header" class="header">
      <div class="content">
        <ul>
          <li><a href="../Manual/index.html">Manual</a></li>
        </ul>
      </div>
    </div>
  </div>
  <div id="sidebar"><ul><li><a href="Rigidbody.html">Rigidbody</a></li></ul></div>
  <div id="content-wrap" class="content-wrap">
    <div class="content-block">
      <div class="content">
        <div class="section">
          <div class="mb20 clear">
            <h1 class="heading inherit"><a href="Rigidbody.html">Rigidbody</a>.AddForce</h1>
            <div class="clear"></div>
            <div class="suggest"><a class="blue-btn sbtn">Suggest a change</a></div>
          </div>
          <div class="subsection">
            <h2>Parameters</h2>
            <table class="list">
              <tr><td class="name lbl">force</td><td class="desc">Force vector in world coordinates.</td></tr>
            </table>
          </div>
          <div class="subsection">
            <h2>Description</h2>
            <p>Adds a force to the <a href="Rigidbody.html">Rigidbody</a>.</p>
            <p>Force is applied continuously along the direction of the <code>force</code> vector.</p>
          </div>
          <div class="subsection">
            <pre class="codeExampleCS">using UnityEngine;<br /><br />public class Example : <a href="MonoBehaviour.html">MonoBehaviour</a><br />{<br /><a href="Rigidbody.html">Rigidbody</a> m_Rigidbody;<br />}</pre>
          </div>
          <div class="subsection">
            <ul><li>Mass is taken into account.</li><li>See also: <a href="ForceMode.html">ForceMode</a></li></ul>
          </div>
        </div>
        <div id="feedbackbox"><div class="scrollToFeedback">Leave feedback</div></div>
      </div>
    </div>
  </div>
  <div class="footer-wrapper"><p>Copyright 2024</p></div>
</body>
</html>"#;

const REFERENCE_MARKDOWN: &str = r#"# [Rigidbody](Rigidbody.md "Rigidbody").AddForce

## Parameters

|  |  |
| --- | --- |
| force | Force vector in world coordinates. |

## Description

Adds a force to the [Rigidbody](Rigidbody.md "Rigidbody").

Force is applied continuously along the direction of the `force` vector.

```csharp
using UnityEngine;

public class Example : MonoBehaviour
{
Rigidbody m_Rigidbody;
}
```

* Mass is taken into account.
* See also: [ForceMode](ForceMode.md "ForceMode")
"#;

#[test]
fn test_reference_page_converts_to_expected_markdown() {
    let markdown =
        convert_document(REFERENCE_PAGE, &ConversionOptions::default()).expect("Conversion failed");
    assert_eq!(markdown, REFERENCE_MARKDOWN);
}

#[test]
fn test_reference_page_chrome_is_gone() {
    let markdown =
        convert_document(REFERENCE_PAGE, &ConversionOptions::default()).expect("Conversion failed");
    for chrome in ["Manual", "Suggest a change", "Leave feedback", "Copyright", "Scripting API"] {
        assert!(!markdown.contains(chrome), "{chrome:?} leaked into output");
    }
}

#[test]
fn test_reference_page_without_sanitizer_keeps_chrome() {
    let options = ConversionOptions {
        sanitize: false,
        ..Default::default()
    };
    let markdown = convert_document(REFERENCE_PAGE, &options).expect("Conversion failed");
    assert!(markdown.starts_with("* [Manual](../Manual/index.md \"Manual\")\n"));
    assert!(markdown.contains("Copyright 2024"));
    // The head is never rendered, sanitized or not.
    assert!(!markdown.contains("Scripting API"));
}

#[test]
fn test_custom_rules_and_language() {
    let options = ConversionOptions {
        code_language: "cs".to_string(),
        sanitizer_rules: vec![RemovalRule::class("subsection")],
        ..Default::default()
    };
    let markdown = convert_document(REFERENCE_PAGE, &options).expect("Conversion failed");
    assert!(!markdown.contains("## Parameters"));
    assert!(!markdown.contains("```"));
    assert!(markdown.contains("Suggest a change"));
}

#[test]
fn test_nested_div_wrapper_with_list() {
    let html = "<div class=\"outer\">\n  <div>\n    <div>\n      <ul>\n        <li>Abc</li>\n        <li>Def</li>\n      </ul>\n    </div>\n  </div>\n</div>";
    let markdown = convert_document(html, &ConversionOptions::default()).expect("Conversion failed");
    assert_eq!(markdown, "* Abc\n* Def\n");
}

#[test]
fn test_converter_then_cleanup_matches_pipeline() {
    let html = "<h3>Properties</h3><table><thead><tr><th>Name</th><th>Description</th></tr></thead>\
                <tbody><tr><td><a href=\"Rigidbody-mass.html\">mass</a></td><td>The mass.</td></tr></tbody></table>";
    let sanitized = DocumentSanitizer::new().sanitize(html).expect("Sanitize failed");
    let raw = MarkdownConverter::new()
        .convert_html(&sanitized)
        .expect("Conversion failed");
    let expected = "### Properties\n\n| Name | Description |\n| --- | --- |\n| [mass](Rigidbody-mass.md \"mass\") | The mass. |\n";
    assert_eq!(cleanup(&raw), expected);
    assert_eq!(
        convert_document(html, &ConversionOptions::default()).expect("Conversion failed"),
        expected
    );
}

#[test]
fn test_generic_type_names_survive() {
    let html = "<p>Returns <code>List&lt;Vector3&gt;</code>.</p><pre>var list = new List&lt;int&gt;();</pre>";
    let markdown = convert_document(html, &ConversionOptions::default()).expect("Conversion failed");
    assert_eq!(
        markdown,
        "Returns `List<Vector3>`.\n\n```csharp\nvar list = new List<int>();\n```\n"
    );
}

#[test]
fn test_legacy_encoded_page() {
    let html = b"<html><head><meta http-equiv=\"Content-Type\" content=\"text/html; charset=windows-1252\"></head>\
                 <body><p>Na\xEFve \x93quotes\x94</p></body></html>";
    let markdown =
        convert_bytes(html, None, &ConversionOptions::default()).expect("Conversion failed");
    assert_eq!(markdown, "Na\u{ef}ve \u{201c}quotes\u{201d}\n");
}

#[test]
fn test_binary_input_is_malformed() {
    let result = convert_bytes(b"\x00\x01\x02PNG", None, &ConversionOptions::default());
    assert!(matches!(result, Err(ConversionError::MalformedFragment(_))));
}

proptest! {
    #[test]
    fn prop_pipeline_output_is_cleanup_fixed_point(
        paragraphs in prop::collection::vec("[A-Za-z][A-Za-z ]{0,30}", 1..5),
        depth in 0usize..4,
    ) {
        let body: String = paragraphs.iter().map(|p| format!("<p>{}</p>", p)).collect();
        let html = format!("{}{}{}", "<div>".repeat(depth), body, "</div>".repeat(depth));
        let markdown = convert_document(&html, &ConversionOptions::default())
            .expect("Conversion failed");
        prop_assert_eq!(cleanup(&markdown), markdown.clone());
        prop_assert!(!markdown.contains("\n\n\n"));
        prop_assert!(!markdown.starts_with('\n'));
    }

    #[test]
    fn prop_html_links_always_become_md_links(page in "[A-Z][A-Za-z]{0,12}(\\.[A-Z][A-Za-z]{0,8})?") {
        let html = format!("<p><a href=\"{0}.html\">{0}</a></p>", page);
        let markdown = convert_document(&html, &ConversionOptions::default())
            .expect("Conversion failed");
        prop_assert_eq!(markdown, format!("[{0}]({0}.md \"{0}\")\n", page));
    }
}
