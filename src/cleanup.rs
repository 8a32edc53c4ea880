//! Post-pass cleanup of converted Markdown
//!
//! The tree converter emits block separators generously and leaves layout
//! fragments behind; this pass normalizes the result with ordered regex
//! rewrites:
//!
//! 1. leftover `<div …>` / `</div>` markup outside code is removed,
//!    together with a line break directly around an opening tag;
//! 2. trailing spaces and tabs are stripped from every line;
//! 3. runs of two or more line breaks collapse to one blank line;
//! 4. blank lines at the start of the document are removed;
//! 5. `&lt;` / `&gt;` inside code spans and fenced blocks become literal
//!    angle brackets;
//! 6. trailing blank lines are trimmed and the document ends with exactly
//!    one `\n`.
//!
//! Code segments are found by their backticks alone, which no step adds or
//! removes, so a second run sees the same segments and leaves the text
//! alone: markup restored inside code is never taken for a leftover tag.
//! Prose keeps the entities; Markdown renders them as brackets. Step 1
//! runs first so the blank lines a removed tag leaves behind are still
//! collapsed by step 3.
//!
//! ```rust
//! use apidocs_markdown_converter::cleanup::cleanup;
//!
//! let markdown = "\n\n# Title  \n\n\n\n`List&lt;T&gt;`\n\n\n";
//! assert_eq!(cleanup(markdown), "# Title\n\n`List<T>`\n");
//! ```

use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;

static DIV_MARKUP_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
static TRAILING_WHITESPACE_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
static BLANK_LINES_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
static LEADING_BLANK_LINES_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
static CODE_SEGMENT_REGEX: OnceLock<Option<Regex>> = OnceLock::new();

/// Replace with the cached regex for `pattern`; text passes through if it failed to compile
fn replace_all<'a>(
    cell: &'static OnceLock<Option<Regex>>,
    pattern: &str,
    text: &'a str,
    replacement: &str,
) -> Cow<'a, str> {
    match cell.get_or_init(|| Regex::new(pattern).ok()) {
        Some(regex) => regex.replace_all(text, replacement),
        None => Cow::Borrowed(text),
    }
}

/// Rewrite prose and code of `text` separately
///
/// Code is a fenced block or an inline code span. If the segment regex
/// failed to compile the whole text is prose.
fn rewrite_segments(
    text: &str,
    prose: impl Fn(&str) -> String,
    code: impl Fn(&str) -> String,
) -> String {
    let Some(regex) = CODE_SEGMENT_REGEX
        .get_or_init(|| Regex::new(r"(?s)```.*?```|`[^`\n]*`").ok())
        .as_ref()
    else {
        return prose(text);
    };

    let mut output = String::with_capacity(text.len());
    let mut last = 0;
    for segment in regex.find_iter(text) {
        output.push_str(&prose(&text[last..segment.start()]));
        output.push_str(&code(segment.as_str()));
        last = segment.end();
    }
    output.push_str(&prose(&text[last..]));
    output
}

fn remove_div_markup(prose: &str) -> String {
    replace_all(
        &DIV_MARKUP_REGEX,
        r#"(\r?\n?[ \t]*<div[ \w="-]+>\r?\n?)|(</?div>)"#,
        prose,
        "",
    )
    .into_owned()
}

fn unescape_angle_brackets(code: &str) -> String {
    code.replace("&lt;", "<").replace("&gt;", ">")
}

/// Normalize converted Markdown
///
/// Running `cleanup` on its own output returns the same string.
pub fn cleanup(markdown: &str) -> String {
    let text = rewrite_segments(markdown, remove_div_markup, str::to_string);
    let text = replace_all(&TRAILING_WHITESPACE_REGEX, r"(?m)[ \t]+\r?$", &text, "");
    let text = replace_all(&BLANK_LINES_REGEX, r"(\r?\n){2,}", &text, "\n\n");
    let text = replace_all(
        &LEADING_BLANK_LINES_REGEX,
        r"\A([ \t]*\r?\n)+",
        &text,
        "",
    );
    let text = rewrite_segments(&text, str::to_string, unescape_angle_brackets);

    let body = text.trim_end();
    if body.is_empty() {
        return String::new();
    }

    let mut output = String::with_capacity(body.len() + 1);
    output.push_str(body);
    output.push('\n');
    output
}
