//! Plain-text promotion: turns pasted or host-supplied plain text into
//! minimal semantic markup (`<p>`, `<ul>`/`<li>`, `<br>`).

use std::sync::LazyLock;

use regex::Regex;

/// At least one thing resembling an opening tag: `<letter ...>`.
static OPEN_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[A-Za-z][^>]*>").expect("open-tag pattern"));

/// Leading bullet (`•`, `-`) or ordinal (`1.`) list marker.
static LIST_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:[•-]|\d+\.)\s*").expect("list-marker pattern"));

/// Heuristic markup detection.
///
/// True iff the text contains something shaped like an opening tag. This is
/// deliberately not a parser: prose containing a literal `<word>` is
/// misidentified as markup, and that imprecision is accepted.
pub fn looks_like_markup(text: &str) -> bool {
    OPEN_TAG.is_match(text)
}

/// Promote plain text to minimal HTML. Markup-looking input passes through
/// unchanged. Total: never fails, empty input yields an empty string.
///
/// Blank lines split paragraph groups. A single-line group becomes a
/// paragraph; a multi-line group becomes an unordered list when any line
/// carries a list marker (markers stripped), otherwise one paragraph with
/// line breaks.
pub fn promote(text: &str) -> String {
    if looks_like_markup(text) {
        return text.to_string();
    }
    let mut out = String::new();
    for group in paragraph_groups(text) {
        match group.as_slice() {
            [] => {}
            [line] => {
                out.push_str("<p>");
                push_escaped(&mut out, line);
                out.push_str("</p>");
            }
            lines if lines.iter().any(|line| LIST_MARKER.is_match(line)) => {
                out.push_str("<ul>");
                for line in lines {
                    out.push_str("<li>");
                    push_escaped(&mut out, &LIST_MARKER.replace(line, ""));
                    out.push_str("</li>");
                }
                out.push_str("</ul>");
            }
            lines => {
                out.push_str("<p>");
                for (i, line) in lines.iter().enumerate() {
                    if i > 0 {
                        out.push_str("<br>");
                    }
                    push_escaped(&mut out, line);
                }
                out.push_str("</p>");
            }
        }
    }
    out
}

/// Non-blank lines, grouped at blank-line boundaries.
fn paragraph_groups(text: &str) -> Vec<Vec<&str>> {
    let mut groups = Vec::new();
    let mut current = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                groups.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        groups.push(current);
    }
    groups
}

fn push_escaped(out: &mut String, text: &str) {
    out.push_str(&html_escape::encode_text(text));
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_input_is_empty_output() {
        assert_eq!(promote(""), "");
        assert_eq!(promote("\n\n  \n"), "");
    }

    #[test]
    fn test_single_line_becomes_paragraph() {
        assert_eq!(promote("hello world"), "<p>hello world</p>");
    }

    #[test]
    fn test_bullet_lines_become_list() {
        assert_eq!(
            promote("• foo\n• bar"),
            "<ul><li>foo</li><li>bar</li></ul>"
        );
    }

    #[test]
    fn test_hyphen_and_ordinal_markers() {
        assert_eq!(
            promote("- one\n2. two"),
            "<ul><li>one</li><li>two</li></ul>"
        );
    }

    #[test]
    fn test_plain_multiline_joins_with_breaks() {
        assert_eq!(promote("a\nb\nc"), "<p>a<br>b<br>c</p>");
    }

    #[test]
    fn test_blank_lines_split_paragraphs() {
        assert_eq!(
            promote("first\n\nsecond\nthird"),
            "<p>first</p><p>second<br>third</p>"
        );
    }

    #[test]
    fn test_markup_passes_through_unchanged() {
        let html = "<p>already html</p>";
        assert_eq!(promote(html), html);
    }

    #[test]
    fn test_literal_angle_text_is_escaped() {
        assert_eq!(promote("a < b"), "<p>a &lt; b</p>");
    }

    #[test]
    fn test_markup_heuristic() {
        assert!(looks_like_markup("see <div>"));
        assert!(looks_like_markup("<br/>"));
        assert!(!looks_like_markup("a < b"));
        assert!(!looks_like_markup("2 <3"));
        // The documented false positive: a literal word in angle brackets.
        assert!(looks_like_markup("type <word> here"));
    }

    #[test]
    fn test_output_vocabulary_is_minimal() {
        // Only <p>, <ul>/<li>, <br> ever appear for non-markup input.
        let produced = promote("• a\n• b\n\nline\n\nx\ny");
        let mut stripped = produced.clone();
        for tag in ["<p>", "</p>", "<ul>", "</ul>", "<li>", "</li>", "<br>"] {
            stripped = stripped.replace(tag, "");
        }
        assert!(!stripped.contains('<'), "unexpected tag in {produced:?}");
    }
}
