//! Markdown <-> HTML conversion behind a pluggable trait.
//!
//! The sync engine only sees [`ContentConverter`]; [`GfmConverter`] is the
//! default implementation, covering the GFM constructs the surface can
//! produce: headings, emphasis, strong, strikethrough, links, ordered and
//! unordered lists, task-list items, code, block quotes, thematic breaks.

use pulldown_cmark::{Options, Parser, html};

use crate::dom::{self, Element, HtmlNode};

/// Fallible, potentially slow conversion pair. Implementations may call
/// out of process; both directions are async for that reason.
#[trait_variant::make(Send)]
pub trait ContentConverter {
    /// Render Markdown to an HTML fragment.
    async fn markdown_to_html(&self, markdown: &str) -> Result<String, ConvertError>;

    /// Reduce an HTML fragment to Markdown.
    async fn html_to_markdown(&self, html: &str) -> Result<String, ConvertError>;
}

/// Errors from content conversion.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConvertError {
    /// Markdown -> HTML failed.
    #[error("markdown conversion failed: {0}")]
    Markdown(String),

    /// HTML -> Markdown failed.
    #[error("markup conversion failed: {0}")]
    Markup(String),
}

/// Built-in GFM converter: pulldown-cmark one way, a tree walk back.
#[derive(Debug, Clone, Copy, Default)]
pub struct GfmConverter;

impl GfmConverter {
    fn md_options() -> Options {
        Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TABLES | Options::ENABLE_TASKLISTS
    }
}

impl ContentConverter for GfmConverter {
    async fn markdown_to_html(&self, markdown: &str) -> Result<String, ConvertError> {
        let parser = Parser::new_ext(markdown, Self::md_options());
        let mut out = String::with_capacity(markdown.len() * 2);
        html::push_html(&mut out, parser);
        Ok(out)
    }

    async fn html_to_markdown(&self, html: &str) -> Result<String, ConvertError> {
        Ok(markdown_from_nodes(&dom::parse(html)))
    }
}

/// Reduce a parsed HTML fragment to Markdown text.
pub fn markdown_from_nodes(nodes: &[HtmlNode]) -> String {
    blocks_from_nodes(nodes).join("\n\n")
}

fn blocks_from_nodes(nodes: &[HtmlNode]) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut inline_run: Vec<&HtmlNode> = Vec::new();
    for node in nodes {
        match node {
            HtmlNode::Element(el) if is_block(el) => {
                flush_inline(&mut inline_run, &mut blocks);
                block_element(el, &mut blocks);
            }
            HtmlNode::Text(text) if text.trim().is_empty() && inline_run.is_empty() => {
                // Inter-block whitespace.
            }
            other => inline_run.push(other),
        }
    }
    flush_inline(&mut inline_run, &mut blocks);
    blocks
}

fn flush_inline(run: &mut Vec<&HtmlNode>, blocks: &mut Vec<String>) {
    if run.is_empty() {
        return;
    }
    let text = inline_text(run.drain(..));
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        blocks.push(trimmed.to_string());
    }
}

fn block_element(el: &Element, blocks: &mut Vec<String>) {
    match el.name.as_str() {
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let level = el.name.as_str()[1..].parse::<usize>().unwrap_or(1);
            blocks.push(format!(
                "{} {}",
                "#".repeat(level),
                inline_text(el.children.iter()).trim()
            ));
        }
        "p" => {
            let text = inline_text(el.children.iter());
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                blocks.push(trimmed.to_string());
            }
        }
        "ul" => blocks.push(list_items(&el.children, false, 0)),
        "ol" => blocks.push(list_items(&el.children, true, 0)),
        "pre" => {
            let code = dom::text_content(&el.children);
            blocks.push(format!("```\n{}```", ensure_trailing_newline(code)));
        }
        "blockquote" => {
            let inner = blocks_from_nodes(&el.children).join("\n\n");
            let quoted: Vec<String> = inner.lines().map(|line| format!("> {line}")).collect();
            blocks.push(quoted.join("\n"));
        }
        "hr" => blocks.push("---".to_string()),
        // Unknown block container: recurse into its children.
        _ => blocks.extend(blocks_from_nodes(&el.children)),
    }
}

fn list_items(children: &[HtmlNode], ordered: bool, depth: usize) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut ordinal = 1;
    for child in children {
        let HtmlNode::Element(li) = child else {
            continue;
        };
        if li.name != "li" {
            continue;
        }
        let mut nested: Vec<String> = Vec::new();
        let mut inline_nodes: Vec<&HtmlNode> = Vec::new();
        let mut checkbox = None;
        for item_child in &li.children {
            match item_child {
                HtmlNode::Element(el) if el.name == "ul" => {
                    nested.push(list_items(&el.children, false, depth + 1));
                }
                HtmlNode::Element(el) if el.name == "ol" => {
                    nested.push(list_items(&el.children, true, depth + 1));
                }
                HtmlNode::Element(el)
                    if el.name == "input" && el.attr("type") == Some("checkbox") =>
                {
                    checkbox = Some(el.attr("checked").is_some());
                }
                other => inline_nodes.push(other),
            }
        }
        let marker = if ordered {
            format!("{ordinal}. ")
        } else {
            "- ".to_string()
        };
        let check = match checkbox {
            Some(true) => "[x] ",
            Some(false) => "[ ] ",
            None => "",
        };
        let text = inline_text(inline_nodes.into_iter());
        lines.push(format!(
            "{}{marker}{check}{}",
            "  ".repeat(depth),
            text.trim()
        ));
        lines.extend(nested);
        ordinal += 1;
    }
    lines.join("\n")
}

fn inline_text<'a>(nodes: impl Iterator<Item = &'a HtmlNode>) -> String {
    let mut out = String::new();
    for node in nodes {
        inline_node(node, &mut out);
    }
    out
}

fn inline_node(node: &HtmlNode, out: &mut String) {
    match node {
        HtmlNode::Text(text) => out.push_str(text),
        HtmlNode::Element(el) => match el.name.as_str() {
            "strong" | "b" => wrap_inline(el, out, "**"),
            "em" | "i" => wrap_inline(el, out, "*"),
            "del" | "s" | "strike" => wrap_inline(el, out, "~~"),
            "code" => wrap_inline(el, out, "`"),
            "a" => {
                let text = inline_text(el.children.iter());
                match el.attr("href") {
                    Some(href) => {
                        out.push('[');
                        out.push_str(&text);
                        out.push_str("](");
                        out.push_str(href);
                        out.push(')');
                    }
                    None => out.push_str(&text),
                }
            }
            "br" => out.push('\n'),
            _ => {
                for child in &el.children {
                    inline_node(child, out);
                }
            }
        },
    }
}

fn wrap_inline(el: &Element, out: &mut String, delim: &str) {
    out.push_str(delim);
    out.push_str(&inline_text(el.children.iter()));
    out.push_str(delim);
}

fn is_block(el: &Element) -> bool {
    matches!(
        el.name.as_str(),
        "p" | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "ul"
            | "ol"
            | "li"
            | "pre"
            | "blockquote"
            | "hr"
            | "div"
            | "table"
    )
}

fn ensure_trailing_newline(mut code: String) -> String {
    if !code.ends_with('\n') {
        code.push('\n');
    }
    code
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    async fn roundtrip(markdown: &str) -> String {
        let converter = GfmConverter;
        let html = converter.markdown_to_html(markdown).await.unwrap();
        converter.html_to_markdown(&html).await.unwrap()
    }

    #[tokio::test]
    async fn test_markdown_to_html_heading_and_list() {
        let html = GfmConverter
            .markdown_to_html("# Hi\n\n- a\n- b")
            .await
            .unwrap();
        assert!(html.contains("<h1>Hi</h1>"));
        assert!(html.contains("<li>a</li>"));
        assert!(html.contains("<li>b</li>"));
    }

    #[tokio::test]
    async fn test_roundtrip_heading_and_list() {
        assert_eq!(roundtrip("# Hi\n\n- a\n- b").await, "# Hi\n\n- a\n- b");
    }

    #[tokio::test]
    async fn test_roundtrip_emphasis() {
        assert_eq!(roundtrip("**bold** and *italic*").await, "**bold** and *italic*");
    }

    #[tokio::test]
    async fn test_roundtrip_strikethrough() {
        assert_eq!(roundtrip("~~gone~~").await, "~~gone~~");
    }

    #[tokio::test]
    async fn test_roundtrip_link() {
        assert_eq!(
            roundtrip("[docs](https://example.com)").await,
            "[docs](https://example.com)"
        );
    }

    #[tokio::test]
    async fn test_roundtrip_ordered_list() {
        assert_eq!(roundtrip("1. one\n2. two").await, "1. one\n2. two");
    }

    #[tokio::test]
    async fn test_roundtrip_nested_list() {
        assert_eq!(roundtrip("- a\n  - b\n- c").await, "- a\n  - b\n- c");
    }

    #[tokio::test]
    async fn test_roundtrip_code_block() {
        assert_eq!(roundtrip("```\nlet x = 1;\n```").await, "```\nlet x = 1;\n```");
    }

    #[tokio::test]
    async fn test_roundtrip_blockquote() {
        assert_eq!(roundtrip("> quoted").await, "> quoted");
    }

    #[tokio::test]
    async fn test_html_with_breaks() {
        let md = GfmConverter
            .html_to_markdown("<p>a<br>b</p>")
            .await
            .unwrap();
        assert_eq!(md, "a\nb");
    }

    #[tokio::test]
    async fn test_promoted_fragment_converts() {
        let md = GfmConverter
            .html_to_markdown("<ul><li>foo</li><li>bar</li></ul>")
            .await
            .unwrap();
        assert_eq!(md, "- foo\n- bar");
    }

    #[tokio::test]
    async fn test_task_list_items() {
        let md = GfmConverter
            .html_to_markdown(r#"<ul><li><input type="checkbox" checked>done</li></ul>"#)
            .await
            .unwrap();
        assert_eq!(md, "- [x] done");
    }
}
