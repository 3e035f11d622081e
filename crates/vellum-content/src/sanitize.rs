//! Ingestion sanitizer: strips presentation-only markup down to a minimal
//! vocabulary before externally-sourced HTML may touch the live value.
//!
//! Deletes structure and attributes, never text. Idempotent: one pass
//! leaves nothing a second pass would remove.

use smol_str::SmolStr;

use crate::dom::{self, Element, HtmlNode};

/// Attributes that survive sanitization; everything else is dropped.
const ALLOWED_ATTRS: &[&str] = &["href", "target"];

/// Elements removed while keeping their children.
const UNWRAPPED: &[&str] = &["div", "span", "u"];

/// Sanitize an HTML fragment.
pub fn sanitize(html: &str) -> String {
    dom::serialize(&sanitize_nodes(dom::parse(html)))
}

/// Tree form of [`sanitize`], for callers already holding parsed nodes.
pub fn sanitize_nodes(nodes: Vec<HtmlNode>) -> Vec<HtmlNode> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            HtmlNode::Text(text) => out.push(HtmlNode::Text(text)),
            HtmlNode::Element(el) => {
                // <font> becomes a bare <span>, which is itself on the
                // unwrap list, so only its children reach the output.
                let name: SmolStr = if el.name == "font" {
                    "span".into()
                } else {
                    el.name
                };
                let children = sanitize_nodes(el.children);
                if UNWRAPPED.contains(&name.as_str()) {
                    out.extend(children);
                } else {
                    let attrs = el
                        .attrs
                        .into_iter()
                        .filter(|(name, _)| ALLOWED_ATTRS.contains(&name.as_str()))
                        .collect();
                    out.push(HtmlNode::Element(Element {
                        name,
                        attrs,
                        children,
                    }));
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_strips_style_and_class() {
        let out = sanitize(r#"<span style="color:red" class="x">hi</span>"#);
        assert_eq!(out, "hi");
    }

    #[test]
    fn test_keeps_href_and_target_only() {
        let out = sanitize(r#"<a href="https://x.test" target="_blank" id="l" rel="nofollow">x</a>"#);
        assert_eq!(out, r#"<a href="https://x.test" target="_blank">x</a>"#);
    }

    #[test]
    fn test_font_reduces_to_children() {
        let out = sanitize(r#"<p><font face="Arial" color="red">styled</font></p>"#);
        assert_eq!(out, "<p>styled</p>");
    }

    #[test]
    fn test_unwraps_group_containers_and_underline() {
        let out = sanitize("<div><p>a</p><u>b</u></div>");
        assert_eq!(out, "<p>a</p>b");
    }

    #[test]
    fn test_deep_nesting_keeps_all_text() {
        let input = r#"<div><div><span class="a"><b style="x">one</b> two</span><ul><li><u>three</u></li></ul></div></div>"#;
        let out = sanitize(input);
        assert_eq!(out, "<b>one</b> two<ul><li>three</li></ul>");
        assert_eq!(
            dom::text_content(&dom::parse(&out)),
            dom::text_content(&dom::parse(input))
        );
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            r#"<span style="color:red" class="x">hi</span>"#,
            r#"<div><font size="3">a</font><p id="p">b<br>c</p></div>"#,
            "plain text",
            r#"<ul><li style="a">x</li><li>y &amp; z</li></ul>"#,
            "<p>a <u><b>b</b></u></p>",
        ];
        for input in inputs {
            let once = sanitize(input);
            assert_eq!(sanitize(&once), once, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn test_never_drops_text() {
        let inputs = [
            "<div>a<span>b<font>c</font></span>d</div>",
            "<p>keep <i>every</i> <u>word</u></p>",
            "<blockquote><div>nested</div></blockquote>",
        ];
        for input in inputs {
            assert_eq!(
                dom::text_content(&dom::parse(&sanitize(input))),
                dom::text_content(&dom::parse(input)),
                "text lost for {input:?}"
            );
        }
    }
}
