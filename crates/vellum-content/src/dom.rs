//! Abstract HTML tree: tag name, attribute list, children.
//!
//! The parser is tolerant, not validating: unclosed elements are closed at
//! the end of their parent, stray closing tags are dropped, a bare `<` that
//! does not open a tag stays text. It never fails and never loses text,
//! which is the contract the sanitizer builds on.

use smol_str::SmolStr;

/// Element names that never have children on the wire.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// One node of an HTML fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HtmlNode {
    Element(Element),
    Text(String),
}

impl HtmlNode {
    /// Concatenated text content of this subtree.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(std::slice::from_ref(self), &mut out);
        out
    }
}

/// An element: lowercased name, attributes in source order, children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: SmolStr,
    pub attrs: Vec<(SmolStr, String)>,
    pub children: Vec<HtmlNode>,
}

impl Element {
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// First value of the named attribute, if present.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_void(&self) -> bool {
        VOID_ELEMENTS.contains(&self.name.as_str())
    }
}

/// Concatenated text content of a node list.
pub fn text_content(nodes: &[HtmlNode]) -> String {
    let mut out = String::new();
    collect_text(nodes, &mut out);
    out
}

fn collect_text(nodes: &[HtmlNode], out: &mut String) {
    for node in nodes {
        match node {
            HtmlNode::Text(text) => out.push_str(text),
            HtmlNode::Element(el) => collect_text(&el.children, out),
        }
    }
}

/// Parse an HTML fragment into a node list.
pub fn parse(html: &str) -> Vec<HtmlNode> {
    Parser::new(html).run()
}

/// Serialize a node list back to HTML, escaping text and attribute values.
pub fn serialize(nodes: &[HtmlNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        write_node(&mut out, node);
    }
    out
}

fn write_node(out: &mut String, node: &HtmlNode) {
    match node {
        HtmlNode::Text(text) => {
            out.push_str(&html_escape::encode_text(text));
        }
        HtmlNode::Element(el) => {
            out.push('<');
            out.push_str(&el.name);
            for (name, value) in &el.attrs {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                out.push_str(&html_escape::encode_double_quoted_attribute(value));
                out.push('"');
            }
            out.push('>');
            if el.is_void() {
                return;
            }
            for child in &el.children {
                write_node(out, child);
            }
            out.push_str("</");
            out.push_str(&el.name);
            out.push('>');
        }
    }
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    roots: Vec<HtmlNode>,
    stack: Vec<Element>,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            roots: Vec::new(),
            stack: Vec::new(),
        }
    }

    fn run(mut self) -> Vec<HtmlNode> {
        let bytes = self.src.as_bytes();
        let mut text_start = 0;
        while self.pos < bytes.len() {
            if bytes[self.pos] != b'<' {
                self.pos += 1;
                continue;
            }
            match bytes.get(self.pos + 1).copied() {
                Some(b'/') => {
                    self.flush_text(text_start);
                    self.closing_tag();
                    text_start = self.pos;
                }
                Some(b'!') | Some(b'?') => {
                    self.flush_text(text_start);
                    self.comment_or_decl();
                    text_start = self.pos;
                }
                Some(c) if c.is_ascii_alphabetic() => {
                    self.flush_text(text_start);
                    self.opening_tag();
                    text_start = self.pos;
                }
                // A lone '<' is text, not a tag.
                _ => self.pos += 1,
            }
        }
        self.flush_text(text_start);
        while let Some(el) = self.stack.pop() {
            self.attach(el);
        }
        self.roots
    }

    fn flush_text(&mut self, start: usize) {
        if start >= self.pos {
            return;
        }
        let raw = &self.src[start..self.pos];
        let decoded = html_escape::decode_html_entities(raw).into_owned();
        self.push_node(HtmlNode::Text(decoded));
    }

    /// `</name ...>` — pops the stack to the matching open element, closing
    /// anything left open inside it. Unmatched closers are dropped.
    fn closing_tag(&mut self) {
        self.pos += 2;
        let name = self.read_name();
        self.skip_until(b'>');
        if name.is_empty() {
            return;
        }
        if let Some(depth) = self.stack.iter().rposition(|el| el.name == name) {
            while self.stack.len() > depth {
                if let Some(el) = self.stack.pop() {
                    self.attach(el);
                }
            }
        }
    }

    fn comment_or_decl(&mut self) {
        if self.src[self.pos..].starts_with("<!--") {
            match self.src[self.pos + 4..].find("-->") {
                Some(end) => self.pos += 4 + end + 3,
                None => self.pos = self.src.len(),
            }
        } else {
            self.pos += 1;
            self.skip_until(b'>');
        }
    }

    fn opening_tag(&mut self) {
        self.pos += 1;
        let name = self.read_name();
        let mut element = Element::new(name);
        let self_closed = self.read_attrs(&mut element);
        if self_closed || element.is_void() {
            self.attach(element);
        } else {
            self.stack.push(element);
        }
    }

    /// Attributes up to the closing `>`. Returns true for `/>`.
    fn read_attrs(&mut self, element: &mut Element) -> bool {
        let bytes = self.src.as_bytes();
        loop {
            self.skip_whitespace();
            match bytes.get(self.pos).copied() {
                None => return false,
                Some(b'>') => {
                    self.pos += 1;
                    return false;
                }
                Some(b'/') => {
                    self.pos += 1;
                    if bytes.get(self.pos) == Some(&b'>') {
                        self.pos += 1;
                        return true;
                    }
                }
                Some(_) => {
                    let name = self.read_attr_name();
                    if name.is_empty() {
                        self.pos += 1;
                        continue;
                    }
                    self.skip_whitespace();
                    let value = if bytes.get(self.pos) == Some(&b'=') {
                        self.pos += 1;
                        self.skip_whitespace();
                        self.read_attr_value()
                    } else {
                        String::new()
                    };
                    element.attrs.push((name, value));
                }
            }
        }
    }

    fn read_name(&mut self) -> SmolStr {
        let start = self.pos;
        let bytes = self.src.as_bytes();
        while bytes
            .get(self.pos)
            .is_some_and(|c| c.is_ascii_alphanumeric())
        {
            self.pos += 1;
        }
        SmolStr::new(self.src[start..self.pos].to_ascii_lowercase())
    }

    fn read_attr_name(&mut self) -> SmolStr {
        let start = self.pos;
        let bytes = self.src.as_bytes();
        while bytes
            .get(self.pos)
            .is_some_and(|&c| !c.is_ascii_whitespace() && !matches!(c, b'=' | b'>' | b'/'))
        {
            self.pos += 1;
        }
        SmolStr::new(self.src[start..self.pos].to_ascii_lowercase())
    }

    fn read_attr_value(&mut self) -> String {
        let bytes = self.src.as_bytes();
        match bytes.get(self.pos).copied() {
            Some(quote @ (b'"' | b'\'')) => {
                self.pos += 1;
                let start = self.pos;
                while bytes.get(self.pos).is_some_and(|&c| c != quote) {
                    self.pos += 1;
                }
                let raw = &self.src[start..self.pos];
                if self.pos < bytes.len() {
                    self.pos += 1;
                }
                html_escape::decode_html_entities(raw).into_owned()
            }
            _ => {
                let start = self.pos;
                while bytes
                    .get(self.pos)
                    .is_some_and(|c| !c.is_ascii_whitespace() && *c != b'>')
                {
                    self.pos += 1;
                }
                html_escape::decode_html_entities(&self.src[start..self.pos]).into_owned()
            }
        }
    }

    fn skip_whitespace(&mut self) {
        let bytes = self.src.as_bytes();
        while bytes.get(self.pos).is_some_and(|c| c.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn skip_until(&mut self, stop: u8) {
        let bytes = self.src.as_bytes();
        while bytes.get(self.pos).is_some_and(|&c| c != stop) {
            self.pos += 1;
        }
        if self.pos < bytes.len() {
            self.pos += 1;
        }
    }

    fn push_node(&mut self, node: HtmlNode) {
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.roots.push(node),
        }
    }

    fn attach(&mut self, el: Element) {
        self.push_node(HtmlNode::Element(el));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_nested_elements() {
        let nodes = parse("<p>a<strong>b</strong></p>");
        assert_eq!(nodes.len(), 1);
        let HtmlNode::Element(p) = &nodes[0] else {
            panic!("expected element");
        };
        assert_eq!(p.name, "p");
        assert_eq!(p.children.len(), 2);
        assert_eq!(text_content(&nodes), "ab");
    }

    #[test]
    fn test_parse_attributes() {
        let nodes = parse(r#"<a href="https://example.com" target=_blank data-x='1'>x</a>"#);
        let HtmlNode::Element(a) = &nodes[0] else {
            panic!("expected element");
        };
        assert_eq!(a.attr("href"), Some("https://example.com"));
        assert_eq!(a.attr("target"), Some("_blank"));
        assert_eq!(a.attr("data-x"), Some("1"));
    }

    #[test]
    fn test_unclosed_elements_close_at_end() {
        let nodes = parse("<p>a<b>b");
        assert_eq!(serialize(&nodes), "<p>a<b>b</b></p>");
    }

    #[test]
    fn test_stray_closing_tag_is_dropped() {
        let nodes = parse("a</div>b");
        assert_eq!(serialize(&nodes), "ab");
    }

    #[test]
    fn test_void_elements_take_no_children() {
        let nodes = parse("<p>a<br>b</p>");
        assert_eq!(serialize(&nodes), "<p>a<br>b</p>");
    }

    #[test]
    fn test_lone_angle_bracket_is_text() {
        let nodes = parse("a < b");
        assert_eq!(nodes, vec![HtmlNode::Text("a < b".into())]);
        assert_eq!(serialize(&nodes), "a &lt; b");
    }

    #[test]
    fn test_entities_decode_and_reencode() {
        let nodes = parse("<p>a &amp; b</p>");
        assert_eq!(text_content(&nodes), "a & b");
        assert_eq!(serialize(&nodes), "<p>a &amp; b</p>");
    }

    #[test]
    fn test_comments_are_skipped() {
        let nodes = parse("a<!-- hidden -->b");
        assert_eq!(text_content(&nodes), "ab");
    }

    #[test]
    fn test_tag_names_are_lowercased() {
        let nodes = parse("<DIV><Span>x</SPAN></div>");
        assert_eq!(serialize(&nodes), "<div><span>x</span></div>");
    }

    #[test]
    fn test_interleaved_close_recovers() {
        // </i> closes both <b> and <i>; the stray </b> is dropped.
        let nodes = parse("<i>a<b>b</i>c</b>");
        assert_eq!(text_content(&nodes), "abc");
    }
}
