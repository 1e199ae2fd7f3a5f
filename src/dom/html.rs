//! HTML serialization of host trees.
//!
//! This is an inspection aid for tests, logs and debugging: it prints what
//! the in-memory tree currently holds. It is not a server-side renderer.
//! There is no hydration support, no streaming, and no guarantee that the
//! output round-trips through an HTML parser.

use super::node::{DomNode, Namespace};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track", "wbr",
];

/// Escape `& < > " ' /` for text or attribute output.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '/' => out.push_str("&#x2F;"),
            _ => out.push(ch),
        }
    }
    out
}

fn escape_text(input: &str) -> String {
    input.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn escape_attribute(input: &str) -> String {
    input.replace('&', "&amp;").replace('"', "&quot;")
}

/// Serialize a node and its subtree, for assertions and debug output.
pub fn outer_html(node: &DomNode) -> String {
    let mut out = String::new();
    write_node(node, &mut out);
    out
}

/// Serialize the children of a node, for assertions and debug output.
pub fn inner_html(node: &DomNode) -> String {
    let mut out = String::new();
    for child in node.children() {
        write_node(&child, &mut out);
    }
    out
}

fn write_node(node: &DomNode, out: &mut String) {
    if let Some(text) = node.with_text(escape_text) {
        out.push_str(&text);
        return;
    }

    let Some(tag) = node.tag_name() else { return };
    out.push('<');
    out.push_str(&tag);
    for (name, value) in node.attributes() {
        out.push(' ');
        out.push_str(&name);
        out.push_str("=\"");
        out.push_str(&escape_attribute(&value));
        out.push('"');
    }

    let children = node.children();
    let is_html = node.namespace() == Some(Namespace::Html);
    if is_html && VOID_ELEMENTS.contains(&tag.as_str()) {
        out.push('>');
        return;
    }
    if !is_html && children.is_empty() {
        out.push_str("/>");
        return;
    }

    out.push('>');
    for child in &children {
        write_node(child, out);
    }
    out.push_str("</");
    out.push_str(&tag);
    out.push('>');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html(r#"<a href="x">'&'</a>"#), "&lt;a href=&quot;x&quot;&gt;&#x27;&amp;&#x27;&lt;&#x2F;a&gt;");
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_outer_html() {
        let div = DomNode::element("div");
        div.set_attribute("class", "a\"b").unwrap();
        div.append_child(&DomNode::text("1 < 2")).unwrap();
        div.append_child(&DomNode::element("br")).unwrap();

        assert_eq!(outer_html(&div), "<div class=\"a&quot;b\">1 &lt; 2<br></div>");
        assert_eq!(inner_html(&div), "1 &lt; 2<br>");
    }

    #[test]
    fn test_svg_self_closes() {
        let svg = DomNode::element_ns(Namespace::Svg, "svg");
        svg.append_child(&DomNode::element_ns(Namespace::Svg, "circle")).unwrap();
        assert_eq!(outer_html(&svg), "<svg><circle/></svg>");
    }
}
