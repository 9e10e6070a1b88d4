//! DOM-to-string serialization
//!
//! `serialize` turns a subtree into an HTML string: it walks the root's
//! direct children in document order (first child, then next sibling) and
//! emits markup per node kind. The root's own tag is not emitted.
//!
//! Element children are rendered through `outer_html`, a recursive descent
//! over attributes and descendants with standard HTML escaping. Browsers
//! expose this as a host capability; with an owned tree we render it
//! ourselves.

use crate::arena::DomArena;
use crate::error::Result;
use crate::types::{DomNode, NodeId, NodeType};

/// Serialize the children of `root` to an HTML string.
///
/// Per-kind rules:
/// - Element: full outer markup including descendants
/// - Text: raw character data, unescaped
/// - CDATA section: `<![CDATA[` + data + `]]>`
/// - Comment: `<!--` + data + `-->`
/// - Document type: `<!DOCTYPE name ...>` plus a trailing newline
/// - Anything else: skipped silently
///
/// A root with no children yields the empty string. The walk never mutates
/// the tree; serializing an unchanged tree twice yields identical output.
pub fn serialize(arena: &DomArena, root: NodeId) -> Result<String> {
    let mut html = String::with_capacity(4096);

    let mut next = arena.first_child(root)?;
    while let Some(node_id) = next {
        let node = arena.get(node_id)?;
        match node.node_type {
            NodeType::Element => write_element(arena, node, &mut html)?,
            NodeType::Text => html.push_str(&node.node_value),
            NodeType::CdataSection => write_cdata(node, &mut html),
            NodeType::Comment => write_comment(node, &mut html),
            NodeType::DocumentType => write_doctype(node, &mut html),
            _ => {} // Unrecognized kinds produce no output
        }
        next = arena.next_sibling(node_id)?;
    }

    Ok(html)
}

/// Render an element node's full outer markup, descendants included.
pub fn outer_html(arena: &DomArena, node_id: NodeId) -> Result<String> {
    let mut out = String::with_capacity(256);
    write_element(arena, arena.get(node_id)?, &mut out)?;
    Ok(out)
}

/// HTML void elements: no closing tag, children never serialized.
fn is_void_element(tag: &str) -> bool {
    matches!(
        tag,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

/// Raw text elements: child text is emitted without escaping.
fn is_raw_text_element(tag: &str) -> bool {
    matches!(tag, "script" | "style")
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attribute(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}

fn write_element(arena: &DomArena, node: &DomNode, out: &mut String) -> Result<()> {
    // Tree builders (CDP among them) report element names uppercase;
    // serialized markup uses the lowercase form.
    let tag = node.node_name.to_ascii_lowercase();

    out.push('<');
    out.push_str(&tag);
    for (name, value) in &node.attributes {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&escape_attribute(value));
        out.push('"');
    }
    out.push('>');

    if is_void_element(&tag) {
        return Ok(());
    }

    let raw_text = is_raw_text_element(&tag);
    for &child_id in &node.children_ids {
        let child = arena.get(child_id)?;
        match child.node_type {
            NodeType::Element => write_element(arena, child, out)?,
            NodeType::Text => {
                if raw_text {
                    out.push_str(&child.node_value);
                } else {
                    out.push_str(&escape_text(&child.node_value));
                }
            }
            NodeType::CdataSection => write_cdata(child, out),
            NodeType::Comment => write_comment(child, out),
            NodeType::DocumentType => write_doctype(child, out),
            _ => {}
        }
    }

    out.push_str("</");
    out.push_str(&tag);
    out.push('>');
    Ok(())
}

fn write_cdata(node: &DomNode, out: &mut String) {
    out.push_str("<![CDATA[");
    out.push_str(&node.node_value);
    out.push_str("]]>");
}

fn write_comment(node: &DomNode, out: &mut String) {
    out.push_str("<!--");
    out.push_str(&node.node_value);
    out.push_str("-->");
}

/// `<!DOCTYPE name>` with the PUBLIC/SYSTEM identifier rules:
/// a public identifier wins and is quoted after ` PUBLIC`; a system
/// identifier alone gets the bare ` SYSTEM` keyword; either way a present
/// system identifier is quoted at the end. The newline is always appended.
fn write_doctype(node: &DomNode, out: &mut String) {
    out.push_str("<!DOCTYPE ");
    out.push_str(&node.node_name);
    if let Some(public_id) = &node.public_id {
        out.push_str(" PUBLIC \"");
        out.push_str(public_id);
        out.push('"');
    } else if node.system_id.is_some() {
        out.push_str(" SYSTEM");
    }
    if let Some(system_id) = &node.system_id {
        out.push_str(" \"");
        out.push_str(system_id);
        out.push('"');
    }
    out.push_str(">\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DomNode;

    struct Tree {
        arena: DomArena,
        root: NodeId,
    }

    impl Tree {
        fn new() -> Self {
            let mut arena = DomArena::new();
            let root = arena.add_node(DomNode::new(0, NodeType::Document, "#document".into()));
            arena.set_root(root).unwrap();
            Self { arena, root }
        }

        fn add(&mut self, parent: NodeId, mut node: DomNode) -> NodeId {
            node.parent_id = Some(parent);
            let id = self.arena.add_node(node);
            self.arena.get_mut(parent).unwrap().children_ids.push(id);
            id
        }

        fn add_value(&mut self, parent: NodeId, node_type: NodeType, value: &str) -> NodeId {
            let mut node = DomNode::new(0, node_type, String::new());
            node.node_value = value.to_string();
            self.add(parent, node)
        }
    }

    #[test]
    fn test_empty_root() {
        let tree = Tree::new();
        assert_eq!(serialize(&tree.arena, tree.root).unwrap(), "");
    }

    #[test]
    fn test_text_child() {
        let mut tree = Tree::new();
        tree.add_value(tree.root, NodeType::Text, "hello");
        assert_eq!(serialize(&tree.arena, tree.root).unwrap(), "hello");
    }

    #[test]
    fn test_top_level_text_is_raw() {
        let mut tree = Tree::new();
        tree.add_value(tree.root, NodeType::Text, "x<y");
        assert_eq!(serialize(&tree.arena, tree.root).unwrap(), "x<y");
    }

    #[test]
    fn test_comment_child() {
        let mut tree = Tree::new();
        tree.add_value(tree.root, NodeType::Comment, " note ");
        assert_eq!(serialize(&tree.arena, tree.root).unwrap(), "<!-- note -->");
    }

    #[test]
    fn test_cdata_child() {
        let mut tree = Tree::new();
        tree.add_value(tree.root, NodeType::CdataSection, "x<y");
        assert_eq!(
            serialize(&tree.arena, tree.root).unwrap(),
            "<![CDATA[x<y]]>"
        );
    }

    #[test]
    fn test_doctype_bare() {
        let mut tree = Tree::new();
        tree.add(tree.root, DomNode::new(0, NodeType::DocumentType, "html".into()));
        assert_eq!(serialize(&tree.arena, tree.root).unwrap(), "<!DOCTYPE html>\n");
    }

    #[test]
    fn test_doctype_public() {
        let mut tree = Tree::new();
        let mut node = DomNode::new(0, NodeType::DocumentType, "html".into());
        node.public_id = Some("-//W3C//DTD HTML 4.01//EN".to_string());
        tree.add(tree.root, node);
        assert_eq!(
            serialize(&tree.arena, tree.root).unwrap(),
            "<!DOCTYPE html PUBLIC \"-//W3C//DTD HTML 4.01//EN\">\n"
        );
    }

    #[test]
    fn test_doctype_public_and_system() {
        let mut tree = Tree::new();
        let mut node = DomNode::new(0, NodeType::DocumentType, "html".into());
        node.public_id = Some("-//W3C//DTD XHTML 1.0 Strict//EN".to_string());
        node.system_id =
            Some("http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd".to_string());
        tree.add(tree.root, node);
        assert_eq!(
            serialize(&tree.arena, tree.root).unwrap(),
            "<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.0 Strict//EN\" \"http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd\">\n"
        );
    }

    #[test]
    fn test_doctype_system_only() {
        let mut tree = Tree::new();
        let mut node = DomNode::new(0, NodeType::DocumentType, "html".into());
        node.system_id = Some("about:legacy-compat".to_string());
        tree.add(tree.root, node);
        assert_eq!(
            serialize(&tree.arena, tree.root).unwrap(),
            "<!DOCTYPE html SYSTEM \"about:legacy-compat\">\n"
        );
    }

    #[test]
    fn test_element_outer_markup() {
        let mut tree = Tree::new();
        let mut div = DomNode::new(0, NodeType::Element, "DIV".into());
        div.set_attr("class", "box".to_string());
        let div = tree.add(tree.root, div);
        let span = tree.add(div, DomNode::new(0, NodeType::Element, "SPAN".into()));
        tree.add_value(span, NodeType::Text, "hi");

        assert_eq!(
            serialize(&tree.arena, tree.root).unwrap(),
            "<div class=\"box\"><span>hi</span></div>"
        );
    }

    #[test]
    fn test_element_escapes_text_and_attributes() {
        let mut tree = Tree::new();
        let mut p = DomNode::new(0, NodeType::Element, "p".into());
        p.set_attr("title", "a\"b&c".to_string());
        let p = tree.add(tree.root, p);
        tree.add_value(p, NodeType::Text, "1<2 & 3>2");

        assert_eq!(
            serialize(&tree.arena, tree.root).unwrap(),
            "<p title=\"a&quot;b&amp;c\">1&lt;2 &amp; 3&gt;2</p>"
        );
    }

    #[test]
    fn test_void_element() {
        let mut tree = Tree::new();
        let div = tree.add(tree.root, DomNode::new(0, NodeType::Element, "div".into()));
        tree.add(div, DomNode::new(0, NodeType::Element, "br".into()));

        assert_eq!(serialize(&tree.arena, tree.root).unwrap(), "<div><br></div>");
    }

    #[test]
    fn test_raw_text_element() {
        let mut tree = Tree::new();
        let script = tree.add(tree.root, DomNode::new(0, NodeType::Element, "script".into()));
        tree.add_value(script, NodeType::Text, "if (a < b) { go(); }");

        assert_eq!(
            serialize(&tree.arena, tree.root).unwrap(),
            "<script>if (a < b) { go(); }</script>"
        );
    }

    #[test]
    fn test_unrecognized_kinds_skipped() {
        let mut tree = Tree::new();
        let mut pi = DomNode::new(0, NodeType::ProcessingInstruction, "xml-stylesheet".into());
        pi.node_value = "href=\"a.css\"".to_string();
        tree.add(tree.root, pi);
        tree.add_value(tree.root, NodeType::Text, "ok");

        assert_eq!(serialize(&tree.arena, tree.root).unwrap(), "ok");
    }

    #[test]
    fn test_order_preserved() {
        let mut tree = Tree::new();
        tree.add_value(tree.root, NodeType::Comment, "c");
        tree.add_value(tree.root, NodeType::Text, "t");
        let em = tree.add(tree.root, DomNode::new(0, NodeType::Element, "em".into()));
        tree.add_value(em, NodeType::Text, "e");

        assert_eq!(
            serialize(&tree.arena, tree.root).unwrap(),
            "<!--c-->t<em>e</em>"
        );
    }

    #[test]
    fn test_idempotent() {
        let mut tree = Tree::new();
        tree.add(tree.root, DomNode::new(0, NodeType::DocumentType, "html".into()));
        let html = tree.add(tree.root, DomNode::new(0, NodeType::Element, "html".into()));
        let body = tree.add(html, DomNode::new(0, NodeType::Element, "body".into()));
        tree.add_value(body, NodeType::Text, "hello");

        let first = serialize(&tree.arena, tree.root).unwrap();
        let second = serialize(&tree.arena, tree.root).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, "<!DOCTYPE html>\n<html><body>hello</body></html>");
    }

    #[test]
    fn test_outer_html_single_node() {
        let mut tree = Tree::new();
        let mut a = DomNode::new(0, NodeType::Element, "a".into());
        a.set_attr("href", "/x".to_string());
        let a = tree.add(tree.root, a);
        tree.add_value(a, NodeType::Text, "link");

        assert_eq!(
            outer_html(&tree.arena, a).unwrap(),
            "<a href=\"/x\">link</a>"
        );
    }
}
