//! Inner markup parsing and serialization.
//!
//! Markup is read and written as an XML fragment with quick-xml. `class` and
//! `style` attributes map onto a node's class list and inline styles so that
//! a round trip through markup preserves them.

use std::io::Write;

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::document::{NodeId, NodeKind, NodeTree};
use crate::error::{DocumentError, Result};
use crate::logging::targets;

/// A parsed fragment node, built fully before the tree is touched so a
/// malformed fragment leaves the target unchanged.
#[derive(Debug)]
enum Fragment {
    Element {
        name: String,
        attributes: Vec<(String, String)>,
        children: Vec<Fragment>,
    },
    Text(String),
}

/// A markup fragment parsed ahead of insertion, so that several nodes can be
/// checked before any of them is rewritten.
#[derive(Debug)]
pub struct ParsedMarkup {
    nodes: Vec<Fragment>,
}

impl ParsedMarkup {
    /// Number of top-level nodes in the fragment.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the fragment has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

fn markup_error(e: impl std::fmt::Display) -> DocumentError {
    DocumentError::Markup(e.to_string())
}

fn parse_fragment(markup: &str) -> Result<Vec<Fragment>> {
    let mut reader = Reader::from_str(markup);
    reader.config_mut().trim_text(false);

    // Stack of open elements; the bottom entry collects top-level nodes.
    let mut stack: Vec<(String, Vec<(String, String)>, Vec<Fragment>)> =
        vec![(String::new(), Vec::new(), Vec::new())];

    loop {
        match reader.read_event().map_err(markup_error)? {
            Event::Start(start) => {
                let (name, attributes) = read_start(&start)?;
                stack.push((name, attributes, Vec::new()));
            }
            Event::Empty(start) => {
                let (name, attributes) = read_start(&start)?;
                push_child(
                    &mut stack,
                    Fragment::Element {
                        name,
                        attributes,
                        children: Vec::new(),
                    },
                );
            }
            Event::End(_) => {
                if stack.len() < 2 {
                    return Err(DocumentError::Markup("unexpected closing tag".into()));
                }
                if let Some((name, attributes, children)) = stack.pop() {
                    push_child(
                        &mut stack,
                        Fragment::Element {
                            name,
                            attributes,
                            children,
                        },
                    );
                }
            }
            Event::Text(text) => {
                let content = text.unescape().map_err(markup_error)?;
                if !content.is_empty() {
                    push_child(&mut stack, Fragment::Text(content.into_owned()));
                }
            }
            Event::CData(cdata) => {
                let content = String::from_utf8_lossy(&cdata).into_owned();
                push_child(&mut stack, Fragment::Text(content));
            }
            Event::Eof => break,
            // Comments, declarations and processing instructions are dropped.
            _ => {}
        }
    }

    if stack.len() != 1 {
        return Err(DocumentError::Markup("unclosed element at end of input".into()));
    }
    Ok(stack.pop().map(|(_, _, nodes)| nodes).unwrap_or_default())
}

fn push_child(
    stack: &mut [(String, Vec<(String, String)>, Vec<Fragment>)],
    fragment: Fragment,
) {
    if let Some((_, _, children)) = stack.last_mut() {
        children.push(fragment);
    }
}

fn read_start(start: &BytesStart<'_>) -> Result<(String, Vec<(String, String)>)> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(markup_error)?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value().map_err(markup_error)?.into_owned();
        attributes.push((key, value));
    }
    Ok((name, attributes))
}

fn build(tree: &mut NodeTree, parent: NodeId, fragment: &Fragment) -> Result<()> {
    match fragment {
        Fragment::Text(text) => {
            let node = tree.create_text(text.as_str());
            tree.append_child(parent, node)
        }
        Fragment::Element {
            name,
            attributes,
            children,
        } => {
            let node = tree.create_element_for(parent, name)?;
            tree.append_child(parent, node)?;
            for (key, value) in attributes {
                match key.as_str() {
                    "class" => {
                        for class in value.split_whitespace() {
                            tree.add_class(node, class)?;
                        }
                    }
                    "style" => apply_style_text(tree, node, value)?,
                    _ => tree.set_attribute(node, key.as_str(), value.as_str())?,
                }
            }
            for child in children {
                build(tree, node, child)?;
            }
            Ok(())
        }
    }
}

/// Parse `name: value [!important]; ...` declarations onto a node.
pub fn apply_style_text(tree: &mut NodeTree, node: NodeId, text: &str) -> Result<()> {
    for declaration in text.split(';') {
        let Some((name, value)) = declaration.split_once(':') else {
            continue;
        };
        let name = name.trim();
        let value = value.trim();
        if name.is_empty() {
            continue;
        }
        match value.strip_suffix("!important") {
            Some(value) => tree.set_style(node, name, value.trim_end(), true)?,
            None => tree.set_style(node, name, value, false)?,
        }
    }
    Ok(())
}

/// Parse `markup` without touching any tree.
pub fn parse_markup(markup: &str) -> Result<ParsedMarkup> {
    let nodes = parse_fragment(markup).inspect_err(|e| {
        tracing::warn!(target: targets::MARKUP, error = %e, "rejected markup");
    })?;
    Ok(ParsedMarkup { nodes })
}

/// Replace the children of `node` with fresh nodes built from `parsed`.
pub fn replace_children(tree: &mut NodeTree, node: NodeId, parsed: &ParsedMarkup) -> Result<()> {
    if tree.kind(node)? != NodeKind::Element {
        return Err(DocumentError::NotAnElement);
    }
    tree.clear_children(node)?;
    for fragment in &parsed.nodes {
        build(tree, node, fragment)?;
    }
    Ok(())
}

/// Replace the children of `node` with the nodes parsed from `markup`.
///
/// On a parse error the node is left untouched.
pub fn set_inner_markup(tree: &mut NodeTree, node: NodeId, markup: &str) -> Result<()> {
    if tree.kind(node)? != NodeKind::Element {
        return Err(DocumentError::NotAnElement);
    }
    let parsed = parse_markup(markup)?;
    replace_children(tree, node, &parsed)
}

/// Serialize the children of `node` as markup.
pub fn inner_markup(tree: &NodeTree, node: NodeId) -> Result<String> {
    let mut writer = Writer::new(Vec::new());
    for &child in tree.children(node)? {
        write_node(tree, child, &mut writer)?;
    }
    String::from_utf8(writer.into_inner()).map_err(markup_error)
}

/// Serialize `node` itself, including its tag, as markup.
pub fn outer_markup(tree: &NodeTree, node: NodeId) -> Result<String> {
    let mut writer = Writer::new(Vec::new());
    write_node(tree, node, &mut writer)?;
    String::from_utf8(writer.into_inner()).map_err(markup_error)
}

fn write_node<W: Write>(tree: &NodeTree, node: NodeId, writer: &mut Writer<W>) -> Result<()> {
    if tree.kind(node)? == NodeKind::Text {
        return writer
            .write_event(Event::Text(BytesText::new(tree.own_text(node)?)))
            .map_err(markup_error);
    }

    let tag = tree.tag(node)?;
    let mut start = BytesStart::new(tag);
    let classes = tree.classes(node)?;
    if !classes.is_empty() {
        start.push_attribute(("class", classes.join(" ").as_str()));
    }
    for (key, value) in tree.attributes(node)? {
        start.push_attribute((key.as_str(), value.as_str()));
    }
    let style = tree.style_text(node)?;
    if !style.is_empty() {
        start.push_attribute(("style", style.as_str()));
    }

    let children = tree.children(node)?;
    if children.is_empty() {
        writer.write_event(Event::Empty(start)).map_err(markup_error)?;
    } else {
        writer.write_event(Event::Start(start)).map_err(markup_error)?;
        for &child in children {
            write_node(tree, child, writer)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new(tag)))
            .map_err(markup_error)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DocumentConfig;

    fn tree_with_body() -> (NodeTree, NodeId) {
        let mut tree = NodeTree::new(&DocumentConfig::default());
        let body = tree.create_element("body");
        let root = tree.root();
        tree.append_child(root, body).unwrap();
        (tree, body)
    }

    #[test]
    fn test_parse_and_serialize() {
        let (mut tree, body) = tree_with_body();
        set_inner_markup(&mut tree, body, r#"<p class="a b" id="x">hi <b>there</b></p><br/>"#)
            .unwrap();

        let children = tree.element_children(body).unwrap();
        assert_eq!(children.len(), 2);
        assert_eq!(tree.tag(children[0]).unwrap(), "p");
        assert!(tree.has_class(children[0], "b").unwrap());
        assert_eq!(tree.attribute(children[0], "id").unwrap(), Some("x"));
        assert_eq!(tree.text_content(children[0]).unwrap(), "hi there");

        assert_eq!(
            inner_markup(&tree, body).unwrap(),
            r#"<p class="a b" id="x">hi <b>there</b></p><br/>"#
        );
    }

    #[test]
    fn test_style_attribute() {
        let (mut tree, body) = tree_with_body();
        set_inner_markup(&mut tree, body, r#"<div style="color: red; margin: 0 !important"/>"#)
            .unwrap();
        let div = tree.element_children(body).unwrap()[0];
        assert_eq!(tree.style(div, "color").unwrap(), Some("red"));
        assert!(tree.style_is_important(div, "margin").unwrap());
    }

    #[test]
    fn test_escaping() {
        let (mut tree, body) = tree_with_body();
        set_inner_markup(&mut tree, body, "a &lt; b").unwrap();
        assert_eq!(tree.text_content(body).unwrap(), "a < b");
        assert_eq!(inner_markup(&tree, body).unwrap(), "a &lt; b");
    }

    #[test]
    fn test_malformed_leaves_children() {
        let (mut tree, body) = tree_with_body();
        set_inner_markup(&mut tree, body, "<i>keep</i>").unwrap();
        assert!(set_inner_markup(&mut tree, body, "<p><b></p>").is_err());
        assert!(set_inner_markup(&mut tree, body, "<p>").is_err());
        assert_eq!(inner_markup(&tree, body).unwrap(), "<i>keep</i>");
    }

    #[test]
    fn test_empty_markup_clears() {
        let (mut tree, body) = tree_with_body();
        set_inner_markup(&mut tree, body, "<i>x</i>").unwrap();
        set_inner_markup(&mut tree, body, "").unwrap();
        assert!(tree.children(body).unwrap().is_empty());
    }
}
