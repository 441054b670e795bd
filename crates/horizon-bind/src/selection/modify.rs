//! Mutators: attributes, styles, properties, classes, text, markup and
//! structural changes.
//!
//! The plain form of each mutator applies one value to every node. The
//! `_with` form calls a function once per node and applies its result; a
//! `None` result removes the attribute, style or property.

use std::sync::Arc;

use horizon_bind_core::logging::targets;
use horizon_bind_core::markup::ParsedMarkup;
use horizon_bind_core::{Datum, DocumentError, NodeId, NodeKind, NodeTree, markup};
use horizon_bind_selector::{SelectorMatcher, parse_or_warn};

use super::{AttrValue, Bindable, Context, Group, Priority, Selection};
use crate::creator::creator;
use crate::error::{Result, SelectionError};

fn apply_attr(tree: &mut NodeTree, node: NodeId, name: &str, value: AttrValue) -> horizon_bind_core::Result<()> {
    match value.into_inner() {
        Some(value) => tree.set_attribute(node, name, value),
        None => tree.remove_attribute(node, name).map(|_| ()),
    }
}

fn apply_style(
    tree: &mut NodeTree,
    node: NodeId,
    name: &str,
    value: AttrValue,
    priority: Priority,
) -> horizon_bind_core::Result<()> {
    match value.into_inner() {
        Some(value) => tree.set_style(node, name, value, priority.is_important()),
        None => tree.remove_style(node, name),
    }
}

fn apply_classes(tree: &mut NodeTree, node: NodeId, names: &[&str], on: bool) -> horizon_bind_core::Result<()> {
    for name in names {
        if on {
            tree.add_class(node, name)?;
        } else {
            tree.remove_class(node, name)?;
        }
    }
    Ok(())
}

fn first_matching_child(tree: &NodeTree, parent: NodeId, selector: &str) -> Option<NodeId> {
    let list = parse_or_warn(selector)?;
    SelectorMatcher::matching_children(&list, tree, parent)
        .into_iter()
        .next()
}

impl<D: Bindable> Selection<D> {
    // =========================================================================
    // Attributes
    // =========================================================================

    /// Set (or, with `None`, remove) an attribute on every node.
    pub fn attr(&self, name: &str, value: impl Into<AttrValue>) -> Self {
        let value = value.into();
        for node in self.nodes() {
            let result = self.document().write(|t| apply_attr(t, node, name, value.clone()));
            self.report("attr", node, result);
        }
        self.clone()
    }

    /// Set an attribute computed per node.
    pub fn attr_with<V, F>(&self, name: &str, mut f: F) -> Self
    where
        V: Into<AttrValue>,
        F: FnMut(Context<'_, D>) -> V,
    {
        self.visit(|ctx| {
            let node = ctx.element.id();
            let value = f(ctx).into();
            let result = self.document().write(|t| apply_attr(t, node, name, value));
            self.report("attr", node, result);
        });
        self.clone()
    }

    /// The attribute value of the first node.
    pub fn attr_value(&self, name: &str) -> Option<String> {
        let node = self.node()?;
        self.document()
            .read(|t| t.attribute(node, name).ok().flatten().map(str::to_string))
    }

    // =========================================================================
    // Styles
    // =========================================================================

    /// Set (or, with `None`, remove) an inline style on every node.
    pub fn style(&self, name: &str, value: impl Into<AttrValue>, priority: Priority) -> Self {
        let value = value.into();
        for node in self.nodes() {
            let result = self
                .document()
                .write(|t| apply_style(t, node, name, value.clone(), priority));
            self.report("style", node, result);
        }
        self.clone()
    }

    /// Set an inline style computed per node.
    pub fn style_with<V, F>(&self, name: &str, mut f: F, priority: Priority) -> Self
    where
        V: Into<AttrValue>,
        F: FnMut(Context<'_, D>) -> V,
    {
        self.visit(|ctx| {
            let node = ctx.element.id();
            let value = f(ctx).into();
            let result = self
                .document()
                .write(|t| apply_style(t, node, name, value, priority));
            self.report("style", node, result);
        });
        self.clone()
    }

    /// The inline style value of the first node.
    pub fn style_value(&self, name: &str) -> Option<String> {
        let node = self.node()?;
        self.document()
            .read(|t| t.style(node, name).ok().flatten().map(str::to_string))
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// Set (or, with `None`, remove) a dynamic property on every node.
    pub fn property<P: Bindable>(&self, name: &str, value: Option<P>) -> Self {
        for node in self.nodes() {
            let result = self.document().write(|t| match value.clone() {
                Some(v) => t.set_property(node, name, v),
                None => t.remove_property(node, name).map(|_| ()),
            });
            self.report("property", node, result);
        }
        self.clone()
    }

    /// Set a dynamic property computed per node.
    pub fn property_with<P, F>(&self, name: &str, mut f: F) -> Self
    where
        P: Bindable,
        F: FnMut(Context<'_, D>) -> Option<P>,
    {
        self.visit(|ctx| {
            let node = ctx.element.id();
            let value = f(ctx);
            let result = self.document().write(|t| match value {
                Some(v) => t.set_property(node, name, v),
                None => t.remove_property(node, name).map(|_| ()),
            });
            self.report("property", node, result);
        });
        self.clone()
    }

    /// The dynamic property of the first node, if it is a `P`.
    pub fn property_value<P: Bindable>(&self, name: &str) -> Option<P> {
        let node = self.node()?;
        self.document()
            .read(|t| t.property::<P>(node, name).ok().flatten().cloned())
    }

    // =========================================================================
    // Classes
    // =========================================================================

    /// Add (`true`) or remove (`false`) the space-separated `names`.
    pub fn classed(&self, names: &str, value: bool) -> Self {
        let names: Vec<&str> = names.split_whitespace().collect();
        for node in self.nodes() {
            let result = self.document().write(|t| apply_classes(t, node, &names, value));
            self.report("classed", node, result);
        }
        self.clone()
    }

    /// Toggle the space-separated `names` per node.
    pub fn classed_with<F>(&self, names: &str, mut f: F) -> Self
    where
        F: FnMut(Context<'_, D>) -> bool,
    {
        let names: Vec<&str> = names.split_whitespace().collect();
        self.visit(|ctx| {
            let node = ctx.element.id();
            let on = f(ctx);
            let result = self.document().write(|t| apply_classes(t, node, &names, on));
            self.report("classed", node, result);
        });
        self.clone()
    }

    /// Whether the first node has every one of the space-separated `names`.
    pub fn has_classes(&self, names: &str) -> bool {
        let Some(node) = self.node() else {
            return false;
        };
        self.document().read(|t| {
            names
                .split_whitespace()
                .all(|name| t.has_class(node, name).unwrap_or(false))
        })
    }

    // =========================================================================
    // Text and markup
    // =========================================================================

    /// Replace the children of every node with text. `None` clears them.
    pub fn text(&self, value: impl Into<AttrValue>) -> Self {
        let value = value.into();
        let text = value.as_str().unwrap_or_default();
        for node in self.nodes() {
            let result = self.document().write(|t| t.set_text_content(node, text));
            self.report("text", node, result);
        }
        self.clone()
    }

    /// Replace the children of every node with text computed per node.
    pub fn text_with<V, F>(&self, mut f: F) -> Self
    where
        V: Into<AttrValue>,
        F: FnMut(Context<'_, D>) -> V,
    {
        self.visit(|ctx| {
            let node = ctx.element.id();
            let value = f(ctx).into();
            let text = value.as_str().unwrap_or_default();
            let result = self.document().write(|t| t.set_text_content(node, text));
            self.report("text", node, result);
        });
        self.clone()
    }

    /// The text content of the first node.
    pub fn text_value(&self) -> Option<String> {
        let node = self.node()?;
        self.document().read(|t| t.text_content(node).ok())
    }

    /// Replace the children of every node with parsed markup.
    ///
    /// Malformed markup fails with [`SelectionError::Markup`] and leaves
    /// every node unchanged.
    pub fn html(&self, markup: &str) -> Result<Self> {
        let parsed = Arc::new(markup::parse_markup(markup).map_err(SelectionError::from_document)?);
        let plan = self.nodes().into_iter().map(|node| (node, Arc::clone(&parsed))).collect();
        self.replace_all_children(plan)?;
        Ok(self.clone())
    }

    /// Replace the children of every node with markup computed per node.
    ///
    /// Every fragment is parsed before any node is rewritten, so one
    /// malformed fragment leaves the whole selection unchanged.
    pub fn html_with<V, F>(&self, mut f: F) -> Result<Self>
    where
        V: Into<AttrValue>,
        F: FnMut(Context<'_, D>) -> V,
    {
        let mut plan = Vec::with_capacity(self.size());
        for group in self.groups() {
            for (index, node) in group.nodes.iter().enumerate() {
                let Some(node) = *node else { continue };
                let value = self.contextualize(group, index, node, &mut f).into();
                let parsed = markup::parse_markup(value.as_str().unwrap_or_default())
                    .map_err(SelectionError::from_document)?;
                plan.push((node, Arc::new(parsed)));
            }
        }
        self.replace_all_children(plan)?;
        Ok(self.clone())
    }

    /// Apply parsed fragments under one write lock, after checking that every
    /// target is an element.
    fn replace_all_children(&self, plan: Vec<(NodeId, Arc<ParsedMarkup>)>) -> Result<()> {
        self.document()
            .write(|t| {
                for (node, _) in &plan {
                    if t.kind(*node)? != NodeKind::Element {
                        return Err(DocumentError::NotAnElement);
                    }
                }
                for (node, parsed) in &plan {
                    markup::replace_children(t, *node, parsed)?;
                }
                Ok(())
            })
            .map_err(SelectionError::from_document)
    }

    /// The inner markup of the first node.
    pub fn html_value(&self) -> Result<Option<String>> {
        let Some(node) = self.node() else {
            return Ok(None);
        };
        let markup = self.document().read(|t| markup::inner_markup(t, node))?;
        Ok(Some(markup))
    }

    // =========================================================================
    // Structure
    // =========================================================================

    /// Append a new child element named `name` to every node.
    ///
    /// The child inherits the parent's namespace unless `name` carries a
    /// known prefix, and inherits the parent's datum. Returns the children.
    pub fn append(&self, name: &str) -> Result<Selection<D>> {
        let create = creator(name);
        self.append_with(|ctx| create(ctx.element))
    }

    /// Append the node returned by `create` to every node.
    pub fn append_with<F>(&self, mut create: F) -> Result<Selection<D>>
    where
        F: FnMut(Context<'_, D>) -> horizon_bind_core::Result<NodeId>,
    {
        self.insert_with(|ctx| create(ctx), |_| None)
    }

    /// Insert a new child element before the first child matching `before`,
    /// or at the end when nothing matches.
    pub fn insert(&self, name: &str, before: &str) -> Result<Selection<D>> {
        let create = creator(name);
        self.insert_with(
            |ctx| create(ctx.element),
            |ctx| {
                let parent = ctx.element.id();
                ctx.element
                    .document()
                    .read(|t| first_matching_child(t, parent, before))
            },
        )
    }

    /// Insert the node returned by `create` before the child returned by
    /// `before` (or at the end).
    pub fn insert_with<C, B>(&self, mut create: C, mut before: B) -> Result<Selection<D>>
    where
        C: FnMut(Context<'_, D>) -> horizon_bind_core::Result<NodeId>,
        B: FnMut(Context<'_, D>) -> Option<NodeId>,
    {
        let mut groups = Vec::with_capacity(self.groups().len());
        for group in self.groups() {
            let mut nodes = Vec::with_capacity(group.nodes.len());
            for (index, node) in group.nodes.iter().enumerate() {
                let Some(parent) = *node else {
                    nodes.push(None);
                    continue;
                };
                let child = self.contextualize(group, index, parent, &mut create)?;
                let reference = self.contextualize(group, index, parent, &mut before);
                let datum: Option<Datum> = self.raw_datum(parent);
                self.document().write(|t| -> horizon_bind_core::Result<()> {
                    t.insert_before(parent, child, reference)?;
                    if datum.is_some() {
                        t.set_datum(child, datum)?;
                    }
                    Ok(())
                })?;
                tracing::trace!(target: targets::SELECTION, ?parent, ?child, "inserted child");
                nodes.push(Some(child));
            }
            groups.push(Group::new(nodes, group.parent));
        }
        Ok(Selection::from_groups(self.document().clone(), groups))
    }

    /// Detach every node from its parent. Nodes stay alive and may be
    /// re-inserted; use [`Selection::destroy`] or
    /// [`NodeTree::purge_detached`] to free them.
    pub fn remove(&self) -> Self {
        for node in self.nodes() {
            let result = self.document().write(|t| t.detach(node));
            self.report("remove", node, result);
            tracing::trace!(target: targets::SELECTION, ?node, "removed node");
        }
        self.clone()
    }

    /// Detach every node and free it together with its subtree. Node ids in
    /// this and any other selection become invalid.
    pub fn destroy(&self) {
        for node in self.nodes() {
            let result = self.document().write(|t| {
                // Already freed as part of an earlier node's subtree.
                if !t.contains(node) {
                    return Ok(());
                }
                t.destroy(node)
            });
            self.report("destroy", node, result);
        }
        tracing::trace!(target: targets::SELECTION, nodes = self.size(), "destroyed nodes");
    }

    // =========================================================================
    // Chaining helpers
    // =========================================================================

    /// Call `f` for every node.
    pub fn each<F>(&self, f: F) -> Self
    where
        F: FnMut(Context<'_, D>),
    {
        self.visit(f);
        self.clone()
    }

    /// Call `f` once with the whole selection.
    pub fn call<F>(&self, f: F) -> Self
    where
        F: FnOnce(&Self),
    {
        f(self);
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::select::{select_all, select_all_nodes, selection};
    use horizon_bind_core::namespace::SVG;
    use horizon_bind_core::{Document, DocumentConfig};

    fn items(doc: &Document, n: usize) -> Selection<i32> {
        let body = selection::<()>(doc).append("ul").unwrap();
        for i in 0..n {
            body.append("li").unwrap().datum(i as i32);
        }
        select_all::<i32>(doc, "li")
    }

    #[test]
    fn test_attr_static_and_computed() {
        let doc = Document::new();
        let li = items(&doc, 3);
        li.attr("role", "item").attr_with("data-n", |ctx| ctx.datum.map(|d| d * 10));
        assert_eq!(li.attr_value("role").as_deref(), Some("item"));
        assert_eq!(li.attr_value("data-n").as_deref(), Some("0"));
        assert_eq!(
            li.elements().iter().map(|e| e.attr("data-n")).collect::<Vec<_>>(),
            vec![Some("0".to_string()), Some("10".to_string()), Some("20".to_string())]
        );
    }

    #[test]
    fn test_none_removes_rather_than_writing_null() {
        let doc = Document::new();
        let li = items(&doc, 2);
        li.attr("title", "x").style("color", "red", Priority::Normal);
        li.attr_with("title", |ctx| (ctx.index == 0).then_some("kept"));
        assert_eq!(li.elements()[0].attr("title").as_deref(), Some("kept"));
        assert_eq!(li.elements()[1].attr("title"), None);

        li.style("color", None::<&str>, Priority::Normal);
        assert_eq!(li.style_value("color"), None);
    }

    #[test]
    fn test_booleans_become_text() {
        let doc = Document::new();
        let li = items(&doc, 1);
        li.attr("hidden", false).property("checked", Some(true));
        assert_eq!(li.attr_value("hidden").as_deref(), Some("false"));
        assert_eq!(li.property_value::<bool>("checked"), Some(true));
        li.property::<bool>("checked", None);
        assert_eq!(li.property_value::<bool>("checked"), None);
    }

    #[test]
    fn test_styles_keep_priority() {
        let doc = Document::new();
        let li = items(&doc, 2);
        li.style_with("width", |ctx| format!("{}px", ctx.index * 5), Priority::Important);
        let last = li.elements()[1].id();
        assert!(doc.read(|t| t.style_is_important(last, "width")).unwrap());
        assert_eq!(li.elements()[1].style("width").as_deref(), Some("5px"));
    }

    #[test]
    fn test_classes() {
        let doc = Document::new();
        let li = items(&doc, 3);
        li.classed("a b", true).classed_with("odd", |ctx| ctx.index % 2 == 1);
        assert!(li.has_classes("b a"));
        assert!(!li.has_classes("odd"));
        assert_eq!(li.filter(".odd").size(), 1);
        li.classed("a", false);
        assert!(!li.has_classes("a"));
        assert!(li.has_classes("b"));
    }

    #[test]
    fn test_text_and_html() {
        let doc = Document::new();
        let li = items(&doc, 2);
        li.text_with(|ctx| format!("item {}", ctx.index));
        assert_eq!(li.text_value().as_deref(), Some("item 0"));

        li.html("<b>bold</b> tail").unwrap();
        assert_eq!(li.html_value().unwrap().as_deref(), Some("<b>bold</b> tail"));
        assert_eq!(li.select("b").size(), 2);

        let err = li.html("<b>").unwrap_err();
        assert!(matches!(err, SelectionError::Markup(_)));
        // Unchanged after the failure.
        assert_eq!(li.text_value().as_deref(), Some("bold tail"));

        li.text(None::<String>);
        assert_eq!(li.text_value().as_deref(), Some(""));
    }

    #[test]
    fn test_html_with_is_all_or_nothing() {
        let doc = Document::new();
        let li = items(&doc, 3);
        li.text("before");

        let err = li
            .html_with(|ctx| if ctx.index == 2 { "<i>" } else { "<b>ok</b>" })
            .unwrap_err();
        assert!(matches!(err, SelectionError::Markup(_)));
        for element in li.elements() {
            assert_eq!(element.text(), "before");
        }
        assert!(li.select("b").empty());

        // A text node target is rejected before anything is written.
        let text = doc.write(|t| t.create_text("loose"));
        let first = li.nodes()[0];
        doc.write(|t| t.append_child(first, text)).unwrap();
        let mixed = select_all_nodes::<()>(&doc, [li.nodes()[1], text]);
        assert_eq!(
            mixed.html("<b>ok</b>").unwrap_err(),
            SelectionError::Document(DocumentError::NotAnElement)
        );
        assert_eq!(li.elements()[1].text(), "before");
    }

    #[test]
    fn test_append_inherits_datum_and_namespace() {
        let config = DocumentConfig::new().default_namespace(SVG);
        let doc = Document::with_config(&config);
        let root = selection::<&'static str>(&doc).datum("root");
        let g = root.append("g").unwrap();
        assert_eq!(g.datum_value(), Some("root"));
        assert_eq!(g.elements()[0].namespace().as_deref(), Some(SVG));
    }

    #[test]
    fn test_insert_before_matching_child() {
        let doc = Document::new();
        items(&doc, 2);
        let ul = select_all::<()>(&doc, "ul");
        ul.select("li").classed("first", true);
        ul.insert("li", ".first").unwrap().classed("new", true);
        let classes: Vec<bool> = select_all::<()>(&doc, "li")
            .elements()
            .iter()
            .map(|e| e.has_class("new"))
            .collect();
        assert_eq!(classes, vec![true, false, false]);

        // No match appends at the end.
        ul.insert("li", ".missing").unwrap().classed("last", true);
        assert!(select_all::<()>(&doc, "li:last-child").has_classes("last"));
    }

    #[test]
    fn test_destroy_frees_subtrees() {
        let doc = Document::new();
        let li = items(&doc, 3);
        li.append("span").unwrap();
        let count = doc.read(NodeTree::node_count);

        // The span is freed with its parent before its own turn comes.
        let doomed = li.nodes()[1];
        let span = li.filter_with(|ctx| ctx.index == 1).select("span").node().unwrap();
        select_all_nodes::<()>(&doc, [doomed, span]).destroy();
        assert!(!doc.contains(doomed));
        assert!(!doc.contains(span));
        assert_eq!(doc.read(NodeTree::node_count), count - 2);
        assert_eq!(select_all::<()>(&doc, "li").size(), 2);

        // Destroying the root is refused and leaves the document usable.
        selection::<()>(&doc).destroy();
        assert!(doc.contains(doc.root()));
    }

    #[test]
    fn test_remove_detaches_without_destroying() {
        let doc = Document::new();
        let li = items(&doc, 3);
        let count = doc.read(NodeTree::node_count);
        li.filter_with(|ctx| ctx.index == 1).remove();
        assert_eq!(select_all::<()>(&doc, "li").size(), 2);
        assert_eq!(doc.read(NodeTree::node_count), count);
    }

    #[test]
    fn test_each_and_call() {
        let doc = Document::new();
        let li = items(&doc, 3);
        let mut seen = Vec::new();
        li.each(|ctx| seen.push((ctx.index, ctx.datum.copied())));
        assert_eq!(seen, vec![(0, Some(0)), (1, Some(1)), (2, Some(2))]);

        let mut sizes = 0;
        li.call(|s| sizes = s.size());
        assert_eq!(sizes, 3);
    }
}
