//! Top-level selection constructors.

use horizon_bind_core::{Document, NodeId};
use horizon_bind_selector::{SelectorMatcher, parse_or_warn};

use crate::selection::{Bindable, Group, Selection};

/// Select the document root.
pub fn selection<D: Bindable>(document: &Document) -> Selection<D> {
    select_node(document, document.root())
}

/// Select the first element in the document matching `selector`.
///
/// The result always has one slot; it is empty when nothing matches.
pub fn select<D: Bindable>(document: &Document, selector: &str) -> Selection<D> {
    let root = document.root();
    let found = parse_or_warn(selector).and_then(|list| {
        document.read(|t| {
            if SelectorMatcher::matches(&list, t, root) {
                Some(root)
            } else {
                SelectorMatcher::query_first(&list, t, root)
            }
        })
    });
    Selection::from_groups(document.clone(), vec![Group::new(vec![found], Some(root))])
}

/// Select a known node.
pub fn select_node<D: Bindable>(document: &Document, node: NodeId) -> Selection<D> {
    Selection::from_groups(document.clone(), vec![Group::new(vec![Some(node)], None)])
}

/// Select every element in the document matching `selector`, in document
/// order, as a single group.
pub fn select_all<D: Bindable>(document: &Document, selector: &str) -> Selection<D> {
    let root = document.root();
    let found = parse_or_warn(selector)
        .map(|list| {
            document.read(|t| {
                let mut found = Vec::new();
                if SelectorMatcher::matches(&list, t, root) {
                    found.push(root);
                }
                found.extend(SelectorMatcher::query_all(&list, t, root));
                found
            })
        })
        .unwrap_or_default();
    Selection::from_groups(
        document.clone(),
        vec![Group::new(found.into_iter().map(Some).collect(), Some(root))],
    )
}

/// Select the given nodes, in the given order, as a single group.
pub fn select_all_nodes<D: Bindable>(
    document: &Document,
    nodes: impl IntoIterator<Item = NodeId>,
) -> Selection<D> {
    let nodes = nodes.into_iter().map(Some).collect();
    Selection::from_groups(document.clone(), vec![Group::new(nodes, None)])
}

/// A selection with one empty group.
pub fn select_none<D: Bindable>(document: &Document) -> Selection<D> {
    Selection::from_groups(document.clone(), vec![Group::default()])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_with_items() -> Document {
        let doc = Document::new();
        let root = doc.root();
        doc.write(|t| {
            let ul = t.create_element("ul");
            t.append_child(root, ul).unwrap();
            for _ in 0..3 {
                let li = t.create_element("li");
                t.append_child(ul, li).unwrap();
            }
        });
        doc
    }

    #[test]
    fn test_root_selection() {
        let doc = doc_with_items();
        let root = selection::<()>(&doc);
        assert_eq!(root.nodes(), vec![doc.root()]);
        assert_eq!(root.groups()[0].parent(), None);
    }

    #[test]
    fn test_select_first_match() {
        let doc = doc_with_items();
        let li = select::<()>(&doc, "li");
        assert_eq!(li.size(), 1);
        assert_eq!(li.groups()[0].parent(), Some(doc.root()));
        assert_eq!(li.node(), select_all::<()>(&doc, "li").node());

        let missing = select::<()>(&doc, "table");
        assert_eq!(missing.groups()[0].len(), 1);
        assert!(missing.empty());
    }

    #[test]
    fn test_select_all_includes_matching_root() {
        let doc = doc_with_items();
        assert_eq!(select_all::<()>(&doc, "li").size(), 3);
        assert_eq!(select_all::<()>(&doc, "html").nodes(), vec![doc.root()]);
        assert_eq!(select::<()>(&doc, "html").node(), Some(doc.root()));
    }

    #[test]
    fn test_explicit_nodes() {
        let doc = doc_with_items();
        let items = select_all::<()>(&doc, "li").nodes();
        let reversed = select_all_nodes::<()>(&doc, items.iter().rev().copied());
        assert_eq!(reversed.nodes(), items.into_iter().rev().collect::<Vec<_>>());
        assert!(select_none::<()>(&doc).empty());
        assert_eq!(select_none::<()>(&doc).groups().len(), 1);
    }
}
