//! Reordering selections and the nodes behind them.

use std::cmp::Ordering;

use horizon_bind_core::{NodeId, NodeTree};

use super::{Bindable, Group, Selection};

/// Sibling-index path from the top of a node's tree, plus that top node.
fn tree_path(tree: &NodeTree, node: NodeId) -> Option<(NodeId, Vec<usize>)> {
    let mut path = Vec::new();
    let mut current = node;
    while let Some(parent) = tree.parent(current).ok()? {
        path.push(tree.sibling_index(current).ok()??);
        current = parent;
    }
    path.reverse();
    Some((current, path))
}

/// Whether `a` comes before `b` in document order.
fn precedes(tree: &NodeTree, a: NodeId, b: NodeId) -> bool {
    match (tree_path(tree, a), tree_path(tree, b)) {
        (Some((top_a, path_a)), Some((top_b, path_b))) => top_a == top_b && path_a < path_b,
        _ => false,
    }
}

impl<D: Bindable> Selection<D> {
    /// Return a copy with each group sorted by datum, then [`order`] the
    /// document to match.
    ///
    /// The sort is stable. Nodes without a `D` datum follow the rest, and
    /// empty slots go last.
    ///
    /// [`order`]: Selection::order
    pub fn sort_by<F>(&self, mut compare: F) -> Selection<D>
    where
        F: FnMut(&D, &D) -> Ordering,
    {
        let groups = self
            .groups()
            .iter()
            .map(|group| {
                let mut keyed: Vec<(Option<NodeId>, Option<D>)> = group
                    .nodes
                    .iter()
                    .map(|&node| {
                        let datum = node
                            .and_then(|n| self.raw_datum(n))
                            .and_then(|d| d.downcast_ref::<D>().cloned());
                        (node, datum)
                    })
                    .collect();
                keyed.sort_by(|(na, da), (nb, db)| match (na, nb) {
                    (None, None) => Ordering::Equal,
                    (None, Some(_)) => Ordering::Greater,
                    (Some(_), None) => Ordering::Less,
                    (Some(_), Some(_)) => match (da, db) {
                        (Some(a), Some(b)) => compare(a, b),
                        (Some(_), None) => Ordering::Less,
                        (None, Some(_)) => Ordering::Greater,
                        (None, None) => Ordering::Equal,
                    },
                });
                Group::new(keyed.into_iter().map(|(n, _)| n).collect(), group.parent)
            })
            .collect();
        Selection::from_groups(self.document().clone(), groups).order()
    }

    /// Move nodes in the document so that, within each group, document order
    /// matches slot order. Nodes already in order are not touched.
    pub fn order(&self) -> Self {
        for group in self.groups() {
            let mut next: Option<NodeId> = None;
            for &node in group.nodes.iter().rev().flatten() {
                if let Some(next_node) = next {
                    let result = self.document().write(|t| -> horizon_bind_core::Result<()> {
                        if precedes(t, node, next_node) {
                            return Ok(());
                        }
                        match t.parent(next_node)? {
                            Some(parent) => t.insert_before(parent, node, Some(next_node)),
                            None => Ok(()),
                        }
                    });
                    self.report("order", node, result);
                }
                next = Some(node);
            }
        }
        self.clone()
    }

    /// Move each node to be the last child of its parent.
    pub fn raise(&self) -> Self {
        for node in self.nodes() {
            let result = self.document().write(|t| t.raise(node));
            self.report("raise", node, result);
        }
        self.clone()
    }

    /// Move each node to be the first child of its parent.
    pub fn lower(&self) -> Self {
        for node in self.nodes() {
            let result = self.document().write(|t| t.lower(node));
            self.report("lower", node, result);
        }
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::select::{select_all, selection};
    use horizon_bind_core::Document;

    fn build(doc: &Document, data: &[(i32, &'static str)]) -> Selection<(i32, &'static str)> {
        let ul = selection::<()>(doc).append("ul").unwrap();
        for &d in data {
            ul.append("li").unwrap().datum(d);
        }
        select_all(doc, "li")
    }

    fn labels(doc: &Document) -> Vec<&'static str> {
        select_all::<(i32, &'static str)>(doc, "li")
            .data_values()
            .into_iter()
            .map(|(_, l)| l)
            .collect()
    }

    #[test]
    fn test_sort_is_stable_and_reorders_document() {
        let doc = Document::new();
        let items = build(&doc, &[(2, "a"), (1, "b"), (2, "c"), (1, "d"), (0, "e")]);
        let sorted = items.sort_by(|x, y| x.0.cmp(&y.0));
        let in_selection: Vec<&str> = sorted.data_values().into_iter().map(|(_, l)| l).collect();
        assert_eq!(in_selection, vec!["e", "b", "d", "a", "c"]);
        assert_eq!(labels(&doc), vec!["e", "b", "d", "a", "c"]);
        // The source selection is unchanged.
        assert_eq!(items.data_values()[0].1, "a");
    }

    #[test]
    fn test_empty_slots_sort_last() {
        let doc = Document::new();
        let items = build(&doc, &[(3, "a"), (1, "b")]);
        let gappy = items.select_with(|ctx| (ctx.index == 1).then(|| ctx.element.id()));
        let sorted = gappy.sort_by(|x, y| x.0.cmp(&y.0));
        assert_eq!(sorted.groups()[0].nodes()[1], None);
        assert!(sorted.groups()[0].nodes()[0].is_some());
    }

    #[test]
    fn test_order_is_idempotent() {
        let doc = Document::new();
        let items = build(&doc, &[(1, "a"), (2, "b"), (3, "c")]);
        let reversed = Selection::<(i32, &'static str)>::from_groups(
            doc.clone(),
            vec![Group::new(
                items.nodes().into_iter().rev().map(Some).collect(),
                items.groups()[0].parent(),
            )],
        );
        reversed.order();
        assert_eq!(labels(&doc), vec!["c", "b", "a"]);
        reversed.order();
        assert_eq!(labels(&doc), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_order_leaves_interleaved_siblings() {
        let doc = Document::new();
        let items = build(&doc, &[(1, "a"), (2, "b")]);
        let ul = select_all::<()>(&doc, "ul");
        let first = items.nodes()[0];
        // A non-selected sibling between the two selected nodes.
        doc.write(|t| {
            let extra = t.create_element("hr");
            let second = t.next_sibling(first).unwrap();
            t.insert_before(ul.nodes()[0], extra, second).unwrap();
        });
        let before = doc.read(|t| t.children(ul.nodes()[0]).unwrap().to_vec());
        items.order();
        let after = doc.read(|t| t.children(ul.nodes()[0]).unwrap().to_vec());
        assert_eq!(before, after);
    }

    #[test]
    fn test_raise_and_lower() {
        let doc = Document::new();
        let items = build(&doc, &[(1, "a"), (2, "b"), (3, "c")]);
        items.filter_with(|ctx| ctx.index == 0).raise();
        assert_eq!(labels(&doc), vec!["b", "c", "a"]);
        items.filter_with(|ctx| ctx.index == 2).lower();
        assert_eq!(labels(&doc), vec!["c", "b", "a"]);
    }
}
