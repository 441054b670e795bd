//! Selector matching algorithm.

use horizon_bind_core::{NodeId, NodeTree};

use super::{Combinator, PseudoClass, Selector, SelectorList, SelectorPart, TypeSelector};

/// Element state needed to match a single compound selector.
#[derive(Clone)]
pub struct NodeMatchContext<'a> {
    tree: &'a NodeTree,
    /// The node being matched.
    pub node: NodeId,
    /// Local tag name.
    pub tag: &'a str,
    /// Value of the `id` attribute.
    pub id: Option<&'a str>,
    /// The element's classes.
    pub classes: &'a [String],
    /// Position among element siblings, if the node has a parent.
    pub sibling_info: Option<SiblingInfo>,
    /// Number of children, text nodes included (for :empty).
    pub child_count: usize,
}

impl<'a> NodeMatchContext<'a> {
    /// Build the context for `node`. Returns `None` for text nodes and
    /// destroyed nodes, which never match.
    pub fn new(tree: &'a NodeTree, node: NodeId) -> Option<Self> {
        if !tree.is_element(node) {
            return None;
        }
        let sibling_info = tree.parent(node).ok().flatten().and_then(|parent| {
            let siblings = tree.element_children(parent).ok()?;
            let index = siblings.iter().position(|&s| s == node)?;
            Some(SiblingInfo {
                index,
                count: siblings.len(),
            })
        });
        Some(Self {
            tree,
            node,
            tag: tree.tag(node).ok()?,
            id: tree.attribute(node, "id").ok().flatten(),
            classes: tree.classes(node).ok()?,
            sibling_info,
            child_count: tree.children(node).map(<[NodeId]>::len).unwrap_or(0),
        })
    }

    /// Look up an attribute. `class` reads the class list.
    pub fn attribute(&self, name: &str) -> Option<String> {
        if name == "class" {
            if self.classes.is_empty() {
                return None;
            }
            return Some(self.classes.join(" "));
        }
        self.tree
            .attribute(self.node, name)
            .ok()
            .flatten()
            .map(str::to_string)
    }
}

/// Sibling position information.
#[derive(Debug, Clone, Copy)]
pub struct SiblingInfo {
    /// Zero-based index among element siblings.
    pub index: usize,
    /// Total number of element siblings (including self).
    pub count: usize,
}

impl SiblingInfo {
    /// Returns true if this is the first sibling.
    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    /// Returns true if this is the last sibling.
    pub fn is_last(&self) -> bool {
        self.index + 1 == self.count
    }

    /// Returns true if this is the only child.
    pub fn is_only(&self) -> bool {
        self.count == 1
    }
}

/// Selector matching engine.
pub struct SelectorMatcher;

impl SelectorMatcher {
    /// Whether `node` matches any selector in the list.
    pub fn matches(list: &SelectorList, tree: &NodeTree, node: NodeId) -> bool {
        list.selectors
            .iter()
            .any(|selector| Self::matches_selector(selector, tree, node))
    }

    /// Whether `node` matches a complex selector.
    ///
    /// Walks the selector from right to left; combinators are resolved
    /// against the whole document, not just a query scope.
    pub fn matches_selector(selector: &Selector, tree: &NodeTree, node: NodeId) -> bool {
        match selector.parts.len() {
            0 => false,
            len => Self::matches_from(selector, len - 1, tree, node),
        }
    }

    fn matches_from(selector: &Selector, index: usize, tree: &NodeTree, node: NodeId) -> bool {
        let Some(context) = NodeMatchContext::new(tree, node) else {
            return false;
        };
        if !Self::part_matches(&selector.parts[index], &context) {
            return false;
        }
        if index == 0 {
            return true;
        }

        let next = index - 1;
        match selector.combinators[next] {
            Combinator::Descendant => tree
                .ancestors(node)
                .unwrap_or_default()
                .into_iter()
                .any(|ancestor| Self::matches_from(selector, next, tree, ancestor)),
            Combinator::Child => tree
                .parent(node)
                .ok()
                .flatten()
                .is_some_and(|parent| Self::matches_from(selector, next, tree, parent)),
            Combinator::AdjacentSibling => Self::previous_element_siblings(tree, node)
                .first()
                .is_some_and(|&sibling| Self::matches_from(selector, next, tree, sibling)),
            Combinator::GeneralSibling => Self::previous_element_siblings(tree, node)
                .into_iter()
                .any(|sibling| Self::matches_from(selector, next, tree, sibling)),
        }
    }

    /// Element siblings before `node`, nearest first.
    fn previous_element_siblings(tree: &NodeTree, node: NodeId) -> Vec<NodeId> {
        let Some(parent) = tree.parent(node).ok().flatten() else {
            return Vec::new();
        };
        let siblings = tree.element_children(parent).unwrap_or_default();
        let position = siblings.iter().position(|&s| s == node).unwrap_or(0);
        siblings[..position].iter().rev().copied().collect()
    }

    /// Check if a compound selector matches the node.
    pub fn part_matches(part: &SelectorPart, context: &NodeMatchContext<'_>) -> bool {
        if let Some(TypeSelector::Type(name)) = &part.type_selector {
            if !name.eq_ignore_ascii_case(context.tag) {
                return false;
            }
        }

        if let Some(id) = &part.id {
            if context.id != Some(id.as_str()) {
                return false;
            }
        }

        for class in &part.classes {
            if !context.classes.iter().any(|c| c == class) {
                return false;
            }
        }

        for attribute in &part.attributes {
            if !attribute.matches(context.attribute(&attribute.name).as_deref()) {
                return false;
            }
        }

        part.pseudo_classes
            .iter()
            .all(|pseudo| Self::pseudo_matches(pseudo, context))
    }

    fn pseudo_matches(pseudo: &PseudoClass, context: &NodeMatchContext<'_>) -> bool {
        match pseudo {
            PseudoClass::Root => context.node == context.tree.root(),
            PseudoClass::FirstChild => context.sibling_info.is_some_and(|s| s.is_first()),
            PseudoClass::LastChild => context.sibling_info.is_some_and(|s| s.is_last()),
            PseudoClass::OnlyChild => context.sibling_info.is_some_and(|s| s.is_only()),
            PseudoClass::NthChild(expr) => context.sibling_info.is_some_and(|s| expr.matches(s.index)),
            PseudoClass::NthLastChild(expr) => context
                .sibling_info
                .is_some_and(|s| expr.matches(s.count - 1 - s.index)),
            PseudoClass::Empty => context.child_count == 0,
            PseudoClass::Not(inner) => !Self::part_matches(inner, context),
        }
    }

    /// First element below `scope` (document order) matching the list.
    pub fn query_first(list: &SelectorList, tree: &NodeTree, scope: NodeId) -> Option<NodeId> {
        tree.element_descendants(scope)
            .ok()?
            .into_iter()
            .find(|&node| Self::matches(list, tree, node))
    }

    /// All elements below `scope` matching the list, in document order.
    pub fn query_all(list: &SelectorList, tree: &NodeTree, scope: NodeId) -> Vec<NodeId> {
        tree.element_descendants(scope)
            .unwrap_or_default()
            .into_iter()
            .filter(|&node| Self::matches(list, tree, node))
            .collect()
    }

    /// Element children of `parent` matching the list.
    pub fn matching_children(list: &SelectorList, tree: &NodeTree, parent: NodeId) -> Vec<NodeId> {
        tree.element_children(parent)
            .unwrap_or_default()
            .into_iter()
            .filter(|&node| Self::matches(list, tree, node))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::{AttributeSelector, NthExpr};
    use horizon_bind_core::DocumentConfig;

    /// html > body > (ul#list > li.a, li.b, li.a.c) + p
    fn sample() -> (NodeTree, Vec<NodeId>) {
        let mut tree = NodeTree::new(&DocumentConfig::default());
        let root = tree.root();
        let body = tree.create_element("body");
        tree.append_child(root, body).unwrap();
        let ul = tree.create_element("ul");
        tree.append_child(body, ul).unwrap();
        tree.set_attribute(ul, "id", "list").unwrap();
        let mut items = Vec::new();
        for classes in [&["a"][..], &["b"], &["a", "c"]] {
            let li = tree.create_element("li");
            tree.append_child(ul, li).unwrap();
            for class in classes {
                tree.add_class(li, class).unwrap();
            }
            items.push(li);
        }
        let p = tree.create_element("p");
        tree.append_child(body, p).unwrap();
        (tree, vec![body, ul, items[0], items[1], items[2], p])
    }

    fn ctx(tree: &NodeTree, node: NodeId) -> NodeMatchContext<'_> {
        NodeMatchContext::new(tree, node).unwrap()
    }

    #[test]
    fn test_type_selector_matches() {
        let (tree, nodes) = sample();
        let context = ctx(&tree, nodes[1]);
        assert!(SelectorMatcher::part_matches(&SelectorPart::type_only("ul"), &context));
        assert!(SelectorMatcher::part_matches(&SelectorPart::type_only("UL"), &context));
        assert!(!SelectorMatcher::part_matches(&SelectorPart::type_only("li"), &context));
        assert!(SelectorMatcher::part_matches(&SelectorPart::universal(), &context));
    }

    #[test]
    fn test_class_and_id_selectors_match() {
        let (tree, nodes) = sample();
        let third = ctx(&tree, nodes[4]);
        let part = SelectorPart::new().with_class("a").with_class("c");
        assert!(SelectorMatcher::part_matches(&part, &third));
        let part = SelectorPart::new().with_class("a").with_class("b");
        assert!(!SelectorMatcher::part_matches(&part, &third));

        let list = ctx(&tree, nodes[1]);
        assert!(SelectorMatcher::part_matches(&SelectorPart::id_only("list"), &list));
        assert!(!SelectorMatcher::part_matches(&SelectorPart::id_only("other"), &list));
    }

    #[test]
    fn test_attribute_selector_matches() {
        let (tree, nodes) = sample();
        let list = ctx(&tree, nodes[1]);
        let part = SelectorPart::new().with_attribute(AttributeSelector::exists("id"));
        assert!(SelectorMatcher::part_matches(&part, &list));
        let part = SelectorPart::new().with_attribute(AttributeSelector::equals("class", "a c"));
        assert!(SelectorMatcher::part_matches(&part, &ctx(&tree, nodes[4])));
    }

    #[test]
    fn test_structural_pseudo_class_matches() {
        let (tree, nodes) = sample();
        let first = ctx(&tree, nodes[2]);
        let last = ctx(&tree, nodes[4]);
        let first_child = SelectorPart::new().with_pseudo(PseudoClass::FirstChild);
        let last_child = SelectorPart::new().with_pseudo(PseudoClass::LastChild);
        assert!(SelectorMatcher::part_matches(&first_child, &first));
        assert!(!SelectorMatcher::part_matches(&last_child, &first));
        assert!(SelectorMatcher::part_matches(&last_child, &last));

        let nth_last = SelectorPart::new().with_pseudo(PseudoClass::NthLastChild(NthExpr::new(0, 1)));
        assert!(SelectorMatcher::part_matches(&nth_last, &last));

        let empty = SelectorPart::new().with_pseudo(PseudoClass::Empty);
        assert!(SelectorMatcher::part_matches(&empty, &first));
        assert!(!SelectorMatcher::part_matches(&empty, &ctx(&tree, nodes[1])));

        let root = SelectorPart::new().with_pseudo(PseudoClass::Root);
        assert!(SelectorMatcher::part_matches(&root, &ctx(&tree, tree.root())));
    }

    #[test]
    fn test_not_pseudo_class_matches() {
        let (tree, nodes) = sample();
        let part = SelectorPart::type_only("li")
            .with_pseudo(PseudoClass::Not(Box::new(SelectorPart::class_only("a"))));
        assert!(!SelectorMatcher::part_matches(&part, &ctx(&tree, nodes[2])));
        assert!(SelectorMatcher::part_matches(&part, &ctx(&tree, nodes[3])));
    }

    #[test]
    fn test_combinators_match() {
        let (tree, nodes) = sample();
        let descendant = Selector::type_selector("body").descendant(SelectorPart::type_only("li"));
        assert!(SelectorMatcher::matches_selector(&descendant, &tree, nodes[3]));

        let child = Selector::type_selector("body").child(SelectorPart::type_only("li"));
        assert!(!SelectorMatcher::matches_selector(&child, &tree, nodes[3]));

        let adjacent = Selector::class("a").combine(Combinator::AdjacentSibling, SelectorPart::class_only("b"));
        assert!(SelectorMatcher::matches_selector(&adjacent, &tree, nodes[3]));
        assert!(!SelectorMatcher::matches_selector(&adjacent, &tree, nodes[2]));

        let general = Selector::class("b").combine(Combinator::GeneralSibling, SelectorPart::class_only("c"));
        assert!(SelectorMatcher::matches_selector(&general, &tree, nodes[4]));
    }

    #[test]
    fn test_descendant_backtracks() {
        // "ul li" must find ul even though body is checked first.
        let (tree, nodes) = sample();
        let selector = Selector::type_selector("html")
            .descendant(SelectorPart::type_only("ul"))
            .descendant(SelectorPart::type_only("li"));
        assert!(SelectorMatcher::matches_selector(&selector, &tree, nodes[2]));
    }

    #[test]
    fn test_queries() {
        let (tree, nodes) = sample();
        let list = SelectorList::single(Selector::class("a"));
        assert_eq!(SelectorMatcher::query_first(&list, &tree, tree.root()), Some(nodes[2]));
        assert_eq!(
            SelectorMatcher::query_all(&list, &tree, tree.root()),
            vec![nodes[2], nodes[4]]
        );
        let any = SelectorList::single(Selector::universal());
        assert_eq!(SelectorMatcher::matching_children(&any, &tree, nodes[0]), vec![nodes[1], nodes[5]]);
    }

    #[test]
    fn test_text_nodes_never_match() {
        let (mut tree, nodes) = sample();
        let text = tree.create_text("hi");
        tree.append_child(nodes[5], text).unwrap();
        assert!(NodeMatchContext::new(&tree, text).is_none());
        let any = SelectorList::single(Selector::universal());
        assert!(!SelectorMatcher::matches(&any, &tree, text));
    }
}
