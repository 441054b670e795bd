//! Typed selections of document nodes.
//!
//! A [`Selection<D>`] is an ordered list of [`Group`]s. Each group holds
//! node slots that share one parent; a slot may be empty. The datum bound
//! to each node lives on the node itself, so slots and data stay aligned by
//! construction. `D` is the type the datum is read back as.
//!
//! Selections are cheap value handles. Traversal and joins produce new
//! selections; mutators change the document and return the same selection
//! for chaining.
//!
//! Callbacks receive a [`Context`] naming the focal element explicitly. No
//! lock on the document is held while a callback runs.

mod events;
mod modify;
mod order;
mod value;

pub use value::{AttrValue, Priority};

use std::any::{Any, type_name};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use horizon_bind_core::logging::targets;
use horizon_bind_core::{Datum, Document, Element, NodeId};

use crate::matcher;

/// Types that can be bound to nodes as data.
pub trait Bindable: Any + Send + Sync + Clone {}

impl<T: Any + Send + Sync + Clone> Bindable for T {}

/// One group of a selection: node slots sharing a parent.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Group {
    pub(crate) nodes: Vec<Option<NodeId>>,
    pub(crate) parent: Option<NodeId>,
}

impl Group {
    /// Create a group.
    pub fn new(nodes: Vec<Option<NodeId>>, parent: Option<NodeId>) -> Self {
        Self { nodes, parent }
    }

    /// The slots of this group, empty slots included.
    pub fn nodes(&self) -> &[Option<NodeId>] {
        &self.nodes
    }

    /// The parent node shared by the group.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Number of slots, empty slots included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the group has no slots.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of non-empty slots.
    pub fn size(&self) -> usize {
        self.nodes.iter().flatten().count()
    }
}

/// What a per-node callback receives.
pub struct Context<'a, D> {
    /// The focal element.
    pub element: &'a Element,
    /// The element's datum, if it is a `D`.
    pub datum: Option<&'a D>,
    /// Slot index within the group.
    pub index: usize,
    /// The group being visited.
    pub group: &'a Group,
}

impl<D> Clone for Context<'_, D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<D> Copy for Context<'_, D> {}

impl<D: fmt::Debug> fmt::Debug for Context<'_, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("element", &self.element.id())
            .field("datum", &self.datum)
            .field("index", &self.index)
            .finish()
    }
}

/// A grouped selection of nodes whose data are read as `D`.
pub struct Selection<D> {
    document: Document,
    groups: Vec<Group>,
    _marker: PhantomData<fn() -> D>,
}

static_assertions::assert_impl_all!(Selection<String>: Send, Sync, Clone);

impl<D> Clone for Selection<D> {
    fn clone(&self) -> Self {
        Self {
            document: self.document.clone(),
            groups: self.groups.clone(),
            _marker: PhantomData,
        }
    }
}

impl<D> fmt::Debug for Selection<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Selection")
            .field("datum", &type_name::<D>())
            .field("groups", &self.groups)
            .finish()
    }
}

impl<D> PartialEq for Selection<D> {
    fn eq(&self, other: &Self) -> bool {
        self.document.ptr_eq(&other.document) && self.groups == other.groups
    }
}

impl<D: Bindable> Selection<D> {
    /// Build a selection from raw groups.
    pub fn from_groups(document: Document, groups: Vec<Group>) -> Self {
        Self {
            document,
            groups,
            _marker: PhantomData,
        }
    }

    /// The document the selection belongs to.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// The groups of this selection.
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Reinterpret the bound data as another type. Nodes are unchanged;
    /// data that is not an `E` reads as absent.
    pub fn retype<E: Bindable>(&self) -> Selection<E> {
        Selection::from_groups(self.document.clone(), self.groups.clone())
    }

    // =========================================================================
    // Callback plumbing
    // =========================================================================

    /// Run `f` with the context of one node. The datum is fetched under a
    /// short read lock that is released before `f` runs.
    pub(crate) fn contextualize<R>(
        &self,
        group: &Group,
        index: usize,
        node: NodeId,
        f: impl FnOnce(Context<'_, D>) -> R,
    ) -> R {
        let element = self.document.element(node);
        let datum = self.raw_datum(node);
        let typed = datum.as_deref().and_then(|d| d.downcast_ref::<D>());
        f(Context {
            element: &element,
            datum: typed,
            index,
            group,
        })
    }

    /// Visit every non-empty slot in order.
    pub(crate) fn visit(&self, mut f: impl FnMut(Context<'_, D>)) {
        for group in &self.groups {
            for (index, node) in group.nodes.iter().enumerate() {
                if let Some(node) = *node {
                    self.contextualize(group, index, node, &mut f);
                }
            }
        }
    }

    pub(crate) fn raw_datum(&self, node: NodeId) -> Option<Datum> {
        self.document.read(|t| t.datum(node).ok().flatten())
    }

    /// Log a per-node failure and carry on with the remaining nodes.
    pub(crate) fn report(&self, operation: &str, node: NodeId, result: horizon_bind_core::Result<()>) {
        if let Err(error) = result {
            tracing::warn!(target: targets::SELECTION, operation, ?node, %error, "skipping node");
        }
    }

    fn propagate_datum(&self, from: NodeId, to: NodeId) {
        if let Some(datum) = self.raw_datum(from) {
            let result = self.document.write(|t| t.set_datum(to, Some(datum)));
            self.report("propagate datum", to, result);
        }
    }

    // =========================================================================
    // Sub-selection
    // =========================================================================

    /// For each node, select the first descendant matching `selector`.
    ///
    /// The matched node inherits the source node's datum. A node without a
    /// match leaves an empty slot. Malformed selectors match nothing.
    pub fn select(&self, selector: &str) -> Selection<D> {
        self.select_with(matcher::selector(selector))
    }

    /// For each node, select the node returned by `f`.
    pub fn select_with<F>(&self, mut f: F) -> Selection<D>
    where
        F: FnMut(Context<'_, D>) -> Option<NodeId>,
    {
        let mut groups = Vec::with_capacity(self.groups.len());
        for group in &self.groups {
            let mut nodes = Vec::with_capacity(group.nodes.len());
            for (index, node) in group.nodes.iter().enumerate() {
                let selected = node.and_then(|node| {
                    let sub = self.contextualize(group, index, node, &mut f)?;
                    self.propagate_datum(node, sub);
                    Some(sub)
                });
                nodes.push(selected);
            }
            groups.push(Group::new(nodes, group.parent));
        }
        Selection::from_groups(self.document.clone(), groups)
    }

    /// For each node, select every descendant matching `selector` as a new
    /// group whose parent is that node. Data does not propagate.
    pub fn select_all<E: Bindable>(&self, selector: &str) -> Selection<E> {
        self.select_all_with(matcher::selector_all(selector))
    }

    /// For each node, select the nodes returned by `f` as a new group.
    pub fn select_all_with<E, F>(&self, mut f: F) -> Selection<E>
    where
        E: Bindable,
        F: FnMut(Context<'_, D>) -> Vec<NodeId>,
    {
        let mut groups = Vec::new();
        for group in &self.groups {
            for (index, node) in group.nodes.iter().enumerate() {
                if let Some(node) = *node {
                    let found = self.contextualize(group, index, node, &mut f);
                    groups.push(Group::new(found.into_iter().map(Some).collect(), Some(node)));
                }
            }
        }
        Selection::from_groups(self.document.clone(), groups)
    }

    /// For each node, select its first element child matching `selector`.
    pub fn select_child(&self, selector: &str) -> Selection<D> {
        let children = matcher::child_selector_all(selector);
        self.select_with(|ctx| children(ctx).into_iter().next())
    }

    /// For each node, select its element children matching `selector`.
    pub fn select_children<E: Bindable>(&self, selector: &str) -> Selection<E> {
        self.select_all_with(matcher::child_selector_all(selector))
    }

    /// Keep the nodes matching `selector`, dropping the rest without
    /// leaving gaps.
    pub fn filter(&self, selector: &str) -> Selection<D> {
        self.filter_with(matcher::matcher(selector))
    }

    /// Keep the nodes for which `predicate` holds.
    pub fn filter_with<F>(&self, mut predicate: F) -> Selection<D>
    where
        F: FnMut(Context<'_, D>) -> bool,
    {
        let mut groups = Vec::with_capacity(self.groups.len());
        for group in &self.groups {
            let mut nodes = Vec::new();
            for (index, node) in group.nodes.iter().enumerate() {
                if let Some(node) = *node {
                    if self.contextualize(group, index, node, &mut predicate) {
                        nodes.push(Some(node));
                    }
                }
            }
            groups.push(Group::new(nodes, group.parent));
        }
        Selection::from_groups(self.document.clone(), groups)
    }

    /// Combine with `other` slot by slot, filling this selection's empty
    /// slots from `other`. Groups and parents come from `self`.
    pub fn merge(&self, other: &Selection<D>) -> Selection<D> {
        let groups = self
            .groups
            .iter()
            .enumerate()
            .map(|(j, group)| match other.groups.get(j) {
                Some(other_group) => {
                    let nodes = group
                        .nodes
                        .iter()
                        .enumerate()
                        .map(|(i, node)| node.or_else(|| other_group.nodes.get(i).copied().flatten()))
                        .collect();
                    Group::new(nodes, group.parent)
                }
                None => group.clone(),
            })
            .collect();
        Selection::from_groups(self.document.clone(), groups)
    }

    // =========================================================================
    // Data
    // =========================================================================

    /// Bind the same datum to every node, without computing a join.
    pub fn datum<T: Bindable>(&self, value: T) -> Selection<T> {
        let shared: Datum = Arc::new(value);
        for node in self.nodes() {
            let datum = Arc::clone(&shared);
            let result = self.document.write(|t| t.set_datum(node, Some(datum)));
            self.report("datum", node, result);
        }
        self.retype()
    }

    /// Bind a per-node datum computed by `f`. `None` clears the datum.
    pub fn datum_with<T, F>(&self, mut f: F) -> Selection<T>
    where
        T: Bindable,
        F: FnMut(Context<'_, D>) -> Option<T>,
    {
        self.visit(|ctx| {
            let node = ctx.element.id();
            let datum = f(ctx).map(|v| Arc::new(v) as Datum);
            let result = self.document.write(|t| t.set_datum(node, datum));
            self.report("datum", node, result);
        });
        self.retype()
    }

    /// Remove the datum from every node.
    pub fn clear_datum(&self) -> Selection<D> {
        for node in self.nodes() {
            let result = self.document.write(|t| t.set_datum(node, None));
            self.report("clear datum", node, result);
        }
        self.clone()
    }

    /// The datum of the first non-empty node.
    pub fn datum_value(&self) -> Option<D> {
        self.node()
            .and_then(|node| self.raw_datum(node))
            .and_then(|d| d.downcast_ref::<D>().cloned())
    }

    /// The data of every node, in order. Nodes without a `D` are skipped.
    pub fn data_values(&self) -> Vec<D> {
        self.nodes()
            .into_iter()
            .filter_map(|node| self.raw_datum(node))
            .filter_map(|d| d.downcast_ref::<D>().cloned())
            .collect()
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// Number of non-empty slots across all groups.
    pub fn size(&self) -> usize {
        self.groups.iter().map(Group::size).sum()
    }

    /// Whether there are no non-empty slots.
    pub fn empty(&self) -> bool {
        self.node().is_none()
    }

    /// Every non-empty node, in order.
    pub fn nodes(&self) -> Vec<NodeId> {
        self.groups.iter().flat_map(|g| g.nodes.iter().flatten().copied()).collect()
    }

    /// The first non-empty node.
    pub fn node(&self) -> Option<NodeId> {
        self.groups.iter().flat_map(|g| g.nodes.iter().flatten()).next().copied()
    }

    /// Handles to every non-empty node.
    pub fn elements(&self) -> Vec<Element> {
        self.nodes().into_iter().map(|n| self.document.element(n)).collect()
    }
}
