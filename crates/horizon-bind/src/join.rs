//! Data joins: reconciling a selection's nodes against new data.
//!
//! A join partitions each group into three disjoint parts:
//!
//! - **update**: nodes matched with a new datum, which they now carry;
//! - **enter**: new data with no node yet, materialized later by
//!   [`EnterSelection::append`] or [`EnterSelection::insert`];
//! - **exit**: old nodes with no new datum, usually [`removed`].
//!
//! Without a key, nodes and data are matched by index. With a key, they are
//! matched by key equality. The join is computed for every group before any
//! node is touched, so a failed keyed join leaves the document unchanged.
//!
//! [`removed`]: Selection::remove

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use horizon_bind_core::logging::targets;
use horizon_bind_core::{Datum, Document, Element, NodeId, NodeTree};
use horizon_bind_selector::{SelectorMatcher, parse_or_warn};

use crate::creator::creator;
use crate::error::{Result, SelectionError};
use crate::selection::{Bindable, Group, Selection};

/// A pending node: the datum it will carry and the update node it goes
/// before.
#[derive(Debug, Clone, PartialEq)]
pub struct EnterSlot<T> {
    /// The datum the new node will be bound to.
    pub datum: T,
    /// The next update node in data order, if any.
    pub next: Option<NodeId>,
}

/// One group of an enter selection.
#[derive(Debug, Clone, PartialEq)]
pub struct EnterGroup<T> {
    slots: Vec<Option<EnterSlot<T>>>,
    parent: Option<NodeId>,
}

impl<T> EnterGroup<T> {
    /// The slots of this group, one per new datum.
    pub fn slots(&self) -> &[Option<EnterSlot<T>>] {
        &self.slots
    }

    /// The node new children are inserted into.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }
}

/// What an enter-slot creator receives.
pub struct EnterContext<'a, T> {
    /// The node the new child goes into.
    pub parent: &'a Element,
    /// The pending datum.
    pub datum: &'a T,
    /// Index of the datum within its group.
    pub index: usize,
}

impl<T> Clone for EnterContext<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for EnterContext<'_, T> {}

/// Placeholders for data that has no node yet.
#[derive(Clone)]
pub struct EnterSelection<T> {
    document: Document,
    groups: Vec<EnterGroup<T>>,
}

impl<T: fmt::Debug> fmt::Debug for EnterSelection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnterSelection")
            .field("groups", &self.groups)
            .finish()
    }
}

impl<T: Bindable> EnterSelection<T> {
    /// The document new nodes are created in.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// The groups of this selection.
    pub fn groups(&self) -> &[EnterGroup<T>] {
        &self.groups
    }

    /// Number of pending nodes.
    pub fn size(&self) -> usize {
        self.groups.iter().map(|g| g.slots.iter().flatten().count()).sum()
    }

    /// Whether nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// The pending data, in order.
    pub fn data(&self) -> Vec<T> {
        self.groups
            .iter()
            .flat_map(|g| g.slots.iter().flatten().map(|slot| slot.datum.clone()))
            .collect()
    }

    /// Create an element named `name` for every pending datum, inserted
    /// before the next update node or at the end of the parent.
    pub fn append(&self, name: &str) -> Result<Selection<T>> {
        let create = creator(name);
        self.append_with(|ctx| create(ctx.parent))
    }

    /// Like [`append`](Self::append), with nodes built by `create`.
    pub fn append_with<F>(&self, create: F) -> Result<Selection<T>>
    where
        F: FnMut(EnterContext<'_, T>) -> horizon_bind_core::Result<NodeId>,
    {
        self.materialize(create, |_, _, slot| slot.next)
    }

    /// Create an element named `name` for every pending datum, inserted
    /// before the parent's first child matching `before`, or at the end
    /// when nothing matches.
    pub fn insert(&self, name: &str, before: &str) -> Result<Selection<T>> {
        let create = creator(name);
        let list = parse_or_warn(before);
        self.materialize(
            |ctx| create(ctx.parent),
            |tree, parent, _| {
                let list = list.as_ref()?;
                SelectorMatcher::matching_children(list, tree, parent)
                    .into_iter()
                    .next()
            },
        )
    }

    fn materialize<C, P>(&self, mut create: C, mut place: P) -> Result<Selection<T>>
    where
        C: FnMut(EnterContext<'_, T>) -> horizon_bind_core::Result<NodeId>,
        P: FnMut(&NodeTree, NodeId, &EnterSlot<T>) -> Option<NodeId>,
    {
        let mut groups = Vec::with_capacity(self.groups.len());
        for (j, group) in self.groups.iter().enumerate() {
            let mut nodes = Vec::with_capacity(group.slots.len());
            for (index, slot) in group.slots.iter().enumerate() {
                let Some(slot) = slot else {
                    nodes.push(None);
                    continue;
                };
                let parent = group.parent.ok_or(SelectionError::NoParent { group: j })?;
                let parent_element = self.document.element(parent);
                let child = create(EnterContext {
                    parent: &parent_element,
                    datum: &slot.datum,
                    index,
                })?;
                let datum: Datum = Arc::new(slot.datum.clone());
                self.document.write(|t| -> horizon_bind_core::Result<()> {
                    // A reference node that has since moved elsewhere is ignored.
                    let reference = place(&*t, parent, slot)
                        .filter(|next| matches!(t.parent(*next), Ok(Some(p)) if p == parent));
                    t.insert_before(parent, child, reference)?;
                    t.set_datum(child, Some(datum))
                })?;
                tracing::trace!(target: targets::JOIN, ?parent, ?child, index, "entered node");
                nodes.push(Some(child));
            }
            groups.push(Group::new(nodes, group.parent));
        }
        Ok(Selection::from_groups(self.document.clone(), groups))
    }
}

/// The result of a data join.
#[derive(Debug, Clone)]
pub struct Join<T, D> {
    update: Selection<T>,
    enter: EnterSelection<T>,
    exit: Selection<D>,
}

impl<T: Bindable, D: Bindable> Join<T, D> {
    /// Nodes matched with new data, now bound to it.
    pub fn update(&self) -> Selection<T> {
        self.update.clone()
    }

    /// New data with no node yet.
    pub fn enter(&self) -> EnterSelection<T> {
        self.enter.clone()
    }

    /// Old nodes with no new datum. Their data is left as it was.
    pub fn exit(&self) -> Selection<D> {
        self.exit.clone()
    }

    /// Merge nodes created from the enter selection with the update
    /// selection, giving one node per datum in data order.
    pub fn merge(&self, entered: &Selection<T>) -> Selection<T> {
        entered.merge(&self.update)
    }

    /// Append an element named `name` for every entering datum, destroy the
    /// exit nodes, and return the merged selection.
    ///
    /// Exit nodes are freed, not just detached. Split the join with
    /// [`Join::into_parts`] to keep them for re-insertion.
    pub fn join(&self, name: &str) -> Result<Selection<T>> {
        let entered = self.enter.append(name)?;
        self.exit.destroy();
        Ok(self.merge(&entered))
    }

    /// Split into the update, enter and exit selections.
    pub fn into_parts(self) -> (Selection<T>, EnterSelection<T>, Selection<D>) {
        (self.update, self.enter, self.exit)
    }
}

/// One group's partition, before anything is written.
struct Partition<T> {
    data: Vec<T>,
    update: Vec<Option<NodeId>>,
    exit: Vec<Option<NodeId>>,
}

impl<T> Partition<T> {
    fn new(data: Vec<T>, old_len: usize) -> Self {
        let len = data.len();
        Self {
            data,
            update: vec![None; len],
            exit: vec![None; old_len],
        }
    }
}

fn partition_by_index<T>(group: &Group, data: Vec<T>) -> Partition<T> {
    let mut partition = Partition::new(data, group.nodes.len());
    for (i, node) in group.nodes.iter().enumerate() {
        if i < partition.data.len() {
            partition.update[i] = *node;
        } else {
            partition.exit[i] = *node;
        }
    }
    partition
}

impl<D: Bindable> Selection<D> {
    /// Join the same `values` against every group, matching by index.
    pub fn data<T: Bindable>(&self, values: Vec<T>) -> Join<T, D> {
        self.data_with(|_, _| values.clone())
    }

    /// Join per-group values, matching by index. `values` receives the
    /// group's parent and the group index.
    pub fn data_with<T, F>(&self, mut values: F) -> Join<T, D>
    where
        T: Bindable,
        F: FnMut(Option<&Element>, usize) -> Vec<T>,
    {
        let partitions = self
            .groups()
            .iter()
            .enumerate()
            .map(|(j, group)| {
                let parent = group.parent.map(|p| self.document().element(p));
                partition_by_index(group, values(parent.as_ref(), j))
            })
            .collect();
        self.apply_join(partitions)
    }

    /// Join the same `values` against every group, matching by `key`.
    ///
    /// Keys are computed for old nodes from their `T` datum and for new
    /// data from the values. Old nodes without a `T` datum, and old nodes
    /// repeating an earlier key, exit.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::DuplicateKey`] if two new values in one
    /// group share a key. The document is not modified in that case.
    pub fn data_keyed<T, K, KF>(&self, values: Vec<T>, key: KF) -> Result<Join<T, D>>
    where
        T: Bindable,
        K: Eq + Hash + fmt::Debug,
        KF: FnMut(&T, usize) -> K,
    {
        self.data_keyed_with(|_, _| values.clone(), key)
    }

    /// Join per-group values, matching by `key`.
    pub fn data_keyed_with<T, K, F, KF>(&self, mut values: F, mut key: KF) -> Result<Join<T, D>>
    where
        T: Bindable,
        K: Eq + Hash + fmt::Debug,
        F: FnMut(Option<&Element>, usize) -> Vec<T>,
        KF: FnMut(&T, usize) -> K,
    {
        let mut partitions = Vec::with_capacity(self.groups().len());
        for (j, group) in self.groups().iter().enumerate() {
            let parent = group.parent.map(|p| self.document().element(p));
            let data = values(parent.as_ref(), j);

            let mut new_keys = HashMap::with_capacity(data.len());
            for (i, value) in data.iter().enumerate() {
                match new_keys.entry(key(value, i)) {
                    Entry::Occupied(entry) => {
                        return Err(SelectionError::duplicate_key(j, i, format!("{:?}", entry.key())));
                    }
                    Entry::Vacant(entry) => {
                        entry.insert(i);
                    }
                }
            }

            let mut partition = Partition::new(data, group.nodes.len());
            let mut old_keys: HashMap<K, (usize, NodeId)> = HashMap::new();
            for (i, node) in group.nodes.iter().enumerate() {
                let Some(node) = *node else { continue };
                let old = self.raw_datum(node);
                let Some(old) = old.as_deref().and_then(|d| d.downcast_ref::<T>()) else {
                    partition.exit[i] = Some(node);
                    continue;
                };
                match old_keys.entry(key(old, i)) {
                    Entry::Occupied(_) => partition.exit[i] = Some(node),
                    Entry::Vacant(entry) => {
                        entry.insert((i, node));
                    }
                }
            }

            for (k, i) in new_keys {
                if let Some((_, node)) = old_keys.remove(&k) {
                    partition.update[i] = Some(node);
                }
            }
            for (_, (i, node)) in old_keys {
                partition.exit[i] = Some(node);
            }
            partitions.push(partition);
        }
        Ok(self.apply_join(partitions))
    }

    /// Bind update data and build the three selections.
    fn apply_join<T: Bindable>(&self, partitions: Vec<Partition<T>>) -> Join<T, D> {
        let document = self.document().clone();
        let mut update_groups = Vec::with_capacity(partitions.len());
        let mut enter_groups = Vec::with_capacity(partitions.len());
        let mut exit_groups = Vec::with_capacity(partitions.len());

        for (j, (group, partition)) in self.groups().iter().zip(partitions).enumerate() {
            let Partition { data, update, exit } = partition;

            for (node, value) in update.iter().zip(&data) {
                if let Some(node) = *node {
                    let datum: Datum = Arc::new(value.clone());
                    let result = document.write(|t| t.set_datum(node, Some(datum)));
                    self.report("data", node, result);
                }
            }

            let mut slots = Vec::with_capacity(data.len());
            let mut ahead = 0;
            for (i, value) in data.into_iter().enumerate() {
                if update[i].is_some() {
                    slots.push(None);
                    continue;
                }
                // The next update node at or after i + 1.
                ahead = ahead.max(i + 1);
                while ahead < update.len() && update[ahead].is_none() {
                    ahead += 1;
                }
                let next = update.get(ahead).copied().flatten();
                slots.push(Some(EnterSlot { datum: value, next }));
            }

            tracing::debug!(
                target: targets::JOIN,
                group = j,
                update = update.iter().flatten().count(),
                enter = slots.iter().flatten().count(),
                exit = exit.iter().flatten().count(),
                "joined data"
            );

            update_groups.push(Group::new(update, group.parent));
            enter_groups.push(EnterGroup {
                slots,
                parent: group.parent,
            });
            exit_groups.push(Group::new(exit, group.parent));
        }

        Join {
            update: Selection::from_groups(document.clone(), update_groups),
            enter: EnterSelection {
                document: document.clone(),
                groups: enter_groups,
            },
            exit: Selection::from_groups(document, exit_groups),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::select::{select, selection};

    fn list(doc: &Document, data: &[i32]) -> Selection<i32> {
        let ul = selection::<()>(doc).append("ul").unwrap();
        ul.select_all::<()>("li")
            .data(data.to_vec())
            .join("li")
            .unwrap()
    }

    fn bound(doc: &Document) -> Vec<i32> {
        select::<()>(doc, "ul").select_all::<i32>("li").data_values()
    }

    #[test]
    fn test_index_join_partitions() {
        let doc = Document::new();
        list(&doc, &[1, 2, 3]);
        let items = select::<()>(&doc, "ul").select_all::<i32>("li");

        let join = items.data(vec![10, 20]);
        assert_eq!(join.update().data_values(), vec![10, 20]);
        assert!(join.enter().is_empty());
        assert_eq!(join.exit().size(), 1);
        assert_eq!(join.exit().data_values(), vec![3]);

        let join = items.data(vec![7, 8, 9, 10]);
        assert_eq!(join.update().size(), 3);
        assert_eq!(join.enter().data(), vec![10]);
        assert!(join.exit().empty());
    }

    #[test]
    fn test_enter_slot_next_points_at_following_update() {
        let doc = Document::new();
        list(&doc, &[1, 3]);
        let items = select::<()>(&doc, "ul").select_all::<i32>("li");
        let nodes = items.nodes();

        let join = items.data_keyed(vec![0, 1, 2, 3, 4], |d, _| *d).unwrap();
        let slots = join.enter().groups()[0].slots().to_vec();
        let next: Vec<Option<Option<NodeId>>> = slots.iter().map(|s| s.as_ref().map(|s| s.next)).collect();
        assert_eq!(
            next,
            vec![Some(Some(nodes[0])), None, Some(Some(nodes[1])), None, Some(None)]
        );

        let merged = join.merge(&join.enter().append("li").unwrap());
        assert_eq!(merged.data_values(), vec![0, 1, 2, 3, 4]);
        assert_eq!(bound(&doc), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_keyed_join_moves_nothing_until_order() {
        let doc = Document::new();
        list(&doc, &[1, 2, 3]);
        let items = select::<()>(&doc, "ul").select_all::<i32>("li");
        let join = items.data_keyed(vec![3, 1], |d, _| *d).unwrap();
        assert_eq!(join.update().data_values(), vec![3, 1]);
        assert_eq!(join.exit().data_values(), vec![2]);

        join.exit().remove();
        assert_eq!(bound(&doc), vec![1, 3]);
        join.update().order();
        assert_eq!(bound(&doc), vec![3, 1]);
    }

    #[test]
    fn test_duplicate_new_key_fails_without_writing() {
        let doc = Document::new();
        list(&doc, &[1, 2]);
        let items = select::<()>(&doc, "ul").select_all::<i32>("li");
        let err = items.data_keyed(vec![5, 6, 5], |d, _| *d).unwrap_err();
        assert_eq!(err, SelectionError::duplicate_key(0, 2, "5"));
        assert_eq!(bound(&doc), vec![1, 2]);
    }

    #[test]
    fn test_duplicate_old_key_exits() {
        let doc = Document::new();
        list(&doc, &[1, 1, 2]);
        let items = select::<()>(&doc, "ul").select_all::<i32>("li");
        let join = items.data_keyed(vec![1, 2], |d, _| *d).unwrap();
        assert_eq!(join.update().size(), 2);
        assert_eq!(join.exit().nodes(), vec![items.nodes()[1]]);
    }

    #[test]
    fn test_foreign_datum_exits_in_keyed_join() {
        let doc = Document::new();
        list(&doc, &[1, 2]);
        let items = select::<()>(&doc, "ul").select_all::<i32>("li");
        items.filter_with(|ctx| ctx.index == 0).datum("text");
        let join = items.data_keyed(vec![1, 2], |d, _| *d).unwrap();
        assert_eq!(join.exit().nodes(), vec![items.nodes()[0]]);
        assert_eq!(join.enter().data(), vec![1]);
        assert_eq!(join.exit().retype::<&'static str>().data_values(), vec!["text"]);
    }

    #[test]
    fn test_per_group_values_from_parent() {
        let doc = Document::new();
        let table = selection::<()>(&doc).append("table").unwrap();
        let rows = table
            .select_all::<()>("tr")
            .data(vec![vec![1, 2], vec![3, 4, 5]])
            .join("tr")
            .unwrap();
        let cells = rows
            .select_all::<()>("td")
            .data_with(|parent, _| parent.and_then(|p| p.datum::<Vec<i32>>()).unwrap_or_default())
            .join("td")
            .unwrap();
        assert_eq!(cells.groups().len(), 2);
        assert_eq!(cells.groups()[1].len(), 3);
        assert_eq!(cells.data_values(), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_enter_without_parent_fails() {
        let doc = Document::new();
        let join = selection::<()>(&doc).select_with(|_| None).data(vec![1]);
        let err = join.enter().append("p").unwrap_err();
        assert_eq!(err, SelectionError::NoParent { group: 0 });
    }

    #[test]
    fn test_enter_insert_before_matching_child() {
        let doc = Document::new();
        let ul = selection::<()>(&doc).append("ul").unwrap();
        ul.append("li").unwrap().classed("tail", true);
        let entered = ul
            .select_all::<()>("li.item")
            .data(vec!["a", "b"])
            .enter()
            .insert("li", ".tail")
            .unwrap()
            .classed("item", true);
        assert_eq!(entered.size(), 2);
        assert!(select::<()>(&doc, "li:last-child").has_classes("tail"));
    }
}
