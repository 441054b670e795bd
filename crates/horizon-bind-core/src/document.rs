//! Document model for Horizon Bind.
//!
//! Provides the host environment that selections operate on:
//! - Stable node identifiers via arena-based storage
//! - Parent-child structure with ordered children
//! - Element state: attributes, inline styles, classes, dynamic properties
//! - A bound datum per node, stored type-erased
//! - Per-node listeners and local values
//!
//! # Key Types
//!
//! - [`NodeId`] - Stable identifier for a node
//! - [`NodeTree`] - The arena holding all nodes of one document
//! - [`Document`] - Cloneable, thread-safe handle around a [`NodeTree`]
//! - [`Element`] - A `(Document, NodeId)` pair handed to callbacks
//!
//! Nodes are only created and destroyed by explicit calls. Detaching a node
//! ([`NodeTree::detach`]) keeps it alive as a parentless node so it can be
//! re-inserted later. [`NodeTree::purge_detached`] frees whatever is no
//! longer attached under the root.

use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use slotmap::{SlotMap, new_key_type};

use crate::config::DocumentConfig;
use crate::error::{DocumentError, Result};
use crate::event::{Event, EventInit, Listener, TypeName};
use crate::local::LocalId;
use crate::logging::targets;
use crate::namespace::{NamespaceMap, QualifiedName};

new_key_type! {
    /// A unique identifier for a node in a [`NodeTree`].
    ///
    /// `NodeId`s stay valid while the tree is restructured and become
    /// invalid once the node is destroyed.
    pub struct NodeId;
}

impl NodeId {
    /// Convert the NodeId to a raw u64 value.
    #[inline]
    pub fn as_raw(self) -> u64 {
        use slotmap::Key;
        self.data().as_ffi()
    }
}

/// Type-erased value bound to a node (its datum, a property, a local value).
pub type Datum = Arc<dyn Any + Send + Sync>;

/// The kind of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// An element with a tag name, attributes and children.
    Element,
    /// A text node. Text nodes have no children and are never matched by
    /// selectors.
    Text,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct StyleEntry {
    name: String,
    value: String,
    important: bool,
}

/// Internal data stored in the arena for each node.
struct NodeData {
    kind: NodeKind,
    /// Local tag name (empty for text nodes).
    tag: String,
    namespace: Option<String>,
    /// Character data of a text node.
    text: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    /// Attributes in insertion order.
    attributes: Vec<(String, String)>,
    styles: Vec<StyleEntry>,
    classes: Vec<String>,
    properties: HashMap<String, Datum>,
    datum: Option<Datum>,
    listeners: Vec<(TypeName, Listener)>,
    locals: HashMap<LocalId, Datum>,
}

impl NodeData {
    fn element(name: QualifiedName) -> Self {
        Self {
            kind: NodeKind::Element,
            tag: name.local,
            namespace: name.space,
            ..Self::text(String::new())
        }
    }

    fn text(text: String) -> Self {
        Self {
            kind: NodeKind::Text,
            tag: String::new(),
            namespace: None,
            text,
            parent: None,
            children: Vec::new(),
            attributes: Vec::new(),
            styles: Vec::new(),
            classes: Vec::new(),
            properties: HashMap::new(),
            datum: None,
            listeners: Vec::new(),
            locals: HashMap::new(),
        }
    }
}

/// The arena that owns every node of one document.
///
/// All structural and element-state operations live here; [`Document`]
/// wraps a `NodeTree` in a lock and forwards to it.
pub struct NodeTree {
    nodes: SlotMap<NodeId, NodeData>,
    root: NodeId,
    namespaces: NamespaceMap,
}

impl NodeTree {
    /// Create a tree containing only the configured root element.
    pub fn new(config: &DocumentConfig) -> Self {
        let namespaces = config.namespace_map();
        let mut name = namespaces.resolve(&config.root_tag);
        if name.space.is_none() {
            name.space = config.default_namespace.clone();
        }
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(NodeData::element(name));
        Self {
            nodes,
            root,
            namespaces,
        }
    }

    /// The root element.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The namespace prefixes known to this document.
    pub fn namespaces(&self) -> &NamespaceMap {
        &self.namespaces
    }

    /// Register an extra namespace prefix.
    pub fn register_namespace(&mut self, prefix: impl Into<String>, uri: impl Into<String>) {
        self.namespaces.insert(prefix, uri);
    }

    fn node(&self, id: NodeId) -> Result<&NodeData> {
        self.nodes.get(id).ok_or(DocumentError::InvalidNodeId)
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut NodeData> {
        self.nodes.get_mut(id).ok_or(DocumentError::InvalidNodeId)
    }

    fn element_mut(&mut self, id: NodeId) -> Result<&mut NodeData> {
        let data = self.node_mut(id)?;
        if data.kind != NodeKind::Element {
            return Err(DocumentError::NotAnElement);
        }
        Ok(data)
    }

    // =========================================================================
    // Creation / Destruction
    // =========================================================================

    /// Create a detached element. A prefixed name (`svg:g`) is resolved
    /// through the document's namespace map.
    pub fn create_element(&mut self, name: &str) -> NodeId {
        let qualified = self.namespaces.resolve(name);
        self.create_qualified(qualified)
    }

    /// Create a detached element from an already resolved name.
    pub fn create_qualified(&mut self, name: QualifiedName) -> NodeId {
        let id = self.nodes.insert(NodeData::element(name));
        tracing::trace!(target: targets::DOCUMENT, ?id, "created element");
        id
    }

    /// Create a detached element whose namespace is inherited from `parent`
    /// when `name` carries no known prefix.
    pub fn create_element_for(&mut self, parent: NodeId, name: &str) -> Result<NodeId> {
        let mut qualified = self.namespaces.resolve(name);
        if qualified.space.is_none() {
            qualified.space = self.node(parent)?.namespace.clone();
        }
        Ok(self.create_qualified(qualified))
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.nodes.insert(NodeData::text(text.into()))
    }

    /// Remove a node and its whole subtree from the arena.
    #[tracing::instrument(skip(self), target = "horizon_bind_core::document", level = "trace")]
    pub fn destroy(&mut self, id: NodeId) -> Result<()> {
        if id == self.root {
            return Err(DocumentError::RootNode);
        }
        let descendants = self.descendants(id)?;
        self.detach(id)?;
        for descendant in descendants {
            self.nodes.remove(descendant);
        }
        self.nodes.remove(id);
        Ok(())
    }

    /// Free every node that is not attached under the root, returning how
    /// many were freed. Detached nodes held by a selection become invalid.
    pub fn purge_detached(&mut self) -> usize {
        let root = self.root;
        let attached: HashSet<NodeId> = self
            .descendants(root)
            .unwrap_or_default()
            .into_iter()
            .chain(std::iter::once(root))
            .collect();
        let before = self.nodes.len();
        self.nodes.retain(|id, _| attached.contains(&id));
        let freed = before - self.nodes.len();
        if freed > 0 {
            tracing::debug!(target: targets::DOCUMENT, freed, "purged detached nodes");
        }
        freed
    }

    /// Check if a node exists.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of live nodes, attached or not.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    // =========================================================================
    // Structure
    // =========================================================================

    /// Get the kind of a node.
    pub fn kind(&self, id: NodeId) -> Result<NodeKind> {
        self.node(id).map(|d| d.kind)
    }

    /// Whether the node is an element.
    pub fn is_element(&self, id: NodeId) -> bool {
        self.nodes
            .get(id)
            .is_some_and(|d| d.kind == NodeKind::Element)
    }

    /// Local tag name of an element (empty for text nodes).
    pub fn tag(&self, id: NodeId) -> Result<&str> {
        self.node(id).map(|d| d.tag.as_str())
    }

    /// Namespace URI of an element.
    pub fn namespace(&self, id: NodeId) -> Result<Option<&str>> {
        self.node(id).map(|d| d.namespace.as_deref())
    }

    /// Get the parent of a node.
    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>> {
        self.node(id).map(|d| d.parent)
    }

    /// Get all children (elements and text) of a node.
    pub fn children(&self, id: NodeId) -> Result<&[NodeId]> {
        self.node(id).map(|d| d.children.as_slice())
    }

    /// Get the element children of a node.
    pub fn element_children(&self, id: NodeId) -> Result<Vec<NodeId>> {
        Ok(self
            .children(id)?
            .iter()
            .copied()
            .filter(|&child| self.is_element(child))
            .collect())
    }

    /// Whether `ancestor` is `id` or one of its ancestors.
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(current_id) = current {
            if current_id == ancestor {
                return true;
            }
            current = self.nodes.get(current_id).and_then(|d| d.parent);
        }
        false
    }

    /// Get all ancestors of a node from immediate parent to root.
    pub fn ancestors(&self, id: NodeId) -> Result<Vec<NodeId>> {
        let mut result = Vec::new();
        let mut current = self.node(id)?.parent;
        while let Some(current_id) = current {
            result.push(current_id);
            current = self.nodes.get(current_id).and_then(|d| d.parent);
        }
        Ok(result)
    }

    /// All descendants of a node in document (pre-)order, excluding the node.
    pub fn descendants(&self, id: NodeId) -> Result<Vec<NodeId>> {
        let mut result = Vec::new();
        self.descendants_recursive(id, &mut result)?;
        Ok(result)
    }

    fn descendants_recursive(&self, id: NodeId, result: &mut Vec<NodeId>) -> Result<()> {
        let data = self.node(id)?;
        for &child_id in &data.children {
            result.push(child_id);
            self.descendants_recursive(child_id, result)?;
        }
        Ok(())
    }

    /// Element descendants of a node in document order.
    pub fn element_descendants(&self, id: NodeId) -> Result<Vec<NodeId>> {
        Ok(self
            .descendants(id)?
            .into_iter()
            .filter(|&d| self.is_element(d))
            .collect())
    }

    /// Index of a node among all children of its parent.
    pub fn sibling_index(&self, id: NodeId) -> Result<Option<usize>> {
        let Some(parent_id) = self.node(id)?.parent else {
            return Ok(None);
        };
        Ok(self
            .node(parent_id)?
            .children
            .iter()
            .position(|&child| child == id))
    }

    /// Get the next sibling.
    pub fn next_sibling(&self, id: NodeId) -> Result<Option<NodeId>> {
        let Some(parent_id) = self.node(id)?.parent else {
            return Ok(None);
        };
        let children = &self.node(parent_id)?.children;
        Ok(children
            .iter()
            .position(|&child| child == id)
            .and_then(|pos| children.get(pos + 1).copied()))
    }

    /// Get the previous sibling.
    pub fn previous_sibling(&self, id: NodeId) -> Result<Option<NodeId>> {
        let Some(parent_id) = self.node(id)?.parent else {
            return Ok(None);
        };
        let children = &self.node(parent_id)?.children;
        Ok(children
            .iter()
            .position(|&child| child == id)
            .and_then(|pos| pos.checked_sub(1))
            .map(|pos| children[pos]))
    }

    /// Append `child` as the last child of `parent`, detaching it first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` into `parent` before `reference`, or at the end when
    /// `reference` is `None`. The child is detached from its old parent first.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<()> {
        if self.node(parent)?.kind != NodeKind::Element {
            return Err(DocumentError::NotAnElement);
        }
        self.node(child)?;
        if self.is_inclusive_ancestor(child, parent) {
            return Err(DocumentError::CircularParentage);
        }
        if reference == Some(child) {
            return Ok(());
        }
        if let Some(reference_id) = reference {
            if self.node(reference_id)?.parent != Some(parent) {
                return Err(DocumentError::NotAChild);
            }
        }

        self.detach(child)?;

        let parent_data = self.node_mut(parent)?;
        let position = reference
            .and_then(|r| parent_data.children.iter().position(|&c| c == r))
            .unwrap_or(parent_data.children.len());
        parent_data.children.insert(position, child);
        self.node_mut(child)?.parent = Some(parent);
        Ok(())
    }

    /// Remove a node from its parent. The node stays alive, parentless.
    pub fn detach(&mut self, id: NodeId) -> Result<()> {
        let old_parent = self.node(id)?.parent;
        if let Some(parent_id) = old_parent {
            if let Some(parent_data) = self.nodes.get_mut(parent_id) {
                parent_data.children.retain(|&child| child != id);
            }
            self.node_mut(id)?.parent = None;
            tracing::trace!(target: targets::DOCUMENT, ?id, ?parent_id, "detached node");
        }
        Ok(())
    }

    /// Move a node to the end of its parent's children.
    pub fn raise(&mut self, id: NodeId) -> Result<()> {
        if let Some(parent_id) = self.node(id)?.parent {
            let parent_data = self.node_mut(parent_id)?;
            if parent_data.children.last() != Some(&id) {
                parent_data.children.retain(|&child| child != id);
                parent_data.children.push(id);
            }
        }
        Ok(())
    }

    /// Move a node to the start of its parent's children.
    pub fn lower(&mut self, id: NodeId) -> Result<()> {
        if let Some(parent_id) = self.node(id)?.parent {
            let parent_data = self.node_mut(parent_id)?;
            if parent_data.children.first() != Some(&id) {
                parent_data.children.retain(|&child| child != id);
                parent_data.children.insert(0, id);
            }
        }
        Ok(())
    }

    /// Remove every child of a node. Removed children are destroyed.
    pub fn clear_children(&mut self, id: NodeId) -> Result<()> {
        let children = self.node(id)?.children.clone();
        for child in children {
            self.destroy(child)?;
        }
        Ok(())
    }

    // =========================================================================
    // Attributes
    // =========================================================================

    /// Get an attribute value.
    pub fn attribute(&self, id: NodeId, name: &str) -> Result<Option<&str>> {
        Ok(self
            .node(id)?
            .attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str()))
    }

    /// All attributes of an element in insertion order.
    pub fn attributes(&self, id: NodeId) -> Result<&[(String, String)]> {
        self.node(id).map(|d| d.attributes.as_slice())
    }

    /// Set an attribute, replacing any previous value.
    pub fn set_attribute(
        &mut self,
        id: NodeId,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<()> {
        let name = name.into();
        let value = value.into();
        let data = self.element_mut(id)?;
        match data.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some(entry) => entry.1 = value,
            None => data.attributes.push((name, value)),
        }
        Ok(())
    }

    /// Remove an attribute. Returns the old value.
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Result<Option<String>> {
        let data = self.element_mut(id)?;
        let position = data.attributes.iter().position(|(key, _)| key == name);
        Ok(position.map(|pos| data.attributes.remove(pos).1))
    }

    // =========================================================================
    // Inline Styles
    // =========================================================================

    /// Get an inline style value.
    pub fn style(&self, id: NodeId, name: &str) -> Result<Option<&str>> {
        Ok(self
            .node(id)?
            .styles
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.value.as_str()))
    }

    /// Whether an inline style was set with `!important` priority.
    pub fn style_is_important(&self, id: NodeId, name: &str) -> Result<bool> {
        Ok(self
            .node(id)?
            .styles
            .iter()
            .any(|entry| entry.name == name && entry.important))
    }

    /// Set an inline style.
    pub fn set_style(
        &mut self,
        id: NodeId,
        name: impl Into<String>,
        value: impl Into<String>,
        important: bool,
    ) -> Result<()> {
        let name = name.into();
        let value = value.into();
        let data = self.element_mut(id)?;
        match data.styles.iter_mut().find(|entry| entry.name == name) {
            Some(entry) => {
                entry.value = value;
                entry.important = important;
            }
            None => data.styles.push(StyleEntry {
                name,
                value,
                important,
            }),
        }
        Ok(())
    }

    /// Remove an inline style.
    pub fn remove_style(&mut self, id: NodeId, name: &str) -> Result<()> {
        self.element_mut(id)?.styles.retain(|entry| entry.name != name);
        Ok(())
    }

    /// Serialize inline styles as a `style` attribute value.
    pub fn style_text(&self, id: NodeId) -> Result<String> {
        Ok(self
            .node(id)?
            .styles
            .iter()
            .map(|entry| {
                if entry.important {
                    format!("{}: {} !important;", entry.name, entry.value)
                } else {
                    format!("{}: {};", entry.name, entry.value)
                }
            })
            .collect::<Vec<_>>()
            .join(" "))
    }

    // =========================================================================
    // Classes
    // =========================================================================

    /// The class list of an element.
    pub fn classes(&self, id: NodeId) -> Result<&[String]> {
        self.node(id).map(|d| d.classes.as_slice())
    }

    /// Whether the element has a class.
    pub fn has_class(&self, id: NodeId, class: &str) -> Result<bool> {
        Ok(self.node(id)?.classes.iter().any(|c| c == class))
    }

    /// Add a class if not already present.
    pub fn add_class(&mut self, id: NodeId, class: &str) -> Result<()> {
        let data = self.element_mut(id)?;
        if !data.classes.iter().any(|c| c == class) {
            data.classes.push(class.to_string());
        }
        Ok(())
    }

    /// Remove a class.
    pub fn remove_class(&mut self, id: NodeId, class: &str) -> Result<()> {
        self.element_mut(id)?.classes.retain(|c| c != class);
        Ok(())
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// Set a dynamic property.
    pub fn set_property<T: Any + Send + Sync>(
        &mut self,
        id: NodeId,
        name: impl Into<String>,
        value: T,
    ) -> Result<()> {
        self.element_mut(id)?
            .properties
            .insert(name.into(), Arc::new(value));
        Ok(())
    }

    /// Get a dynamic property, if present and of type `T`.
    pub fn property<T: Any>(&self, id: NodeId, name: &str) -> Result<Option<&T>> {
        Ok(self
            .node(id)?
            .properties
            .get(name)
            .and_then(|v| v.downcast_ref::<T>()))
    }

    /// Remove a dynamic property.
    pub fn remove_property(&mut self, id: NodeId, name: &str) -> Result<Option<Datum>> {
        Ok(self.element_mut(id)?.properties.remove(name))
    }

    /// Names of all dynamic properties.
    pub fn property_names(&self, id: NodeId) -> Result<Vec<&str>> {
        Ok(self
            .node(id)?
            .properties
            .keys()
            .map(String::as_str)
            .collect())
    }

    // =========================================================================
    // Text
    // =========================================================================

    /// The concatenated character data of a node and its descendants.
    pub fn text_content(&self, id: NodeId) -> Result<String> {
        let data = self.node(id)?;
        if data.kind == NodeKind::Text {
            return Ok(data.text.clone());
        }
        let mut out = String::new();
        for descendant in self.descendants(id)? {
            let d = self.node(descendant)?;
            if d.kind == NodeKind::Text {
                out.push_str(&d.text);
            }
        }
        Ok(out)
    }

    /// Replace the children of an element with a single text node.
    ///
    /// An empty string leaves the element without children.
    pub fn set_text_content(&mut self, id: NodeId, text: &str) -> Result<()> {
        let data = self.node_mut(id)?;
        if data.kind == NodeKind::Text {
            data.text = text.to_string();
            return Ok(());
        }
        self.clear_children(id)?;
        if !text.is_empty() {
            let text_node = self.create_text(text);
            self.append_child(id, text_node)?;
        }
        Ok(())
    }

    // =========================================================================
    // Datum
    // =========================================================================

    /// The datum bound to a node.
    pub fn datum(&self, id: NodeId) -> Result<Option<Datum>> {
        self.node(id).map(|d| d.datum.clone())
    }

    /// Bind (or clear, with `None`) a node's datum.
    pub fn set_datum(&mut self, id: NodeId, datum: Option<Datum>) -> Result<()> {
        self.node_mut(id)?.datum = datum;
        Ok(())
    }

    // =========================================================================
    // Listeners
    // =========================================================================

    /// Register a listener, replacing any listener with the same key.
    pub fn set_listener(&mut self, id: NodeId, key: TypeName, listener: Listener) -> Result<()> {
        let data = self.element_mut(id)?;
        match data.listeners.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = listener,
            None => data.listeners.push((key, listener)),
        }
        Ok(())
    }

    /// Remove every listener covered by `key`. Returns how many were removed.
    pub fn remove_listeners(&mut self, id: NodeId, key: &TypeName) -> Result<usize> {
        let data = self.element_mut(id)?;
        let before = data.listeners.len();
        data.listeners.retain(|(k, _)| !key.covers(k));
        Ok(before - data.listeners.len())
    }

    /// The listener registered under exactly `key`.
    pub fn listener(&self, id: NodeId, key: &TypeName) -> Result<Option<Listener>> {
        Ok(self
            .node(id)?
            .listeners
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, l)| Arc::clone(l)))
    }

    fn listeners_for(&self, id: NodeId, event_type: &str) -> Vec<Listener> {
        self.nodes
            .get(id)
            .map(|d| {
                d.listeners
                    .iter()
                    .filter(|(k, _)| k.event_type == event_type)
                    .map(|(_, l)| Arc::clone(l))
                    .collect()
            })
            .unwrap_or_default()
    }

    // =========================================================================
    // Local values
    // =========================================================================

    pub(crate) fn local_value(&self, id: NodeId, local: LocalId) -> Result<Option<Datum>> {
        Ok(self.node(id)?.locals.get(&local).cloned())
    }

    pub(crate) fn set_local_value(&mut self, id: NodeId, local: LocalId, value: Datum) -> Result<()> {
        self.node_mut(id)?.locals.insert(local, value);
        Ok(())
    }

    pub(crate) fn remove_local_value(&mut self, id: NodeId, local: LocalId) -> Result<bool> {
        Ok(self.node_mut(id)?.locals.remove(&local).is_some())
    }

    /// The raw character data of a text node (empty for elements).
    pub(crate) fn own_text(&self, id: NodeId) -> Result<&str> {
        self.node(id).map(|d| d.text.as_str())
    }
}

/// A thread-safe, cloneable handle to a [`NodeTree`].
///
/// Clones share the same tree. Locks are only held for the duration of a
/// single call, so callbacks invoked by the selection layer may freely use
/// the document again.
#[derive(Clone)]
pub struct Document {
    inner: Arc<RwLock<NodeTree>>,
}

static_assertions::assert_impl_all!(Document: Send, Sync);

impl Document {
    /// Create a document with the default configuration.
    pub fn new() -> Self {
        Self::with_config(&DocumentConfig::default())
    }

    /// Create a document from a configuration.
    pub fn with_config(config: &DocumentConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(NodeTree::new(config))),
        }
    }

    /// Execute a function with read access to the tree.
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&NodeTree) -> R,
    {
        f(&self.inner.read())
    }

    /// Execute a function with write access to the tree.
    pub fn write<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut NodeTree) -> R,
    {
        f(&mut self.inner.write())
    }

    /// Whether two handles refer to the same document.
    pub fn ptr_eq(&self, other: &Document) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// The root element.
    pub fn root(&self) -> NodeId {
        self.read(|t| t.root())
    }

    /// A handle to an element of this document.
    pub fn element(&self, id: NodeId) -> Element {
        Element {
            document: self.clone(),
            id,
        }
    }

    /// Create a detached element.
    pub fn create_element(&self, name: &str) -> NodeId {
        self.write(|t| t.create_element(name))
    }

    /// Resolve a possibly-prefixed name against this document's prefixes.
    pub fn namespace(&self, name: &str) -> QualifiedName {
        self.read(|t| t.namespaces().resolve(name))
    }

    /// Check if a node exists.
    pub fn contains(&self, id: NodeId) -> bool {
        self.read(|t| t.contains(id))
    }

    /// Dispatch an event to `target`.
    ///
    /// Listeners of the target run first, in registration order; if the
    /// event bubbles, each ancestor's listeners follow until propagation is
    /// stopped. Returns `false` if a cancelable event had its default
    /// prevented.
    pub fn dispatch(&self, target: NodeId, event_type: &str, init: EventInit) -> Result<bool> {
        let path = self.read(|t| -> Result<Vec<NodeId>> {
            let mut path = vec![target];
            if init.bubbles {
                path.extend(t.ancestors(target)?);
            } else {
                t.node(target)?;
            }
            Ok(path)
        })?;

        let event = Event::new(event_type, target, init);
        tracing::debug!(target: targets::EVENTS, ?target, event_type, "dispatching event");

        for node in path {
            let listeners = self.read(|t| t.listeners_for(node, event_type));
            let current = self.element(node);
            for listener in listeners {
                listener(&event, &current);
            }
            if event.is_propagation_stopped() {
                break;
            }
        }

        Ok(!event.is_default_prevented())
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (root, count) = self.read(|t| (t.root(), t.node_count()));
        f.debug_struct("Document")
            .field("root", &root)
            .field("node_count", &count)
            .finish()
    }
}

/// A node handle bound to its document.
///
/// This is what selection callbacks receive as the focal element.
#[derive(Clone)]
pub struct Element {
    document: Document,
    id: NodeId,
}

impl Element {
    /// The node id.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The owning document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Local tag name.
    pub fn tag(&self) -> String {
        self.document
            .read(|t| t.tag(self.id).map(str::to_string))
            .unwrap_or_default()
    }

    /// Namespace URI.
    pub fn namespace(&self) -> Option<String> {
        self.document
            .read(|t| t.namespace(self.id).ok().flatten().map(str::to_string))
    }

    /// Parent element handle.
    pub fn parent(&self) -> Option<Element> {
        self.document
            .read(|t| t.parent(self.id).ok().flatten())
            .map(|p| self.document.element(p))
    }

    /// Element children.
    pub fn children(&self) -> Vec<Element> {
        self.document
            .read(|t| t.element_children(self.id).unwrap_or_default())
            .into_iter()
            .map(|c| self.document.element(c))
            .collect()
    }

    /// An attribute value.
    pub fn attr(&self, name: &str) -> Option<String> {
        self.document
            .read(|t| t.attribute(self.id, name).ok().flatten().map(str::to_string))
    }

    /// Set an attribute.
    pub fn set_attr(&self, name: &str, value: impl Into<String>) -> Result<()> {
        self.document
            .write(|t| t.set_attribute(self.id, name, value))
    }

    /// An inline style value.
    pub fn style(&self, name: &str) -> Option<String> {
        self.document
            .read(|t| t.style(self.id, name).ok().flatten().map(str::to_string))
    }

    /// Whether the element has a class.
    pub fn has_class(&self, class: &str) -> bool {
        self.document
            .read(|t| t.has_class(self.id, class).unwrap_or(false))
    }

    /// A dynamic property, cloned out.
    pub fn property<T: Any + Clone>(&self, name: &str) -> Option<T> {
        self.document
            .read(|t| t.property::<T>(self.id, name).ok().flatten().cloned())
    }

    /// Text content of the element and its descendants.
    pub fn text(&self) -> String {
        self.document
            .read(|t| t.text_content(self.id))
            .unwrap_or_default()
    }

    /// The bound datum, if it is a `T`.
    pub fn datum<T: Any + Clone>(&self) -> Option<T> {
        self.document
            .read(|t| t.datum(self.id).ok().flatten())
            .and_then(|d| d.downcast_ref::<T>().cloned())
    }

    /// Append a new child element and return its handle.
    pub fn append(&self, name: &str) -> Result<Element> {
        let child = self.document.write(|t| -> Result<NodeId> {
            let child = t.create_element_for(self.id, name)?;
            t.append_child(self.id, child)?;
            Ok(child)
        })?;
        Ok(self.document.element(child))
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.document.ptr_eq(&other.document)
    }
}

impl Eq for Element {}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("id", &self.id)
            .field("tag", &self.tag())
            .finish()
    }
}
