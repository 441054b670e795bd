//! Per-node local variables.
//!
//! A [`Local<T>`] is a key that stores one value per node, independent of the
//! node's bound datum. Lookups walk up the ancestor chain, so a value set on
//! a container is visible to every node below it until shadowed.

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::document::{Document, NodeId};
use crate::error::Result;

static NEXT_LOCAL: AtomicU64 = AtomicU64::new(0);

/// Process-unique identifier of a [`Local`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocalId(u64);

/// A typed per-node variable.
pub struct Local<T> {
    id: LocalId,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Any + Send + Sync + Clone> Local<T> {
    /// Create a new local with a fresh, process-unique id.
    pub fn new() -> Self {
        Self {
            id: LocalId(NEXT_LOCAL.fetch_add(1, Ordering::Relaxed)),
            _marker: PhantomData,
        }
    }

    /// The local's identifier.
    pub fn id(&self) -> LocalId {
        self.id
    }

    /// The value on `node` or its nearest ancestor that has one.
    pub fn get(&self, doc: &Document, node: NodeId) -> Result<Option<T>> {
        doc.read(|tree| {
            let mut current = Some(node);
            while let Some(id) = current {
                if let Some(value) = tree.local_value(id, self.id)? {
                    return Ok(value.downcast_ref::<T>().cloned());
                }
                current = tree.parent(id)?;
            }
            Ok(None)
        })
    }

    /// The value stored on `node` itself, ignoring ancestors.
    pub fn get_own(&self, doc: &Document, node: NodeId) -> Result<Option<T>> {
        doc.read(|tree| {
            Ok(tree
                .local_value(node, self.id)?
                .and_then(|v| v.downcast_ref::<T>().cloned()))
        })
    }

    /// Store a value on `node`. Returns the value for chaining.
    pub fn set(&self, doc: &Document, node: NodeId, value: T) -> Result<T> {
        doc.write(|tree| tree.set_local_value(node, self.id, Arc::new(value.clone())))?;
        Ok(value)
    }

    /// Remove the value stored on `node`. Returns whether one was present.
    pub fn remove(&self, doc: &Document, node: NodeId) -> Result<bool> {
        doc.write(|tree| tree.remove_local_value(node, self.id))
    }
}

impl<T: Any + Send + Sync + Clone> Default for Local<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Local<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Display for Local<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.id.0)
    }
}

impl<T> fmt::Debug for Local<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Local").field("id", &self.id.0).finish()
    }
}
