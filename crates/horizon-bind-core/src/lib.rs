//! Host document model for Horizon Bind.
//!
//! This crate provides the tree that selections operate on:
//!
//! - **Document**: An arena of element and text nodes behind a shared,
//!   thread-safe handle
//! - **Element State**: Attributes, inline styles, classes, dynamic properties
//!   and a bound datum per node
//! - **Events**: Named listeners per node, dispatch with bubbling and
//!   cancellation
//! - **Namespaces**: Prefix resolution for qualified element and attribute names
//! - **Locals**: Typed per-node variables inherited by descendants
//! - **Markup**: Inner markup parsing and serialization
//!
//! # Example
//!
//! ```
//! use horizon_bind_core::{Document, markup};
//!
//! let doc = Document::new();
//! let root = doc.root();
//! let list = doc.write(|tree| {
//!     let list = tree.create_element("ul");
//!     tree.append_child(root, list)?;
//!     markup::set_inner_markup(tree, list, "<li>one</li><li>two</li>")?;
//!     Ok::<_, horizon_bind_core::DocumentError>(list)
//! })?;
//!
//! assert_eq!(doc.element(list).text(), "onetwo");
//! # Ok::<(), horizon_bind_core::DocumentError>(())
//! ```

pub mod config;
pub mod document;
mod error;
pub mod event;
pub mod local;
pub mod logging;
pub mod markup;
pub mod namespace;

pub use config::DocumentConfig;
pub use document::{Datum, Document, Element, NodeId, NodeKind, NodeTree};
pub use error::{ConfigError, DocumentError, Result};
pub use event::{Event, EventInit, Listener, TypeName};
pub use local::{Local, LocalId};
pub use logging::{DocumentTreeDebug, TreeFormatOptions, TreeStyle};
pub use namespace::{NamespaceMap, QualifiedName};
