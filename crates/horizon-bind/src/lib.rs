//! Horizon Bind - typed selections and data joins over an in-memory document.
//!
//! This is the umbrella crate. It provides [`Selection`], the data join
//! ([`Join`], [`EnterSelection`]) and the top-level constructors, and
//! re-exports the document model from `horizon-bind-core`.
//!
//! # Example
//!
//! ```
//! use horizon_bind::prelude::*;
//!
//! # fn main() -> Result<(), SelectionError> {
//! let doc = Document::new();
//! let list = selection::<()>(&doc).append("ul")?;
//!
//! let items = list
//!     .select_all::<()>("li")
//!     .data(vec![10, 20, 30])
//!     .join("li")?
//!     .text_with(|ctx| ctx.datum.map(|d| format!("item {}", d)));
//!
//! assert_eq!(items.data_values(), vec![10, 20, 30]);
//! assert_eq!(items.text_value().as_deref(), Some("item 10"));
//! # Ok(())
//! # }
//! ```

pub mod creator;
pub mod error;
pub mod join;
pub mod matcher;
pub mod prelude;
pub mod select;
pub mod selection;

pub use horizon_bind_core::*;

pub use creator::{creator, namespace, namespaces};
pub use error::{Result, SelectionError};
pub use join::{EnterContext, EnterGroup, EnterSelection, EnterSlot, Join};
pub use matcher::{matcher, selector, selector_all};
pub use select::{select, select_all, select_all_nodes, select_node, select_none, selection};
pub use selection::{AttrValue, Bindable, Context, Group, Priority, Selection};

/// Selector parsing and matching.
pub mod selector {
    pub use horizon_bind_selector::*;
}

/// Value interpolation.
pub mod interpolate {
    pub use horizon_bind_interpolate::*;
}
