//! Prelude module for Horizon Bind.
//!
//! This module re-exports the most commonly used types for convenient importing:
//!
//! ```ignore
//! use horizon_bind::prelude::*;
//! ```
//!
//! This provides access to:
//! - The document model (`Document`, `Element`, `NodeId`)
//! - Selections and their constructors (`Selection`, `select`, `select_all`)
//! - Data joins (`Join`, `EnterSelection`)
//! - Events and local values (`EventInit`, `Local`)

// ============================================================================
// Document Model
// ============================================================================

pub use horizon_bind_core::{Document, DocumentConfig, Element, NodeId};

// ============================================================================
// Selections
// ============================================================================

pub use crate::select::{select, select_all, select_all_nodes, select_node, select_none, selection};
pub use crate::matcher::{matcher, selector, selector_all};
pub use crate::selection::{AttrValue, Bindable, Context, Priority, Selection};

// ============================================================================
// Data Join
// ============================================================================

pub use crate::join::{EnterContext, EnterSelection, Join};

// ============================================================================
// Events and Local Values
// ============================================================================

pub use horizon_bind_core::{Event, EventInit, Local};

// ============================================================================
// Creators and Errors
// ============================================================================

pub use crate::creator::{creator, namespace};
pub use crate::error::SelectionError;
