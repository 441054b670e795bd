//! Logging and debugging facilities for Horizon Bind.
//!
//! This module provides:
//! - Target names for filtering the `tracing` output of each subsystem
//! - Debug visualization for document trees
//!
//! # Tracing Integration
//!
//! Horizon Bind uses the `tracing` crate for instrumentation. To see logs,
//! install a subscriber in your application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("horizon_bind=debug,horizon_bind_selector=warn")
//!     .init();
//! ```
//!
//! # Debug Visualization
//!
//! Use [`DocumentTreeDebug`] to print the element hierarchy:
//!
//! ```
//! use horizon_bind_core::{Document, logging::DocumentTreeDebug};
//!
//! let doc = Document::new();
//! let output = DocumentTreeDebug::new().format_document(&doc);
//! assert!(output.starts_with("Document Tree"));
//! ```

use std::fmt;

use crate::document::{Document, NodeId, NodeKind, NodeTree};
use crate::error::Result;

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core document target.
    pub const CORE: &str = "horizon_bind_core";
    /// Node creation and restructuring.
    pub const DOCUMENT: &str = "horizon_bind_core::document";
    /// Event dispatch.
    pub const EVENTS: &str = "horizon_bind_core::events";
    /// Inner markup parsing and serialization.
    pub const MARKUP: &str = "horizon_bind_core::markup";
    /// Selector parsing and matching.
    pub const SELECTOR: &str = "horizon_bind_selector";
    /// Selection operations.
    pub const SELECTION: &str = "horizon_bind::selection";
    /// Data joins.
    pub const JOIN: &str = "horizon_bind::join";
    /// Interpolator construction.
    pub const INTERPOLATE: &str = "horizon_bind_interpolate";
}

/// Style options for document tree visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
    /// Compact single-line representation.
    Compact,
}

/// Configuration for document tree debug output.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    /// The style of tree visualization.
    pub style: TreeStyle,
    /// Whether to show node IDs.
    pub show_ids: bool,
    /// Whether to show attributes and classes.
    pub show_attributes: bool,
    /// Whether to mark nodes that carry a bound datum.
    pub show_data: bool,
    /// Whether to include text nodes.
    pub show_text: bool,
    /// Maximum depth to traverse (None for unlimited).
    pub max_depth: Option<usize>,
    /// Indent size for each level.
    pub indent_size: usize,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_ids: false,
            show_attributes: true,
            show_data: false,
            show_text: true,
            max_depth: None,
            indent_size: 2,
        }
    }
}

impl TreeFormatOptions {
    /// Create options for detailed debugging output.
    pub fn detailed() -> Self {
        Self {
            show_ids: true,
            show_data: true,
            ..Default::default()
        }
    }

    /// Create options for minimal output: tags only.
    pub fn minimal() -> Self {
        Self {
            show_attributes: false,
            show_text: false,
            ..Default::default()
        }
    }
}

/// Debug utility for visualizing document trees.
#[derive(Debug, Clone, Default)]
pub struct DocumentTreeDebug {
    options: TreeFormatOptions,
}

impl DocumentTreeDebug {
    /// Create a new debug visualizer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a debug visualizer with custom options.
    pub fn with_options(options: TreeFormatOptions) -> Self {
        Self { options }
    }

    /// Format the whole document from its root.
    pub fn format_document(&self, doc: &Document) -> String {
        doc.read(|tree| {
            let mut output = format!("Document Tree ({} total nodes):\n", tree.node_count());
            if let Err(e) = self.format_subtree_into(tree, tree.root(), 0, true, &mut output) {
                output.push_str(&format!("  (error: {e})\n"));
            }
            output
        })
    }

    /// Format a subtree starting from a specific node.
    pub fn format_subtree(&self, doc: &Document, root: NodeId) -> Result<String> {
        doc.read(|tree| {
            let mut output = String::new();
            self.format_subtree_into(tree, root, 0, true, &mut output)?;
            Ok(output)
        })
    }

    fn format_subtree_into(
        &self,
        tree: &NodeTree,
        id: NodeId,
        depth: usize,
        is_last: bool,
        output: &mut String,
    ) -> Result<()> {
        if let Some(max) = self.options.max_depth {
            if depth > max {
                return Ok(());
            }
        }

        output.push_str(&self.build_prefix(depth, is_last));

        match tree.kind(id)? {
            NodeKind::Text => {
                output.push_str(&format!("{:?}", tree.text_content(id)?));
            }
            NodeKind::Element => {
                output.push_str(tree.tag(id)?);
                if self.options.show_attributes {
                    let classes = tree.classes(id)?;
                    if !classes.is_empty() {
                        output.push('.');
                        output.push_str(&classes.join("."));
                    }
                    for (name, value) in tree.attributes(id)? {
                        output.push_str(&format!(" {name}={value:?}"));
                    }
                }
                if self.options.show_data && tree.datum(id)?.is_some() {
                    output.push_str(" (bound)");
                }
            }
        }

        if self.options.show_ids {
            output.push_str(&format!(" [{id:?}]"));
        }
        output.push('\n');

        let children: Vec<NodeId> = tree
            .children(id)?
            .iter()
            .copied()
            .filter(|&c| self.options.show_text || tree.is_element(c))
            .collect();
        let child_count = children.len();
        for (i, child_id) in children.into_iter().enumerate() {
            self.format_subtree_into(tree, child_id, depth + 1, i == child_count - 1, output)?;
        }

        Ok(())
    }

    fn build_prefix(&self, depth: usize, is_last: bool) -> String {
        if depth == 0 {
            return String::new();
        }

        let (branch, corner, last) = match self.options.style {
            TreeStyle::Ascii => ("|", "+--", "`--"),
            TreeStyle::Unicode => ("\u{2502}", "\u{251c}\u{2500}\u{2500}", "\u{2514}\u{2500}\u{2500}"),
            TreeStyle::Compact => ("", "-", "-"),
        };

        let mut prefix = String::new();
        for _ in 0..(depth - 1) {
            prefix.push_str(branch);
            for _ in 0..self.options.indent_size {
                prefix.push(' ');
            }
        }
        prefix.push_str(if is_last { last } else { corner });
        prefix.push(' ');
        prefix
    }
}

impl fmt::Display for DocumentTreeDebug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DocumentTreeDebug({:?})", self.options.style)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Document {
        let doc = Document::new();
        let root = doc.root();
        doc.write(|t| {
            let body = t.create_element("body");
            t.append_child(root, body).unwrap();
            let p = t.create_element("p");
            t.append_child(body, p).unwrap();
            t.add_class(p, "note").unwrap();
            t.set_attribute(p, "title", "hi").unwrap();
            t.set_text_content(p, "hello").unwrap();
        });
        doc
    }

    #[test]
    fn test_format_document() {
        let output = DocumentTreeDebug::new().format_document(&sample());
        assert!(output.contains("Document Tree"));
        assert!(output.contains("html"));
        assert!(output.contains("p.note title=\"hi\""));
        assert!(output.contains("\"hello\""));
    }

    #[test]
    fn test_format_minimal() {
        let debug = DocumentTreeDebug::with_options(TreeFormatOptions::minimal());
        let output = debug.format_document(&sample());
        assert!(output.contains("p\n"));
        assert!(!output.contains("hello"));
    }

    #[test]
    fn test_format_ascii() {
        let debug = DocumentTreeDebug::with_options(TreeFormatOptions {
            style: TreeStyle::Ascii,
            ..TreeFormatOptions::minimal()
        });
        let output = debug.format_document(&sample());
        assert!(output.contains("`-- body"));
    }

    #[test]
    fn test_max_depth() {
        let debug = DocumentTreeDebug::with_options(TreeFormatOptions {
            max_depth: Some(1),
            ..TreeFormatOptions::minimal()
        });
        let output = debug.format_document(&sample());
        assert!(output.contains("body"));
        assert!(!output.contains(" p"));
    }
}
