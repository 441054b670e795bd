//! CSS selectors for Horizon Bind documents.
//!
//! This crate parses selector strings with `cssparser` and matches them
//! against nodes of a [`NodeTree`](horizon_bind_core::NodeTree):
//!
//! - **Selectors**: Type, universal, class, ID and attribute selectors
//! - **Combinators**: Descendant, child, adjacent and general sibling
//! - **Pseudo-classes**: `:root`, `:first-child`, `:last-child`,
//!   `:only-child`, `:nth-child()`, `:nth-last-child()`, `:empty`, `:not()`
//! - **Lists**: Comma-separated alternatives
//!
//! # Example
//!
//! ```
//! use horizon_bind_core::Document;
//! use horizon_bind_selector::{SelectorList, SelectorMatcher};
//!
//! let doc = Document::new();
//! let root = doc.root();
//! let list: SelectorList = "ul > li:first-child".parse()?;
//!
//! let first = doc.write(|tree| {
//!     let ul = tree.create_element("ul");
//!     tree.append_child(root, ul)?;
//!     let li = tree.create_element("li");
//!     tree.append_child(ul, li)?;
//!     Ok::<_, horizon_bind_core::DocumentError>(li)
//! })?;
//!
//! let found = doc.read(|tree| SelectorMatcher::query_first(&list, tree, root));
//! assert_eq!(found, Some(first));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod parser;
pub mod selector;

mod error;

pub use error::{Result, SelectorError};
pub use parser::{parse_or_warn, parse_selector_list};
pub use selector::{
    AttributeOperator, AttributeSelector, Combinator, NodeMatchContext, NthExpr, PseudoClass,
    Selector, SelectorList, SelectorMatcher, SelectorPart, SiblingInfo, TypeSelector,
};
