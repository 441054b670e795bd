//! CSS selector types and matching.

mod matcher;
mod types;

pub use matcher::{NodeMatchContext, SelectorMatcher, SiblingInfo};
pub use types::*;
