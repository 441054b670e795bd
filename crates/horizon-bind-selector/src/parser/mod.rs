//! Selector parsing module.

mod selector_parser;

pub use selector_parser::{parse_or_warn, parse_selector_list};
