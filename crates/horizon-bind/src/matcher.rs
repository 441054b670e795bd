//! Selector strings compiled into reusable per-node closures.
//!
//! [`matcher`] feeds [`Selection::filter_with`], [`selector`] feeds
//! [`Selection::select_with`] and [`selector_all`] feeds
//! [`Selection::select_all_with`]. Each parses its selector once; a
//! malformed selector yields a closure that matches nothing.
//!
//! ```
//! use horizon_bind::prelude::*;
//!
//! let doc = Document::new();
//! let list = selection::<()>(&doc).append("ul")?;
//! list.append("li")?.classed("top", true).append("em")?;
//! list.append("li")?;
//!
//! let items = list.select_all::<()>("li");
//! assert_eq!(items.filter_with(matcher(".top")).size(), 1);
//! assert_eq!(items.select_with(selector("em")).size(), 1);
//! # Ok::<(), SelectionError>(())
//! ```
//!
//! [`Selection::filter_with`]: crate::Selection::filter_with
//! [`Selection::select_with`]: crate::Selection::select_with
//! [`Selection::select_all_with`]: crate::Selection::select_all_with

use std::sync::Arc;

use horizon_bind_core::NodeId;
use horizon_bind_selector::{SelectorList, SelectorMatcher, parse_or_warn};

use crate::selection::Context;

fn compile(selector: &str) -> Option<Arc<SelectorList>> {
    parse_or_warn(selector).map(Arc::new)
}

/// A predicate that holds when the focal element matches `selector`.
pub fn matcher<D: 'static>(
    selector: &str,
) -> impl Fn(Context<'_, D>) -> bool + Send + Sync + Clone + 'static {
    let list = compile(selector);
    move |ctx: Context<'_, D>| {
        list.as_deref().is_some_and(|list| {
            let node = ctx.element.id();
            ctx.element
                .document()
                .read(|t| SelectorMatcher::matches(list, t, node))
        })
    }
}

/// A function returning the first descendant of the focal element that
/// matches `selector`.
pub fn selector<D: 'static>(
    selector: &str,
) -> impl Fn(Context<'_, D>) -> Option<NodeId> + Send + Sync + Clone + 'static {
    let list = compile(selector);
    move |ctx: Context<'_, D>| {
        let list = list.as_deref()?;
        let scope = ctx.element.id();
        ctx.element
            .document()
            .read(|t| SelectorMatcher::query_first(list, t, scope))
    }
}

/// A function returning every descendant of the focal element that matches
/// `selector`, in document order.
pub fn selector_all<D: 'static>(
    selector: &str,
) -> impl Fn(Context<'_, D>) -> Vec<NodeId> + Send + Sync + Clone + 'static {
    let list = compile(selector);
    move |ctx: Context<'_, D>| match list.as_deref() {
        Some(list) => {
            let scope = ctx.element.id();
            ctx.element
                .document()
                .read(|t| SelectorMatcher::query_all(list, t, scope))
        }
        None => Vec::new(),
    }
}

/// A function returning the element children of the focal element that
/// match `selector`.
pub(crate) fn child_selector_all<D: 'static>(
    selector: &str,
) -> impl Fn(Context<'_, D>) -> Vec<NodeId> + Send + Sync + Clone + 'static {
    let list = compile(selector);
    move |ctx: Context<'_, D>| match list.as_deref() {
        Some(list) => {
            let parent = ctx.element.id();
            ctx.element
                .document()
                .read(|t| SelectorMatcher::matching_children(list, t, parent))
        }
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::select::{select_all, selection};
    use horizon_bind_core::Document;

    fn tree(doc: &Document) {
        let root = selection::<()>(doc);
        let ul = root.append("ul").unwrap();
        for (i, class) in ["top", "", "top"].into_iter().enumerate() {
            let li = ul.append("li").unwrap().datum(i as i32);
            if !class.is_empty() {
                li.classed(class, true);
            }
            li.append("em").unwrap();
            li.append("em").unwrap();
        }
    }

    #[test]
    fn test_matcher_agrees_with_filter() {
        let doc = Document::new();
        tree(&doc);
        let items = select_all::<i32>(&doc, "li");
        let by_closure = items.filter_with(matcher(".top"));
        assert_eq!(by_closure, items.filter(".top"));
        assert_eq!(by_closure.data_values(), vec![0, 2]);
    }

    #[test]
    fn test_selector_propagates_data() {
        let doc = Document::new();
        tree(&doc);
        let items = select_all::<i32>(&doc, "li");
        let first = items.select_with(selector("em"));
        assert_eq!(first, items.select("em"));
        assert_eq!(first.data_values(), vec![0, 1, 2]);
    }

    #[test]
    fn test_selector_all_groups_by_parent() {
        let doc = Document::new();
        tree(&doc);
        let items = select_all::<i32>(&doc, "li");
        let ems = items.select_all_with::<(), _>(selector_all("em"));
        assert_eq!(ems.groups().len(), 3);
        assert!(ems.groups().iter().all(|g| g.len() == 2));
        assert_eq!(ems.groups()[1].parent(), Some(items.nodes()[1]));
    }

    #[test]
    fn test_closures_are_reusable_and_malformed_matches_nothing() {
        let doc = Document::new();
        tree(&doc);
        let items = select_all::<i32>(&doc, "li");
        let top = matcher::<i32>(".top");
        assert_eq!(items.filter_with(top.clone()).size(), 2);
        assert_eq!(items.filter_with(top).size(), 2);

        assert!(items.filter_with(matcher("[[")).empty());
        assert!(items.select_with(selector("[[")).empty());
        assert!(items.select_all_with::<(), _>(selector_all("[[")).empty());
    }
}
