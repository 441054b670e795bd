//! Integration tests: parse selectors and query documents built from markup.

use horizon_bind_core::{Document, NodeId, markup};
use horizon_bind_selector::{SelectorList, SelectorMatcher, parse_or_warn};

fn document(html: &str) -> Document {
    let doc = Document::new();
    let root = doc.root();
    doc.write(|tree| markup::set_inner_markup(tree, root, html))
        .unwrap();
    doc
}

fn query_all(doc: &Document, selector: &str) -> Vec<NodeId> {
    let list: SelectorList = selector.parse().unwrap();
    doc.read(|tree| SelectorMatcher::query_all(&list, tree, tree.root()))
}

fn tags(doc: &Document, nodes: &[NodeId]) -> Vec<String> {
    nodes.iter().map(|&n| doc.element(n).tag()).collect()
}

const TABLE: &str = "<body>\
    <table id=\"t\">\
      <tr class=\"row\"><td>1</td><td>2</td></tr>\
      <tr class=\"row odd\"><td>3</td><td>4</td></tr>\
    </table>\
    <svg id=\"svg-1\"><g class=\"circles-group\"><circle r=\"1\"/><circle r=\"2\"/></g></svg>\
    </body>";

#[test]
fn test_document_order() {
    let doc = document(TABLE);
    let cells = query_all(&doc, "td");
    let text: Vec<String> = cells.iter().map(|&n| doc.element(n).text()).collect();
    assert_eq!(text, ["1", "2", "3", "4"]);
}

#[test]
fn test_selector_list_keeps_document_order() {
    let doc = document(TABLE);
    let found = query_all(&doc, "circle, table");
    assert_eq!(tags(&doc, &found), ["table", "circle", "circle"]);
}

#[test]
fn test_combinators_and_pseudos() {
    let doc = document(TABLE);
    assert_eq!(query_all(&doc, "tr.odd > td").len(), 2);
    assert_eq!(query_all(&doc, "#t td:first-child").len(), 2);
    assert_eq!(query_all(&doc, "tr + tr td:last-child").len(), 1);
    assert_eq!(query_all(&doc, "g.circles-group circle[r=\"2\"]").len(), 1);
    assert_eq!(query_all(&doc, "#svg-1 :not(circle)").len(), 1);
    assert_eq!(query_all(&doc, "circle:empty").len(), 2);
}

#[test]
fn test_scope_limits_results_but_not_context() {
    let doc = document(TABLE);
    let svg = query_all(&doc, "svg")[0];
    let list: SelectorList = "body g".parse().unwrap();
    let found = doc.read(|tree| SelectorMatcher::query_first(&list, tree, svg));
    assert!(found.is_some());
}

#[test]
fn test_malformed_selector_is_none() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    assert!(parse_or_warn("td >").is_none());
    assert!(parse_or_warn("td:unknown").is_none());
}
