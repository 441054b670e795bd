//! Integration tests for the shared document handle.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use horizon_bind_core::namespace::SVG;
use horizon_bind_core::{
    Document, DocumentConfig, DocumentTreeDebug, EventInit, Local, NodeId, TypeName, markup,
};

fn build_list(doc: &Document, items: &[&str]) -> NodeId {
    let root = doc.root();
    doc.write(|tree| {
        let list = tree.create_element("ul");
        tree.append_child(root, list).unwrap();
        for item in items {
            let li = tree.create_element("li");
            tree.append_child(list, li).unwrap();
            tree.set_text_content(li, item).unwrap();
        }
        list
    })
}

#[test]
fn test_clones_share_tree() {
    let doc = Document::new();
    let other = doc.clone();
    let list = build_list(&doc, &["a", "b"]);
    assert!(other.contains(list));
    assert!(doc.ptr_eq(&other));
    assert!(!doc.ptr_eq(&Document::new()));
}

#[test]
fn test_concurrent_readers() {
    let doc = Document::new();
    let list = build_list(&doc, &["a", "b", "c"]);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let doc = doc.clone();
            thread::spawn(move || doc.element(list).text())
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), "abc");
    }
}

#[test]
fn test_svg_root_config() {
    let config = DocumentConfig::new().root_tag("svg").default_namespace(SVG);
    let doc = Document::with_config(&config);
    let root = doc.element(doc.root());
    assert_eq!(root.tag(), "svg");
    assert_eq!(root.namespace().as_deref(), Some(SVG));

    let g = root.append("g").unwrap();
    assert_eq!(g.namespace().as_deref(), Some(SVG));
    assert_eq!(g.parent(), Some(root));
}

#[test]
fn test_listener_can_mutate_document() {
    let doc = Document::new();
    let list = build_list(&doc, &["a"]);
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);

    doc.write(|tree| {
        tree.set_listener(
            list,
            TypeName::parse("click.add"),
            Arc::new(move |_, current| {
                counter.fetch_add(1, Ordering::SeqCst);
                current.append("li").unwrap();
            }),
        )
    })
    .unwrap();

    doc.dispatch(list, "click", EventInit::new()).unwrap();
    doc.dispatch(list, "click", EventInit::new()).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(doc.element(list).children().len(), 3);

    let removed = doc
        .write(|tree| tree.remove_listeners(list, &TypeName::parse(".add")))
        .unwrap();
    assert_eq!(removed, 1);
    doc.dispatch(list, "click", EventInit::new()).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_event_detail() {
    let doc = Document::new();
    let root = doc.root();
    let seen = Arc::new(AtomicUsize::new(0));
    let s = Arc::clone(&seen);
    doc.write(|tree| {
        tree.set_listener(
            root,
            TypeName::parse("custom"),
            Arc::new(move |event, _| {
                if let Some(n) = event.detail::<usize>() {
                    s.store(*n, Ordering::SeqCst);
                }
            }),
        )
    })
    .unwrap();

    doc.dispatch(root, "custom", EventInit::new().detail(7usize)).unwrap();
    assert_eq!(seen.load(Ordering::SeqCst), 7);
}

#[test]
fn test_markup_round_trip_through_handle() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("horizon_bind_core=debug"))
        .with_test_writer()
        .try_init();
    let doc = Document::new();
    let list = build_list(&doc, &["x"]);
    let html = doc.read(|tree| markup::inner_markup(tree, list)).unwrap();
    assert_eq!(html, "<li>x</li>");
    let outer = doc.read(|tree| markup::outer_markup(tree, list)).unwrap();
    assert_eq!(outer, "<ul><li>x</li></ul>");
}

#[test]
fn test_locals_and_tree_dump() {
    let doc = Document::new();
    let list = build_list(&doc, &["a", "b"]);
    let depth = Local::<u32>::new();
    depth.set(&doc, list, 1).unwrap();

    let first = doc.element(list).children()[0].id();
    assert_eq!(depth.get(&doc, first).unwrap(), Some(1));

    let dump = DocumentTreeDebug::new().format_subtree(&doc, list).unwrap();
    assert!(dump.starts_with("ul\n"));
    assert_eq!(dump.matches("li").count(), 2);
}
