//! Tests for DOM traversal and text reads.

use mojifu_dom::{BoxGeometry, DomTree, ElementData, FixedGeometry, NoGeometry, NodeId, NodeType, Rect};

/// Helper to create an element node, attach it, and return its NodeId.
fn element(tree: &mut DomTree, parent: NodeId, data: ElementData) -> NodeId {
    let id = tree.alloc(NodeType::Element(data));
    tree.append_child(parent, id);
    id
}

/// `<html><body><div id="a"><p>one</p><p>two <a>link</a></p></div></body></html>`
fn sample() -> (DomTree, NodeId, NodeId, NodeId) {
    let mut tree = DomTree::new();
    let html = element(&mut tree, NodeId::ROOT, ElementData::new("html"));
    let body = element(&mut tree, html, ElementData::new("BODY"));
    let div = element(&mut tree, body, ElementData::new("div").with_attr("id", "a"));
    let p1 = element(&mut tree, div, ElementData::new("p"));
    tree.append_text(p1, "one");
    let p2 = element(&mut tree, div, ElementData::new("p"));
    tree.append_text(p2, "two ");
    let a = element(&mut tree, p2, ElementData::new("a"));
    tree.append_text(a, "link");
    (tree, body, div, p2)
}

#[test]
fn test_body_lookup_is_case_insensitive() {
    let (tree, body, _, _) = sample();
    assert_eq!(tree.body(), Some(body));
    assert_eq!(tree.tag_name(body), Some("body"));
}

#[test]
fn test_text_content_concatenates_descendants() {
    let (tree, _, div, p2) = sample();
    assert_eq!(tree.text_content(div), "onetwo link");
    assert_eq!(tree.text_content(p2), "two link");
}

#[test]
fn test_append_text_merges_adjacent_text() {
    let mut tree = DomTree::new();
    let p = element(&mut tree, NodeId::ROOT, ElementData::new("p"));
    tree.append_text(p, "hello ");
    tree.append_text(p, "world");
    assert_eq!(tree.children(p).len(), 1);
    assert_eq!(tree.text_content(p), "hello world");
}

#[test]
fn test_descendants_are_in_tree_order() {
    let (tree, _, div, _) = sample();
    let tags: Vec<&str> = tree
        .descendants(div)
        .filter_map(|id| tree.tag_name(id))
        .collect();
    assert_eq!(tags, vec!["p", "p", "a"]);
    assert_eq!(tree.elements_by_tag(div, "P").count(), 2);
}

#[test]
fn test_ancestors_walk_to_document() {
    let (tree, body, div, p2) = sample();
    let chain: Vec<NodeId> = tree.ancestors(p2).collect();
    assert_eq!(chain[0], div);
    assert_eq!(chain[1], body);
    assert_eq!(*chain.last().unwrap(), NodeId::ROOT);
    assert!(tree.is_descendant_of(p2, body));
    assert_eq!(tree.parent_element(tree.document_element().unwrap()), None);
}

#[test]
fn test_element_data_helpers() {
    let data = ElementData::new("DIV")
        .with_attr("class", "  post  content ")
        .with_attr("id", "");
    assert_eq!(data.tag_name, "div");
    assert_eq!(data.class_list().collect::<Vec<_>>(), vec!["post", "content"]);
    assert!(data.has_class("content"));
    assert_eq!(data.id(), None);
}

#[test]
fn test_geometry_sources() {
    let mut fixed = FixedGeometry::new();
    fixed.set(NodeId(3), Rect::new(640.0, 480.0));
    assert_eq!(fixed.bounding_box(NodeId(3)), Some(Rect::new(640.0, 480.0)));
    assert_eq!(fixed.bounding_box(NodeId(4)), None);
    assert_eq!(NoGeometry.bounding_box(NodeId(3)), None);
}

#[test]
fn test_deep_nesting_is_measured_without_recursion() {
    const LEVELS: usize = 100_000;
    let mut tree = DomTree::new();
    let article = element(&mut tree, NodeId::ROOT, ElementData::new("article"));
    let mut parent = article;
    for _ in 0..LEVELS {
        parent = element(&mut tree, parent, ElementData::new("span"));
    }
    tree.append_text(parent, "deep");

    // Each level adds <span></span>.
    assert_eq!(tree.inner_html_length(article), LEVELS * 13 + 4);
    assert_eq!(tree.text_content(article), "deep");
}
