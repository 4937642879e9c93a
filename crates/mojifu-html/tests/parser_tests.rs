//! Integration tests for the HTML parser.

use mojifu_dom::{DomTree, NodeId, NodeType};
use mojifu_html::{parse, parse_with_issues};

/// Tags of the element children of `id`, in order.
fn child_tags(tree: &DomTree, id: NodeId) -> Vec<String> {
    tree.element_children(id)
        .filter_map(|c| tree.tag_name(c).map(str::to_string))
        .collect()
}

fn first(tree: &DomTree, tag: &str) -> NodeId {
    tree.elements_by_tag(NodeId::ROOT, tag)
        .next()
        .unwrap_or_else(|| panic!("no <{tag}> in tree"))
}

#[test]
fn test_document_structure_is_implied() {
    let tree = parse("<p>Hello");
    let html = tree.document_element().unwrap();
    assert_eq!(tree.tag_name(html), Some("html"));
    assert_eq!(child_tags(&tree, html), vec!["head", "body"]);

    let body = tree.body().unwrap();
    assert_eq!(child_tags(&tree, body), vec!["p"]);
    assert_eq!(tree.text_content(body), "Hello");
}

#[test]
fn test_empty_input_still_has_body() {
    let tree = parse("");
    assert!(tree.body().is_some());
}

#[test]
fn test_full_document_with_whitespace() {
    let tree = parse(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=utf-8>\n<title>T &amp; U</title>\n</head>\n<body>\n<p>x</p>\n</body>\n</html>\n",
    );
    let head = first(&tree, "head");
    assert_eq!(child_tags(&tree, head), vec!["meta", "title"]);
    assert_eq!(tree.text_content(first(&tree, "title")), "T & U");
    assert_eq!(child_tags(&tree, tree.body().unwrap()), vec!["p"]);
}

#[test]
fn test_block_start_closes_paragraph() {
    let tree = parse("<p>one<div>two</div>");
    assert_eq!(child_tags(&tree, tree.body().unwrap()), vec!["p", "div"]);
}

#[test]
fn test_list_items_close_each_other() {
    let tree = parse("<ul><li>a<li>b<li>c</ul>");
    let ul = first(&tree, "ul");
    assert_eq!(child_tags(&tree, ul), vec!["li", "li", "li"]);
}

#[test]
fn test_heading_inside_heading_is_closed() {
    let tree = parse("<h1>a<h2>b</h2>");
    assert_eq!(child_tags(&tree, tree.body().unwrap()), vec!["h1", "h2"]);
}

#[test]
fn test_table_cells_close_each_other() {
    let tree = parse("<table><tr><td>a<td>b</table><p>after</p>");
    let tr = first(&tree, "tr");
    assert_eq!(child_tags(&tree, tr), vec!["td", "td"]);
    assert_eq!(child_tags(&tree, tree.body().unwrap()), vec!["table", "p"]);
}

#[test]
fn test_script_contents_do_not_create_elements() {
    let tree = parse(
        "<head><script>var x = '<p>';</script></head><body><article>x</article></body>",
    );
    assert_eq!(tree.elements_by_tag(NodeId::ROOT, "p").count(), 0);
    assert_eq!(tree.text_content(first(&tree, "script")), "var x = '<p>';");
    assert_eq!(child_tags(&tree, tree.body().unwrap()), vec!["article"]);
}

#[test]
fn test_stray_end_tags_are_reported_and_ignored() {
    let (tree, issues) = parse_with_issues("<div><span>a</div></span>b");
    let body = tree.body().unwrap();
    assert_eq!(child_tags(&tree, body), vec!["div"]);
    assert_eq!(tree.text_content(body), "ab");
    assert!(!issues.is_empty());
}

#[test]
fn test_attributes_are_lowercased_names() {
    let tree = parse(r#"<DIV Class="post" ID=main>x</DIV>"#);
    let div = first(&tree, "div");
    let data = tree.as_element(div).unwrap();
    assert_eq!(data.class_name(), "post");
    assert_eq!(data.id(), Some("main"));
}

#[test]
fn test_content_after_body_goes_back_into_body() {
    let tree = parse("<body><p>a</p></body><p>b</p>");
    assert_eq!(child_tags(&tree, tree.body().unwrap()), vec!["p", "p"]);
}

#[test]
fn test_comments_are_kept() {
    let tree = parse("<div><!-- note --></div>");
    let div = first(&tree, "div");
    let child = tree.children(div)[0];
    assert!(matches!(
        &tree.get(child).unwrap().node_type,
        NodeType::Comment(data) if data == " note "
    ));
}
