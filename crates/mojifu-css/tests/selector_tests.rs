//! Integration tests for selector matching and querying on parsed documents.

use mojifu_css::{parse_selector, query_selector, query_selector_all};
use mojifu_dom::{DomTree, NodeId};
use mojifu_html::parse;

const PAGE: &str = r#"<body>
<nav class="menu"><a href="/">Home</a></nav>
<main id="content">
  <article class="post featured" role="main">
    <h1>Title</h1>
    <p class="lead">First</p>
    <p>Second</p>
    <div class="note"><p>Nested</p></div>
  </article>
  <article class="post"><p>Other</p></article>
</main>
</body>"#;

fn texts(tree: &DomTree, ids: &[NodeId]) -> Vec<String> {
    ids.iter().map(|&id| tree.text_content(id).trim().to_string()).collect()
}

#[test]
fn test_query_selector_all_is_in_document_order() {
    let tree = parse(PAGE);
    let found = query_selector_all(&tree, NodeId::ROOT, "article p");
    assert_eq!(texts(&tree, &found), vec!["First", "Second", "Nested", "Other"]);
}

#[test]
fn test_child_combinator() {
    let tree = parse(PAGE);
    let found = query_selector_all(&tree, NodeId::ROOT, "article > p");
    assert_eq!(texts(&tree, &found), vec!["First", "Second", "Other"]);
}

#[test]
fn test_attribute_selectors() {
    let tree = parse(PAGE);
    assert_eq!(
        query_selector_all(&tree, NodeId::ROOT, r#"article[role="main"]"#).len(),
        1
    );
    assert_eq!(query_selector_all(&tree, NodeId::ROOT, "[role=main] h1").len(), 1);
    assert_eq!(query_selector_all(&tree, NodeId::ROOT, "[class~=post]").len(), 2);
    assert_eq!(query_selector_all(&tree, NodeId::ROOT, "a[href^='/']").len(), 1);
}

#[test]
fn test_nth_of_type() {
    let tree = parse(PAGE);
    let second = query_selector(&tree, NodeId::ROOT, "main > article:nth-of-type(2)").unwrap();
    assert_eq!(tree.text_content(second).trim(), "Other");
    let p = query_selector(&tree, NodeId::ROOT, "article.featured > p:nth-of-type(2)").unwrap();
    assert_eq!(tree.text_content(p), "Second");
}

#[test]
fn test_selector_list_matches_either() {
    let tree = parse(PAGE);
    let found = query_selector_all(&tree, NodeId::ROOT, "h1, .lead");
    assert_eq!(texts(&tree, &found), vec!["Title", "First"]);
}

#[test]
fn test_id_and_compound_class() {
    let tree = parse(PAGE);
    assert!(query_selector(&tree, NodeId::ROOT, "#content").is_some());
    assert_eq!(query_selector_all(&tree, NodeId::ROOT, ".post.featured").len(), 1);
    assert!(query_selector(&tree, NodeId::ROOT, ".missing").is_none());
}

#[test]
fn test_invalid_selector_matches_nothing() {
    let tree = parse(PAGE);
    assert!(query_selector_all(&tree, NodeId::ROOT, "article >").is_empty());
    assert!(query_selector(&tree, NodeId::ROOT, "..post").is_none());
    assert!(parse_selector("div >").is_none());
}

#[test]
fn test_query_is_scoped_to_root() {
    let tree = parse(PAGE);
    let note = query_selector(&tree, NodeId::ROOT, ".note").unwrap();
    let found = query_selector_all(&tree, note, "p");
    assert_eq!(texts(&tree, &found), vec!["Nested"]);
}

#[test]
fn test_child_position_pseudo_classes() {
    let tree = parse(PAGE);
    let first = query_selector(&tree, NodeId::ROOT, "article.featured > :first-child").unwrap();
    assert_eq!(tree.text_content(first), "Title");
    let last = query_selector(&tree, NodeId::ROOT, "article.featured > :last-child").unwrap();
    assert_eq!(tree.text_content(last), "Nested");
    let second = query_selector(&tree, NodeId::ROOT, "article.featured > :nth-child(2)").unwrap();
    assert_eq!(tree.text_content(second), "First");
    let only = query_selector_all(&tree, NodeId::ROOT, "p:only-child");
    assert_eq!(texts(&tree, &only), vec!["Nested", "Other"]);
}

#[test]
fn test_root_and_empty() {
    let tree = parse("<div><span></span><span> </span><span>x</span></div>");
    let root = query_selector(&tree, NodeId::ROOT, ":root").unwrap();
    assert_eq!(tree.as_element(root).unwrap().tag_name, "html");
    assert_eq!(query_selector_all(&tree, NodeId::ROOT, "span:empty").len(), 2);
}

#[test]
fn test_sibling_combinators() {
    let tree = parse(PAGE);
    let next = query_selector_all(&tree, NodeId::ROOT, "h1 + p");
    assert_eq!(texts(&tree, &next), vec!["First"]);
    let following = query_selector_all(&tree, NodeId::ROOT, "h1 ~ p");
    assert_eq!(texts(&tree, &following), vec!["First", "Second"]);
    assert!(query_selector(&tree, NodeId::ROOT, "p + h1").is_none());
}

#[test]
fn test_descendant_step_tries_every_ancestor() {
    let tree = parse(r#"<section><div><div class="inner"><p>x</p></div></div></section>"#);
    // The nearest div ancestor is not a child of the section; the outer one is.
    assert_eq!(query_selector_all(&tree, NodeId::ROOT, "section > div p").len(), 1);
    assert_eq!(query_selector_all(&tree, NodeId::ROOT, "section > .inner p").len(), 0);
}
