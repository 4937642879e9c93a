//! Integration tests for article location and selector derivation.

use mojifu_dom::{DomTree, FixedGeometry, NoGeometry, NodeId, Rect};
use mojifu_html::parse;
use mojifu_locator::{DISQUALIFIED, Tier, get_selector, locate, score};

/// A paragraph long enough to count as real content.
fn paragraph(n: usize) -> String {
    format!(
        "<p>Paragraph {n} talks at some length about the topic at hand, so that it reads like prose.</p>"
    )
}

fn paragraphs(count: usize) -> String {
    (0..count).map(paragraph).collect()
}

fn by_id(tree: &DomTree, id: &str) -> NodeId {
    tree.descendants(NodeId::ROOT)
        .find(|&n| tree.as_element(n).and_then(|e| e.id()) == Some(id))
        .unwrap_or_else(|| panic!("no #{id}"))
}

fn first(tree: &DomTree, tag: &str) -> NodeId {
    tree.elements_by_tag(NodeId::ROOT, tag).next().unwrap()
}

#[test]
fn test_single_article_is_found_and_named_article() {
    let html = format!(
        "<body><header><h1>Site</h1></header><nav><a href='/'>Home</a></nav>\
         <article><h1>Headline</h1>{}</article><footer>Copyright notice for the site</footer></body>",
        paragraphs(4)
    );
    let tree = parse(&html);
    let found = locate(&tree, &NoGeometry).unwrap();
    assert_eq!(tree.tag_name(found.node), Some("article"));
    assert_eq!(found.tier, Tier::Semantic);
    assert!(found.score > 30);
    assert_eq!(get_selector(&tree, found.node), "article");
}

#[test]
fn test_disqualified_elements_are_never_selected() {
    let tree = parse(
        "<body><article>Too short</article>\
         <nav>Lots and lots of navigation text that is long enough to score</nav></body>",
    );
    assert_eq!(score(&tree, first(&tree, "article"), &NoGeometry), DISQUALIFIED);
    assert_eq!(score(&tree, first(&tree, "nav"), &NoGeometry), DISQUALIFIED);
    assert_eq!(locate(&tree, &NoGeometry), None);
}

#[test]
fn test_class_pattern_probe() {
    let html = format!(
        "<body><div class=\"post-content\">{}</div><div class=\"other\">short</div></body>",
        paragraphs(3)
    );
    let tree = parse(&html);
    let found = locate(&tree, &NoGeometry).unwrap();
    assert_eq!(found.tier, Tier::ClassPattern);
    assert_eq!(get_selector(&tree, found.node), "div.post-content");
}

#[test]
fn test_broad_probe_takes_first_of_equal_scores() {
    let html = format!(
        "<body><div class=\"wrapper\"><section>{}</section></div></body>",
        paragraphs(7)
    );
    let tree = parse(&html);
    let found = locate(&tree, &NoGeometry).unwrap();
    assert_eq!(found.tier, Tier::Broad);
    assert_eq!(tree.tag_name(found.node), Some("div"));
    assert_eq!(get_selector(&tree, found.node), "div.wrapper");
}

#[test]
fn test_paragraph_cluster_fallback() {
    let html = format!(
        "<body><div id=\"story\">{}</div><div><p>tiny</p></div></body>",
        paragraphs(2)
    );
    let tree = parse(&html);
    let found = locate(&tree, &NoGeometry).unwrap();
    assert_eq!(found.tier, Tier::ParagraphCluster);
    assert_eq!(found.node, by_id(&tree, "story"));
    assert_eq!(get_selector(&tree, found.node), "#story");
}

#[test]
fn test_paragraph_cluster_skips_disqualified_largest_cluster() {
    let html = format!(
        "<body><div class=\"comments\">{}</div><div id=\"story\">{}</div></body>",
        paragraphs(6),
        paragraphs(2)
    );
    let tree = parse(&html);
    let comments = first(&tree, "div");
    assert!(score(&tree, comments, &NoGeometry) < 0);

    let found = locate(&tree, &NoGeometry).unwrap();
    assert_eq!(found.tier, Tier::ParagraphCluster);
    assert_eq!(found.node, by_id(&tree, "story"));
    assert!(found.score >= 0);
}

#[test]
fn test_deeply_nested_article_is_scored() {
    let html = format!(
        "<body><article>{}{}</article></body>",
        "<span>".repeat(20_000),
        paragraphs(3)
    );
    let tree = parse(&html);
    let found = locate(&tree, &NoGeometry).unwrap();
    assert_eq!(found.node, first(&tree, "article"));
    assert_eq!(found.tier, Tier::Semantic);
}

#[test]
fn test_empty_page_has_no_article() {
    let tree = parse("<body><p>hi</p></body>");
    assert!(locate(&tree, &NoGeometry).is_none());
}

#[test]
fn test_score_text_density() {
    let tree = parse("<body><div id=\"t\">abcdefghijklmnopqrstuvwxyz0123</div></body>");
    assert_eq!(score(&tree, by_id(&tree, "t"), &NoGeometry), 25);
}

#[test]
fn test_score_link_density_penalty() {
    let tree = parse("<body><div id=\"t\"><a>abcdefghijklmnopqrstuvwxyz0123</a></div></body>");
    assert_eq!(score(&tree, by_id(&tree, "t"), &NoGeometry), -5);
}

#[test]
fn test_score_depth_penalty() {
    let open = "<div>".repeat(10);
    let close = "</div>".repeat(10);
    let html = format!("<body>{open}<div id=\"t\">abcdefghijklmnopqrstuvwxyz0123</div>{close}</body>");
    let tree = parse(&html);
    assert_eq!(score(&tree, by_id(&tree, "t"), &NoGeometry), 21);
}

#[test]
fn test_score_class_keywords() {
    let tree = parse(
        "<body><div id=\"a\" class=\"content\">abcdefghijklmnopqrstuvwxyz0123</div>\
         <div id=\"b\" class=\"content sidebar\">abcdefghijklmnopqrstuvwxyz0123</div></body>",
    );
    assert_eq!(score(&tree, by_id(&tree, "a"), &NoGeometry), 50);
    assert_eq!(score(&tree, by_id(&tree, "b"), &NoGeometry), 0);
}

#[test]
fn test_score_size_bonus() {
    let tree = parse("<body><div id=\"t\">abcdefghijklmnopqrstuvwxyz0123</div></body>");
    let node = by_id(&tree, "t");
    let mut geometry = FixedGeometry::new();
    geometry.set(node, Rect::new(300.0, 200.0));
    assert_eq!(score(&tree, node, &geometry), 30);
    geometry.set(node, Rect::new(299.0, 800.0));
    assert_eq!(score(&tree, node, &geometry), 25);
}

#[test]
fn test_selector_for_body_and_html() {
    let tree = parse("<p>x</p>");
    assert_eq!(get_selector(&tree, tree.body().unwrap()), "body");
    assert_eq!(get_selector(&tree, tree.document_element().unwrap()), "body");
    assert_eq!(get_selector(&tree, NodeId::ROOT), "body");
}

#[test]
fn test_selector_prefers_plain_ids() {
    let tree = parse("<body><div id=\"main-2\">a</div><div id=\"1st\">b</div></body>");
    assert_eq!(get_selector(&tree, by_id(&tree, "main-2")), "#main-2");
    assert_eq!(get_selector(&tree, by_id(&tree, "1st")), "div:nth-of-type(2)");
}

#[test]
fn test_selector_unique_role() {
    let tree = parse("<body><div role=\"main\">a</div></body>");
    let node = first(&tree, "div");
    assert_eq!(get_selector(&tree, node), "[role=\"main\"]");
}

#[test]
fn test_selector_path_with_nth_of_type() {
    let tree = parse("<body><main><article>A</article><article>B</article></main></body>");
    let second = tree.elements_by_tag(NodeId::ROOT, "article").nth(1).unwrap();
    assert_eq!(get_selector(&tree, second), "main > article:nth-of-type(2)");
}

#[test]
fn test_selector_skips_utility_and_odd_sized_classes() {
    let tree = parse(
        "<body><div class=\"is-active js-hook ab moji-fu-highlight post-body card extra\">x</div></body>",
    );
    assert_eq!(get_selector(&tree, first(&tree, "div")), "div.post-body.card");
}

#[test]
fn test_selector_falls_back_to_last_two_segments() {
    let nest = "<div><div><div><div><span>x</span></div></div></div></div>";
    let tree = parse(&format!("<body>{nest}{nest}</body>"));
    let span = first(&tree, "span");
    assert_eq!(get_selector(&tree, span), "div > span");
}
