//! Integration tests for the apply session.

use mojifu_browser::{ApplyPolicy, CascadeStyleSource, Session, SessionError, parse_html_string};
use mojifu_css::CompileOptions;
use mojifu_dom::{DomTree, NoGeometry, NodeId};
use mojifu_store::{ApplyOutcome, AppliedRule, MemoryStorage, StyleLibrary};

const PAGE: &str = r#"<body>
<nav><a href="/">Home</a> <a href="/about">About</a></nav>
<article style="font-family: Georgia, serif">
<h1 id="title">Why typography matters</h1>
<p>Good type is invisible. The reader never notices it, only the words and the ideas they carry.</p>
<p>Bad type, on the other hand, gets in the way of every sentence on the page.</p>
</article></body>"#;

const URL: &str = "https://blog.example/posts/1?ref=home";

fn session() -> Session<MemoryStorage> {
    Session::new(StyleLibrary::new(MemoryStorage::new()))
}

fn first(tree: &DomTree, tag: &str) -> NodeId {
    tree.elements_by_tag(NodeId::ROOT, tag).next().unwrap()
}

fn applied(outcome: ApplyOutcome) -> AppliedRule {
    match outcome {
        ApplyOutcome::Applied(rule) => rule,
        ApplyOutcome::Duplicate => panic!("expected a new rule"),
    }
}

/// A session with one single-element style, returning its id.
fn with_single_style(session: &mut Session<MemoryStorage>, tree: &DomTree) -> String {
    let p = first(tree, "p");
    session
        .collect_selection(tree, p, "Good type", URL, &CascadeStyleSource::new(tree))
        .unwrap()
        .id
}

#[test]
fn test_pick_requires_picker_and_known_style() {
    let tree = parse_html_string(PAGE).dom;
    let mut session = session();
    assert!(matches!(
        session.pick(&tree, first(&tree, "p"), URL),
        Err(SessionError::PickerInactive)
    ));
    assert!(matches!(
        session.enter_picker("missing"),
        Err(SessionError::UnknownStyle(id)) if id == "missing"
    ));
    assert_eq!(session.pending_style(), None);
}

#[test]
fn test_pick_paragraph_uses_smart_apply_on_page_pattern() {
    let tree = parse_html_string(PAGE).dom;
    let mut session = session();
    let style = with_single_style(&mut session, &tree);

    session.enter_picker(&style).unwrap();
    assert_eq!(session.pending_style(), Some(style.as_str()));
    let rule = applied(session.pick(&tree, first(&tree, "p"), URL).unwrap());

    assert_eq!(rule.selector, "article > p:nth-of-type(1)");
    assert_eq!(rule.url_pattern.as_str(), "https://blog.example/posts/1*");
    assert_eq!(rule.options, CompileOptions::SMART);
    assert_eq!(session.pending_style(), None);
    assert!(matches!(
        session.pick(&tree, first(&tree, "p"), URL),
        Err(SessionError::PickerInactive)
    ));
}

#[test]
fn test_pick_heading_uses_exact_apply() {
    let tree = parse_html_string(PAGE).dom;
    let mut session = session();
    let style = with_single_style(&mut session, &tree);

    session.enter_picker(&style).unwrap();
    let rule = applied(session.pick(&tree, first(&tree, "h1"), URL).unwrap());
    assert_eq!(rule.selector, "#title");
    assert_eq!(rule.options, CompileOptions::EXACT);

    // Picking the same element again is a duplicate and still ends the picker.
    session.enter_picker(&style).unwrap();
    assert_eq!(
        session.pick(&tree, first(&tree, "h1"), URL).unwrap(),
        ApplyOutcome::Duplicate
    );
    assert_eq!(session.pending_style(), None);
}

#[test]
fn test_policy_is_configurable() {
    let tree = parse_html_string(PAGE).dom;
    let mut session = session().with_policy(ApplyPolicy {
        headings: CompileOptions::SMART,
        elements: CompileOptions::EXACT,
    });
    let style = with_single_style(&mut session, &tree);
    session.enter_picker(&style).unwrap();
    let rule = applied(session.pick(&tree, first(&tree, "h1"), URL).unwrap());
    assert_eq!(rule.options, CompileOptions::SMART);
}

#[test]
fn test_invalid_url_keeps_picker_active() {
    let tree = parse_html_string(PAGE).dom;
    let mut session = session();
    let style = with_single_style(&mut session, &tree);
    session.enter_picker(&style).unwrap();
    assert!(matches!(
        session.pick(&tree, first(&tree, "p"), "not a url"),
        Err(SessionError::InvalidUrl { .. })
    ));
    assert_eq!(session.pending_style(), Some(style.as_str()));
    session.exit_picker();
    assert_eq!(session.pending_style(), None);
}

#[test]
fn test_quick_apply_targets_article_site_wide() {
    let tree = parse_html_string(PAGE).dom;
    let mut session = session();
    let single = with_single_style(&mut session, &tree);
    let article = session
        .collect_article(&tree, &NoGeometry, URL, &CascadeStyleSource::new(&tree))
        .unwrap()
        .id;

    let rule = applied(session.quick_apply(&single, &tree, &NoGeometry, URL).unwrap());
    assert_eq!(rule.selector, "article");
    assert_eq!(rule.url_pattern.as_str(), "https://blog.example/*");
    assert_eq!(rule.options, CompileOptions::SMART);

    let rule = applied(session.quick_apply(&article, &tree, &NoGeometry, URL).unwrap());
    assert_eq!(rule.options, CompileOptions::default());

    assert_eq!(
        session.quick_apply(&article, &tree, &NoGeometry, URL).unwrap(),
        ApplyOutcome::Duplicate
    );
    assert!(matches!(
        session.quick_apply("missing", &tree, &NoGeometry, URL),
        Err(SessionError::UnknownStyle(_))
    ));
}

#[test]
fn test_quick_apply_without_article() {
    let tree = parse_html_string("<body><nav>Only navigation on this page</nav></body>").dom;
    let mut session = session();
    let source = parse_html_string(PAGE).dom;
    let style = with_single_style(&mut session, &source);
    assert!(matches!(
        session.quick_apply(&style, &tree, &NoGeometry, URL),
        Err(SessionError::NoArticle)
    ));
}

#[test]
fn test_applied_stylesheet_follows_patterns() {
    let tree = parse_html_string(PAGE).dom;
    let mut session = session();
    let style = with_single_style(&mut session, &tree);

    session.enter_picker(&style).unwrap();
    let _ = session.pick(&tree, first(&tree, "h1"), URL).unwrap();
    let _ = session.quick_apply(&style, &tree, &NoGeometry, URL).unwrap();

    let same_page = session.applied_stylesheet(URL).unwrap();
    assert!(same_page.css.contains("#title {"));
    assert!(same_page.css.contains("article p"));
    // The picked rule is older, so it comes first.
    assert!(same_page.css.find("#title").unwrap() < same_page.css.find("article").unwrap());

    let other_page = session
        .applied_stylesheet("https://blog.example/posts/2")
        .unwrap();
    assert!(!other_page.css.contains("#title"));
    assert!(other_page.css.contains("article *"));

    assert!(session
        .applied_stylesheet("https://elsewhere.example/")
        .unwrap()
        .is_empty());
}

#[test]
fn test_collect_saves_records() {
    let tree = parse_html_string(PAGE).dom;
    let mut session = session();
    let id = with_single_style(&mut session, &tree);
    let article = session
        .collect_article(&tree, &NoGeometry, URL, &CascadeStyleSource::new(&tree))
        .unwrap();
    assert_eq!(article.name, "Article Style from blog.example");

    let saved: Vec<String> = session
        .library()
        .saved_styles()
        .unwrap()
        .into_iter()
        .map(|s| s.id)
        .collect();
    assert_eq!(saved, vec![id, article.id]);
}
