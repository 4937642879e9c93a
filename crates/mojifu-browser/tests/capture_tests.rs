//! Integration tests for style and font capture.

use mojifu_browser::capture::DEFAULT_SAMPLE_TEXT;
use mojifu_browser::{
    CascadeStyleSource, CaptureError, ComputedStyleSource, article_name, capture_article,
    capture_selection, collect_font_resources, extract_styles, generate_name, parse_html_string,
};
use mojifu_css::{FontResourceSet, PropertySet, StructureTag, TextProperty};
use mojifu_dom::{DomTree, NoGeometry, NodeId};
use mojifu_store::StyleKind;

const PAGE: &str = r#"<html><head>
<link rel="stylesheet" href="https://fonts.googleapis.com/css2?family=Lora:wght@400;700&display=swap">
<link rel="stylesheet" href="https://fonts.googleapis.com/css2?family=Inter">
<style>
@font-face { font-family: "Lora"; src: url("/fonts/lora.woff2") format("woff2"); }
@font-face { font-family: 'Other'; src: url(other.woff2); }
</style>
</head><body>
<nav><a href="/">Home</a></nav>
<article style="font-family: 'Lora', Georgia, serif; color: #222">
<h1 id="title" style="font-size: 40px">A Long Title For The Article Page</h1>
<h2>First section</h2>
<p id="lead" style="line-height: 1.7">The quick brown fox jumps over the lazy dog while the cat watches from the window sill.</p>
<h2>Second section</h2>
<p>More text with a <a href="/x"><span>link</span></a> and <em>emphasis</em>.</p>
</article></body></html>"#;

fn by_id(tree: &DomTree, id: &str) -> NodeId {
    tree.descendants(NodeId::ROOT)
        .find(|&n| tree.as_element(n).and_then(|e| e.id()) == Some(id))
        .unwrap_or_else(|| panic!("no #{id}"))
}

fn first(tree: &DomTree, tag: &str) -> NodeId {
    tree.elements_by_tag(NodeId::ROOT, tag).next().unwrap()
}

fn value(properties: &PropertySet, prop: TextProperty) -> &str {
    &properties.get(prop).unwrap().value
}

#[test]
fn test_inline_styles_inherit_and_ua_defaults_apply() {
    let tree = parse_html_string(PAGE).dom;
    let h1 = extract_styles(&tree, by_id(&tree, "title"), &CascadeStyleSource::new(&tree));
    assert_eq!(h1.len(), 10);
    assert!(h1.iter().all(|(_, p)| p.enabled));
    assert_eq!(value(&h1, TextProperty::FontFamily), "'Lora', Georgia, serif");
    assert_eq!(value(&h1, TextProperty::FontSize), "40px");
    assert_eq!(value(&h1, TextProperty::FontWeight), "700");
    assert_eq!(value(&h1, TextProperty::Color), "#222");
    assert_eq!(value(&h1, TextProperty::LineHeight), "normal");

    let h2 = extract_styles(&tree, first(&tree, "h2"), &CascadeStyleSource::new(&tree));
    assert_eq!(value(&h2, TextProperty::FontSize), "24px");

    let lead = extract_styles(&tree, by_id(&tree, "lead"), &CascadeStyleSource::new(&tree));
    assert_eq!(value(&lead, TextProperty::FontSize), "16px");
    assert_eq!(value(&lead, TextProperty::FontWeight), "400");
    assert_eq!(value(&lead, TextProperty::LineHeight), "1.7");
}

#[test]
fn test_text_decoration_is_not_inherited() {
    let tree = parse_html_string(PAGE).dom;
    let source = CascadeStyleSource::new(&tree);
    let link = first(&tree, "a");
    let span = first(&tree, "span");
    assert_eq!(source.value(&tree, link, TextProperty::TextDecoration), "underline");
    assert_eq!(source.value(&tree, span, TextProperty::TextDecoration), "none");
    assert_eq!(source.value(&tree, span, TextProperty::Color), "rgb(0, 0, 238)");
    assert_eq!(
        source.value(&tree, first(&tree, "em"), TextProperty::FontStyle),
        "italic"
    );
}

#[test]
fn test_inherit_and_initial_keywords() {
    let tree = parse_html_string(
        "<div style='text-decoration: underline; color: red'>\
         <p style='text-decoration: inherit'>a</p><span style='color: initial'>b</span></div>",
    )
    .dom;
    let source = CascadeStyleSource::new(&tree);
    assert_eq!(
        source.value(&tree, first(&tree, "p"), TextProperty::TextDecoration),
        "underline"
    );
    assert_eq!(
        source.value(&tree, first(&tree, "span"), TextProperty::Color),
        "rgb(0, 0, 0)"
    );
}

#[test]
fn test_style_element_rules_are_captured() {
    let tree = parse_html_string(
        "<style>p{font-family:Georgia;font-size:20px}</style><p>Hello</p>",
    )
    .dom;
    let p = extract_styles(&tree, first(&tree, "p"), &CascadeStyleSource::new(&tree));
    assert_eq!(value(&p, TextProperty::FontFamily), "Georgia");
    assert_eq!(value(&p, TextProperty::FontSize), "20px");
}

#[test]
fn test_cascade_order() {
    let tree = parse_html_string(
        r#"<style>
        #x { color: red }
        p.a { color: blue !important }
        p { color: green; font-size: 12px; line-height: 1 }
        .a { font-size: 10px }
        p { line-height: 2 }
        </style>
        <p id="x" class="a" style="color: black; font-size: 14px">a</p>
        <p class="a">b</p>"#,
    )
    .dom;
    let source = CascadeStyleSource::new(&tree);
    let styled = by_id(&tree, "x");
    let plain = tree.elements_by_tag(NodeId::ROOT, "p").nth(1).unwrap();

    // Importance beats the style attribute.
    assert_eq!(source.value(&tree, styled, TextProperty::Color), "blue");
    // The style attribute beats any selector.
    assert_eq!(source.value(&tree, styled, TextProperty::FontSize), "14px");
    // A class beats a type selector, whatever their order.
    assert_eq!(source.value(&tree, plain, TextProperty::FontSize), "10px");
    // Equal specificity: the later rule wins.
    assert_eq!(source.value(&tree, plain, TextProperty::LineHeight), "2");
}

#[test]
fn test_author_rules_inherit_and_skip_unreadable_selectors() {
    let tree = parse_html_string(
        "<style>body { font-family: Lora } p > { color: red } em { font-weight: 600 }</style>         <p>text <em>stress</em></p>",
    )
    .dom;
    let source = CascadeStyleSource::new(&tree);
    let em = first(&tree, "em");
    assert_eq!(source.value(&tree, em, TextProperty::FontFamily), "Lora");
    assert_eq!(source.value(&tree, em, TextProperty::FontWeight), "600");
    assert_eq!(source.value(&tree, em, TextProperty::FontStyle), "italic");
    assert_eq!(source.value(&tree, first(&tree, "p"), TextProperty::Color), "rgb(0, 0, 0)");
}

#[test]
fn test_generate_name() {
    let properties = PropertySet::new()
        .with(TextProperty::FontFamily, "\"Source Serif 4\", Georgia, serif")
        .with(TextProperty::FontSize, "18px");
    assert_eq!(generate_name(&properties), "Source Serif 4, 18px");
}

#[test]
fn test_article_name() {
    assert_eq!(
        article_name("https://www.example.com/posts/1"),
        "Article Style from example.com"
    );
    assert_eq!(
        article_name("https://blog.example.org/"),
        "Article Style from blog.example.org"
    );
    assert_eq!(article_name("not a url"), "Article Style");
}

#[test]
fn test_capture_selection_from_text_node() {
    let tree = parse_html_string(PAGE).dom;
    let lead = by_id(&tree, "lead");
    let text = tree.children(lead)[0];
    let selected = "  The quick brown fox jumps over the lazy dog while the cat watches  ";

    let source = CascadeStyleSource::new(&tree);
    let record = capture_selection(&tree, text, selected, "https://site.example/a", &source);
    assert_eq!(record.name, "Lora, 16px");
    assert_eq!(record.source_url, "https://site.example/a");
    assert!(record.created_at > 0);
    assert_eq!(record.sample_text(), "The quick brown fox jumps over the lazy dog while ...");
    let StyleKind::Single { properties, .. } = &record.kind else {
        panic!("expected a single record");
    };
    assert_eq!(value(properties, TextProperty::LineHeight), "1.7");

    let Some(FontResourceSet::Single(fonts)) = &record.font_resources else {
        panic!("expected font resources");
    };
    assert_eq!(
        fonts.google_fonts_links,
        vec!["https://fonts.googleapis.com/css2?family=Lora:wght@400;700&display=swap"]
    );
    assert_eq!(fonts.font_face_rules.len(), 1);
    assert_eq!(fonts.font_urls, vec!["/fonts/lora.woff2"]);
}

#[test]
fn test_capture_selection_defaults() {
    let tree = parse_html_string("<p>short</p>").dom;
    let source = CascadeStyleSource::new(&tree);
    let record = capture_selection(&tree, first(&tree, "p"), "   ", "", &source);
    assert_eq!(record.sample_text(), DEFAULT_SAMPLE_TEXT);
    assert_eq!(record.name, "serif, 16px");
    assert!(record.font_resources.is_none());

    let other = capture_selection(&tree, first(&tree, "p"), "short", "", &source);
    assert_eq!(other.sample_text(), "short");
    assert_ne!(record.id, other.id);
}

#[test]
fn test_capture_article_structure() {
    let tree = parse_html_string(PAGE).dom;
    let source = CascadeStyleSource::new(&tree);
    let record =
        capture_article(&tree, &NoGeometry, "https://www.site.example/post", &source).unwrap();
    assert_eq!(record.name, "Article Style from site.example");
    assert_eq!(record.sample_text(), "Article Structure");

    let StyleKind::Article { structure, .. } = &record.kind else {
        panic!("expected an article record");
    };
    assert_eq!(
        structure.keys().copied().collect::<Vec<_>>(),
        vec![StructureTag::H1, StructureTag::H2, StructureTag::P]
    );
    assert_eq!(
        structure[&StructureTag::H1].sample_text,
        "A Long Title For The Article P..."
    );
    assert_eq!(structure[&StructureTag::H2].sample_text, "First section");
    let p = structure[&StructureTag::P].properties.as_ref().unwrap();
    assert_eq!(value(p, TextProperty::LineHeight), "1.7");

    let Some(FontResourceSet::PerTag(fonts)) = &record.font_resources else {
        panic!("expected per-tag font resources");
    };
    assert_eq!(fonts.keys().collect::<Vec<_>>(), vec!["H1", "H2", "P"]);
}

#[test]
fn test_capture_article_errors() {
    let tree = parse_html_string("<body><nav>Only navigation here</nav></body>").dom;
    assert_eq!(
        capture_article(&tree, &NoGeometry, "https://x.example/", &CascadeStyleSource::new(&tree)),
        Err(CaptureError::NoArticle)
    );

    let tree = parse_html_string(
        "<body><article><ul><li>A list without any headings or paragraphs at all</li></ul></article></body>",
    )
    .dom;
    assert_eq!(
        capture_article(&tree, &NoGeometry, "https://x.example/", &CascadeStyleSource::new(&tree))
            .unwrap_err(),
        CaptureError::NoStructureElements
    );
}

#[test]
fn test_font_resources_need_a_declared_family() {
    let tree = parse_html_string(PAGE).dom;
    let inter = collect_font_resources(&tree, "inter").unwrap();
    assert_eq!(inter.google_fonts_links.len(), 1);
    assert!(inter.font_face_rules.is_empty());
    assert!(collect_font_resources(&tree, "Georgia").is_none());
    assert!(collect_font_resources(&tree, "").is_none());
}
