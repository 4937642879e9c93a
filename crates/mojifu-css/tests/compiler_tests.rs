//! Integration tests for CSS rule synthesis.

use mojifu_css::{
    CompileOptions, PropertySet, StructureEntry, StructureMap, StructureTag, TextProperty,
    compile_article, compile_single,
};

fn georgia() -> PropertySet {
    PropertySet::new()
        .with(TextProperty::FontFamily, "Georgia, serif")
        .with(TextProperty::FontSize, "16px")
        .with_disabled(TextProperty::Color, "#333")
}

fn full_set() -> PropertySet {
    PropertySet::new()
        .with(TextProperty::FontFamily, "\"Lora\", serif")
        .with(TextProperty::FontSize, "18px")
        .with(TextProperty::FontWeight, "400")
        .with(TextProperty::Color, "rgb(20, 20, 20)")
        .with(TextProperty::LineHeight, "1.6")
        .with(TextProperty::TextShadow, "none")
}

fn entry(properties: PropertySet) -> StructureEntry {
    StructureEntry::new(properties, "sample...")
}

/// Every rule `selector { ... }` in `css` whose selector list contains
/// `target`, as the declaration body.
fn bodies_for<'a>(css: &'a str, target: &str) -> Vec<&'a str> {
    let mut found = Vec::new();
    let mut rest = css;
    while let Some(open) = rest.find(" { ") {
        let selectors = &rest[..open];
        let close = rest[open..].find(" }").map_or(rest.len(), |i| open + i);
        let body = &rest[open + 3..close];
        if selectors.split(",\n").any(|s| s.trim() == target) {
            found.push(body);
        }
        rest = rest[close..].trim_start_matches(" }").trim_start_matches('\n');
    }
    found
}

#[test]
fn test_exact_apply_output() {
    let css = compile_single(".art", &georgia(), CompileOptions::default());
    assert_eq!(
        css,
        ".art { font-family: Georgia, serif !important; font-size: 16px !important; }"
    );
}

#[test]
fn test_exact_apply_keeps_empty_rule() {
    let nothing = PropertySet::new().with_disabled(TextProperty::FontSize, "12px");
    assert_eq!(compile_single("p", &nothing, CompileOptions::EXACT), "p { ; }");
}

#[test]
fn test_compile_single_is_idempotent() {
    let set = full_set();
    for options in [CompileOptions::EXACT, CompileOptions::SMART] {
        assert_eq!(
            compile_single("#main", &set, options),
            compile_single("#main", &set, options)
        );
    }
}

#[test]
fn test_smart_apply_layout() {
    let css = compile_single(".art", &georgia(), CompileOptions::SMART);
    assert_eq!(
        css,
        ".art { font-family: Georgia, serif !important; }\n\
         .art * { font-family: Georgia, serif !important; }\n\
         .art,\n.art p,\n.art span,\n.art li,\n.art a,\n.art div,\n.art td,\n.art blockquote,\n.art pre,\n.art code { font-size: 16px !important; }"
    );
}

#[test]
fn test_smart_apply_never_targets_headings() {
    let css = compile_single("article", &full_set(), CompileOptions::SMART);
    for level in 1..=6 {
        assert!(
            !css.contains(&format!("article h{level}")),
            "heading h{level} targeted in:\n{css}"
        );
    }
    // Typography only lands on the body text rule.
    let star = bodies_for(&css, "article *");
    assert_eq!(star.len(), 1);
    assert!(!star[0].contains("font-size"));
}

#[test]
fn test_smart_apply_omits_empty_tiers() {
    let identity_only = PropertySet::new().with(TextProperty::Color, "red");
    let css = compile_single("x", &identity_only, CompileOptions::SMART);
    assert_eq!(css, "x { color: red !important; }\nx * { color: red !important; }");

    let none = PropertySet::new();
    assert_eq!(compile_single("x", &none, CompileOptions::SMART), "");
}

#[test]
fn test_article_heading_fallback_searches_up_first() {
    let mut structure = StructureMap::new();
    let _ = structure.insert(
        StructureTag::H1,
        entry(PropertySet::new().with(TextProperty::FontSize, "24px")),
    );
    let _ = structure.insert(
        StructureTag::H3,
        entry(PropertySet::new().with(TextProperty::FontSize, "18px")),
    );
    let css = compile_article(".post", &structure);

    assert_eq!(bodies_for(&css, ".post h1"), vec!["font-size: 24px !important;"]);
    assert_eq!(bodies_for(&css, ".post h2"), vec!["font-size: 24px !important;"]);
    assert_eq!(bodies_for(&css, ".post h3"), vec!["font-size: 18px !important;"]);
    for heading in ["h4", "h5", "h6"] {
        assert_eq!(
            bodies_for(&css, &format!(".post {heading}")),
            vec!["font-size: 18px !important;"]
        );
    }
    // No P captured: no identity and no body text rules.
    assert!(bodies_for(&css, ".post").is_empty());
    assert!(bodies_for(&css, ".post a").is_empty());
}

#[test]
fn test_article_heading_fallback_searches_down_when_needed() {
    let mut structure = StructureMap::new();
    let _ = structure.insert(
        StructureTag::H2,
        entry(PropertySet::new().with(TextProperty::FontWeight, "700")),
    );
    let css = compile_article("main", &structure);
    assert_eq!(bodies_for(&css, "main h1"), vec!["font-weight: 700 !important;"]);
}

#[test]
fn test_article_identity_from_paragraph_then_h1() {
    let mut structure = StructureMap::new();
    let _ = structure.insert(StructureTag::H1, entry(full_set()));
    let css = compile_article("article", &structure);
    assert_eq!(
        bodies_for(&css, "article"),
        vec!["font-family: \"Lora\", serif !important; color: rgb(20, 20, 20) !important; text-shadow: none !important;"]
    );

    let _ = structure.insert(
        StructureTag::P,
        entry(PropertySet::new().with(TextProperty::Color, "#111")),
    );
    let css = compile_article("article", &structure);
    assert_eq!(bodies_for(&css, "article"), vec!["color: #111 !important;"]);
    assert_eq!(bodies_for(&css, "article *"), vec!["color: #111 !important;"]);
}

#[test]
fn test_article_body_text_completion() {
    let mut structure = StructureMap::new();
    let _ = structure.insert(
        StructureTag::P,
        entry(
            PropertySet::new()
                .with(TextProperty::FontFamily, "Inter")
                .with(TextProperty::LineHeight, "1.5"),
        ),
    );
    let css = compile_article(".a", &structure);
    let rules: Vec<&str> = css.lines().collect();
    assert_eq!(rules[0], ".a { font-family: Inter !important; }");
    assert_eq!(rules[1], ".a * { font-family: Inter !important; }");
    assert_eq!(rules[2], ".a p { line-height: 1.5 !important; }");
    // Every heading falls back to nothing: no heading was captured.
    assert!(!css.contains(".a h"));
    // p was captured, so completion starts at span and ends with links.
    assert_eq!(rules[3], ".a span { line-height: 1.5 !important; }");
    assert_eq!(rules.last(), Some(&".a a { line-height: 1.5 !important; }"));
    assert_eq!(rules.len(), 3 + 13 + 1);
}

#[test]
fn test_article_skips_entries_without_properties() {
    let mut structure = StructureMap::new();
    let _ = structure.insert(
        StructureTag::H2,
        StructureEntry {
            properties: None,
            sample_text: String::new(),
        },
    );
    let _ = structure.insert(
        StructureTag::P,
        entry(PropertySet::new().with(TextProperty::FontSize, "17px")),
    );
    let css = compile_article("body", &structure);
    assert!(bodies_for(&css, "body h2").is_empty());
    // H1 falls back down to the empty H2 entry and gets nothing either.
    assert!(bodies_for(&css, "body h1").is_empty());
    assert_eq!(bodies_for(&css, "body p"), vec!["font-size: 17px !important;"]);
}

#[test]
fn test_toggling_one_property_changes_only_that_declaration() {
    let mut set = full_set();
    let before = compile_single(".t", &set, CompileOptions::SMART);
    assert!(set.set_enabled(TextProperty::LineHeight, false));
    let after = compile_single(".t", &set, CompileOptions::SMART);
    assert_eq!(before.replace("; line-height: 1.6 !important", ""), after);

    assert!(set.set_enabled(TextProperty::LineHeight, true));
    assert_eq!(compile_single(".t", &set, CompileOptions::SMART), before);
    assert!(!set.set_enabled(TextProperty::TextTransform, false));
}

#[test]
fn test_property_set_json_shape() {
    let json = serde_json::to_string(&georgia()).unwrap();
    assert_eq!(
        json,
        r##"{"fontFamily":{"value":"Georgia, serif","enabled":true},"fontSize":{"value":"16px","enabled":true},"color":{"value":"#333","enabled":false}}"##
    );

    let loaded: PropertySet =
        serde_json::from_str(r#"{"fontSize":{"value":"12px","enabled":true},"wordSpacing":{"value":"1px","enabled":true}}"#)
            .unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded.get(TextProperty::FontSize).unwrap().value, "12px");
}

#[test]
fn test_exact_apply_follows_insertion_order() {
    let set = PropertySet::new()
        .with(TextProperty::FontSize, "16px")
        .with(TextProperty::FontFamily, "Georgia");
    assert_eq!(
        compile_single(".art", &set, CompileOptions::EXACT),
        ".art { font-size: 16px !important; font-family: Georgia !important; }"
    );
}

#[test]
fn test_body_text_completion_uses_typography_order() {
    let mut structure = StructureMap::new();
    let _ = structure.insert(
        StructureTag::P,
        entry(
            PropertySet::new()
                .with(TextProperty::FontWeight, "300")
                .with(TextProperty::LineHeight, "1.5")
                .with(TextProperty::FontSize, "17px"),
        ),
    );
    let css = compile_article(".a", &structure);
    // The captured tag keeps its own order.
    assert_eq!(
        bodies_for(&css, ".a p"),
        vec!["font-weight: 300 !important; line-height: 1.5 !important; font-size: 17px !important;"]
    );
    assert_eq!(
        bodies_for(&css, ".a span"),
        vec!["font-size: 17px !important; line-height: 1.5 !important; font-weight: 300 !important;"]
    );
}
