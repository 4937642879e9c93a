//! Collecting the font resources of a captured font family.
//!
//! Only what the document itself declares is collected: Google Fonts
//! stylesheet links and `@font-face` rules in `<style>` elements. The font
//! files are never fetched.

use mojifu_css::{AtRule, FontResources, parse_stylesheet};
use mojifu_dom::{DomTree, NodeId};
use url::Url;

const GOOGLE_FONTS_HOST: &str = "fonts.googleapis.com";

fn unquote(value: &str) -> &str {
    value.trim().trim_matches(|c| c == '"' || c == '\'')
}

/// Google Fonts stylesheet links whose `family` parameter names `family`.
fn google_fonts_links(tree: &DomTree, family: &str) -> Vec<String> {
    let mut links = Vec::new();
    for link in tree.elements_by_tag(NodeId::ROOT, "link") {
        let Some(href) = tree.as_element(link).and_then(|e| e.attr("href")) else {
            continue;
        };
        let Ok(url) = Url::parse(href) else {
            continue;
        };
        if url.host_str() != Some(GOOGLE_FONTS_HOST) {
            continue;
        }
        let names_family = url
            .query_pairs()
            .filter(|(key, _)| key == "family")
            .flat_map(|(_, value)| {
                value
                    .split('|')
                    .map(|spec| spec.split(':').next().unwrap_or_default().trim().to_string())
                    .collect::<Vec<_>>()
            })
            .any(|name| name.eq_ignore_ascii_case(family));
        if names_family && !links.iter().any(|l| l == href) {
            links.push(href.to_string());
        }
    }
    links
}

/// The last value of descriptor `name` in an `@font-face` rule.
fn descriptor(rule: &AtRule, name: &str) -> Option<String> {
    rule.declarations()
        .into_iter()
        .rev()
        .find(|d| d.name == name)
        .map(|d| d.value)
}

/// `@font-face` rules in `<style>` elements declaring `family`.
fn font_face_rules(tree: &DomTree, family: &str) -> Vec<AtRule> {
    let mut rules = Vec::new();
    for style in tree.elements_by_tag(NodeId::ROOT, "style") {
        let sheet = parse_stylesheet(&tree.text_content(style));
        rules.extend(
            sheet
                .at_rules("font-face")
                .filter(|rule| {
                    descriptor(rule, "font-family")
                        .is_some_and(|declared| unquote(&declared).eq_ignore_ascii_case(family))
                })
                .cloned(),
        );
    }
    rules
}

/// The fonts `family` needs, or `None` when the document declares none.
#[must_use]
pub fn collect_font_resources(tree: &DomTree, family: &str) -> Option<FontResources> {
    if family.is_empty() {
        return None;
    }
    let google_fonts_links = google_fonts_links(tree, family);
    let font_faces = font_face_rules(tree, family);
    let font_urls: Vec<String> = font_faces
        .iter()
        .flat_map(AtRule::declarations)
        .filter(|d| d.name == "src")
        .flat_map(|d| d.urls())
        .filter(|url| !url.starts_with("data:"))
        .collect();
    let font_face_rules: Vec<String> = font_faces.into_iter().map(|rule| rule.text).collect();

    if google_fonts_links.is_empty() && font_face_rules.is_empty() {
        return None;
    }
    log::debug!(
        "font '{family}': {} links, {} @font-face rules",
        google_fonts_links.len(),
        font_face_rules.len()
    );
    Some(FontResources {
        google_fonts_links,
        font_face_rules,
        font_urls,
        ..FontResources::default()
    })
}
