//! Turning page elements into style records.

use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use mojifu_common::warning::warn_once;
use mojifu_css::{
    Declaration, FontResourceSet, ParsedSelector, PropertySet, Specificity, StructureEntry,
    StructureMap, StructureTag, StyleProperty, TextProperty, parse_declaration_list,
    parse_selector_list, parse_stylesheet,
};
use mojifu_dom::{BoxGeometry, DomTree, NodeId};
use mojifu_store::model::ARTICLE_SAMPLE_TEXT;
use mojifu_store::{StyleKind, StyleRecord};
use strum::IntoEnumIterator;
use url::Url;

use crate::fonts::collect_font_resources;

/// Sample text of a selection capture with nothing selected.
pub const DEFAULT_SAMPLE_TEXT: &str = "Sample Text";

/// Characters of a selection kept as sample text.
const SELECTION_SAMPLE_CHARS: usize = 50;
/// Characters of an article element kept as sample text.
const STRUCTURE_SAMPLE_CHARS: usize = 30;

/// Why a capture produced no record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CaptureError {
    /// The page has no recognizable article.
    #[error("no article content found on this page")]
    NoArticle,
    /// The article has no heading or paragraph.
    #[error("no article elements found (H1-H6, P)")]
    NoStructureElements,
}

/// Where captured values come from, `getComputedStyle` in a live page.
pub trait ComputedStyleSource {
    /// The value of `prop` for `node`, as CSS text.
    fn value(&self, tree: &DomTree, node: NodeId, prop: TextProperty) -> String;
}

/// Values from the document's own style sheets: `<style>` elements and
/// `style` attributes, with user-agent defaults under them.
///
/// Declarations on an element are ranked by importance, then `style`
/// attribute over selectors, then selector specificity, then source order.
/// When none applies, inherited properties (all but `text-decoration`) look
/// at the ancestors, nearest first. Anything unresolved gets its initial
/// value. Relative values such as `1.2em` are returned as written.
#[derive(Debug, Clone, Default)]
pub struct CascadeStyleSource {
    /// Rules of every `<style>` element, one per selector, in source order.
    rules: Vec<AuthorRule>,
}

#[derive(Debug, Clone)]
struct AuthorRule {
    selector: ParsedSelector,
    specificity: Specificity,
    declarations: Rc<[Declaration]>,
}

impl CascadeStyleSource {
    /// Collect the author rules of `tree`'s `<style>` elements.
    ///
    /// A rule whose selector list does not parse is skipped with a warning,
    /// as a browser drops it.
    #[must_use]
    pub fn new(tree: &DomTree) -> Self {
        let mut rules = Vec::new();
        for style in tree.elements_by_tag(NodeId::ROOT, "style") {
            let sheet = parse_stylesheet(&tree.text_content(style));
            for rule in sheet.style_rules() {
                let Some(list) = parse_selector_list(&rule.selectors) else {
                    warn_once(
                        "Capture",
                        &format!("unsupported selector '{}' skipped", rule.selectors),
                    );
                    continue;
                };
                let declarations: Rc<[Declaration]> = rule.declarations.clone().into();
                rules.extend(list.selectors.into_iter().map(|selector| AuthorRule {
                    specificity: selector.specificity(),
                    selector,
                    declarations: Rc::clone(&declarations),
                }));
            }
        }
        log::debug!("cascading {} author selectors", rules.len());
        Self { rules }
    }

    /// The cascaded value of `prop` on `node` itself.
    fn declared(&self, tree: &DomTree, node: NodeId, prop: TextProperty) -> Option<Declared> {
        let element = tree.as_element(node)?;
        let inline = element
            .attr("style")
            .map(parse_declaration_list)
            .unwrap_or_default();

        let author = self
            .rules
            .iter()
            .filter(|rule| rule.selector.matches_in_tree(tree, node))
            .flat_map(|rule| {
                rule.declarations
                    .iter()
                    .map(move |d| ((d.important, false, rule.specificity), d))
            });
        let attribute = inline
            .iter()
            .map(|d| ((d.important, true, Specificity::default()), d));
        // [§ 6.4 Cascade Sorting Order](https://www.w3.org/TR/css-cascade-4/#cascade-sort)
        // `max_by_key` keeps the last of equal keys, so source order breaks ties.
        let winner = author
            .chain(attribute)
            .filter(|(_, d)| d.name == prop.css_name() && !d.value.is_empty())
            .max_by_key(|(precedence, _)| *precedence);

        if let Some((_, declaration)) = winner {
            return Some(match declaration.value.to_ascii_lowercase().as_str() {
                "inherit" => Declared::Inherit,
                "initial" => Declared::Value(initial_value(prop).to_string()),
                _ => Declared::Value(declaration.value.clone()),
            });
        }
        user_agent_default(&element.tag_name, prop).map(|v| Declared::Value(v.to_string()))
    }
}

enum Declared {
    Value(String),
    Inherit,
}

impl ComputedStyleSource for CascadeStyleSource {
    fn value(&self, tree: &DomTree, node: NodeId, prop: TextProperty) -> String {
        let mut current = Some(node);
        while let Some(id) = current {
            match self.declared(tree, id, prop) {
                Some(Declared::Value(value)) => return value,
                Some(Declared::Inherit) => {}
                None if !is_inherited(prop) && tree.as_element(id).is_some() => break,
                None => {}
            }
            current = tree.parent_element(id);
        }
        initial_value(prop).to_string()
    }
}

const fn is_inherited(prop: TextProperty) -> bool {
    !matches!(prop, TextProperty::TextDecoration)
}

/// Initial values as `getComputedStyle` reports them.
const fn initial_value(prop: TextProperty) -> &'static str {
    match prop {
        TextProperty::FontFamily => "serif",
        TextProperty::FontSize => "16px",
        TextProperty::FontWeight => "400",
        TextProperty::Color => "rgb(0, 0, 0)",
        TextProperty::FontStyle
        | TextProperty::LineHeight
        | TextProperty::LetterSpacing => "normal",
        TextProperty::TextDecoration | TextProperty::TextTransform | TextProperty::TextShadow => {
            "none"
        }
    }
}

/// The default style sheet's value for `tag`, for the properties it sets.
fn user_agent_default(tag: &str, prop: TextProperty) -> Option<&'static str> {
    match (tag, prop) {
        ("h1", TextProperty::FontSize) => Some("32px"),
        ("h2", TextProperty::FontSize) => Some("24px"),
        ("h3", TextProperty::FontSize) => Some("18.72px"),
        ("h4", TextProperty::FontSize) => Some("16px"),
        ("h5", TextProperty::FontSize) => Some("13.28px"),
        ("h6", TextProperty::FontSize) => Some("10.72px"),
        ("h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "b" | "strong" | "th", TextProperty::FontWeight) => {
            Some("700")
        }
        ("em" | "i" | "cite" | "var" | "dfn" | "address", TextProperty::FontStyle) => Some("italic"),
        ("a", TextProperty::Color) => Some("rgb(0, 0, 238)"),
        ("a" | "u" | "ins", TextProperty::TextDecoration) => Some("underline"),
        ("s" | "del" | "strike", TextProperty::TextDecoration) => Some("line-through"),
        ("code" | "pre" | "kbd" | "samp", TextProperty::FontFamily) => Some("monospace"),
        _ => None,
    }
}

/// Every text property of `node`, enabled.
#[must_use]
pub fn extract_styles(
    tree: &DomTree,
    node: NodeId,
    source: &dyn ComputedStyleSource,
) -> PropertySet {
    let mut properties = PropertySet::new();
    for prop in TextProperty::iter() {
        properties.insert(prop, StyleProperty::new(source.value(tree, node, prop)));
    }
    properties
}

/// The first family of a `font-family` list, unquoted.
pub(crate) fn first_family(font_family: &str) -> String {
    font_family
        .split(',')
        .next()
        .unwrap_or_default()
        .replace(['"', '\''], "")
        .trim()
        .to_string()
}

/// `<first font family>, <font size>`, e.g. `Georgia, 16px`.
#[must_use]
pub fn generate_name(properties: &PropertySet) -> String {
    let value = |prop: TextProperty| properties.get(prop).map_or("", |p| p.value.as_str());
    format!(
        "{}, {}",
        first_family(value(TextProperty::FontFamily)),
        value(TextProperty::FontSize)
    )
}

/// `Article Style from <host>`, without a leading `www.`, or
/// `Article Style` when `url` has no host.
#[must_use]
pub fn article_name(url: &str) -> String {
    match Url::parse(url).ok().as_ref().and_then(Url::host_str) {
        Some(host) if !host.is_empty() => {
            format!("Article Style from {}", host.replacen("www.", "", 1))
        }
        _ => "Article Style".to_string(),
    }
}

/// The first `limit` characters of `text`, plus `...` when `full_length`
/// exceeds the limit.
fn truncate(text: &str, limit: usize, full_length: usize) -> String {
    let mut out: String = text.chars().take(limit).collect();
    if full_length > limit {
        out.push_str("...");
    }
    out
}

/// The style of the first element of each [`StructureTag`] inside
/// `article`, with a 30 character sample of its text.
#[must_use]
pub fn extract_article_structure(
    tree: &DomTree,
    article: NodeId,
    source: &dyn ComputedStyleSource,
) -> StructureMap {
    let mut structure = StructureMap::new();
    for tag in StructureTag::iter() {
        let Some(element) = tree.elements_by_tag(article, tag.tag_name()).next() else {
            continue;
        };
        let text = tree.text_content(element);
        let sample = truncate(text.trim(), STRUCTURE_SAMPLE_CHARS, text.chars().count());
        let _ = structure.insert(
            tag,
            StructureEntry::new(extract_styles(tree, element, source), sample),
        );
    }
    structure
}

fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
}

/// A single-element style from the element holding a selection.
///
/// `node` may be the selected text node itself; its parent element is
/// captured then. The sample text is the trimmed selection, cut at 50
/// characters.
#[must_use]
pub fn capture_selection(
    tree: &DomTree,
    node: NodeId,
    selected_text: &str,
    url: &str,
    source: &dyn ComputedStyleSource,
) -> StyleRecord {
    let element = if tree.as_element(node).is_some() {
        node
    } else {
        tree.parent_element(node).unwrap_or(node)
    };
    let properties = extract_styles(tree, element, source);

    let selected = selected_text.trim();
    let sample_text = if selected.is_empty() {
        DEFAULT_SAMPLE_TEXT.to_string()
    } else {
        truncate(selected, SELECTION_SAMPLE_CHARS, selected.chars().count())
    };

    let font_resources = properties
        .get(TextProperty::FontFamily)
        .and_then(|family| collect_font_resources(tree, &first_family(&family.value)))
        .map(FontResourceSet::Single);

    StyleRecord {
        id: new_id(),
        name: generate_name(&properties),
        source_url: url.to_string(),
        created_at: now_millis(),
        kind: StyleKind::Single {
            properties,
            sample_text,
        },
        font_resources,
    }
}

/// An article style from the page's main article.
///
/// # Errors
///
/// Returns [`CaptureError::NoArticle`] when the locator finds nothing and
/// [`CaptureError::NoStructureElements`] when the article has no heading
/// or paragraph.
pub fn capture_article(
    tree: &DomTree,
    geometry: &dyn BoxGeometry,
    url: &str,
    source: &dyn ComputedStyleSource,
) -> Result<StyleRecord, CaptureError> {
    let article = mojifu_locator::locate(tree, geometry).ok_or(CaptureError::NoArticle)?;
    let structure = extract_article_structure(tree, article.node, source);
    if structure.is_empty() {
        return Err(CaptureError::NoStructureElements);
    }

    let per_tag: std::collections::BTreeMap<String, _> = structure
        .iter()
        .filter_map(|(tag, entry)| {
            let family = entry.properties.as_ref()?.get(TextProperty::FontFamily)?;
            let resources = collect_font_resources(tree, &first_family(&family.value))?;
            Some((tag.to_string(), resources))
        })
        .collect();
    let font_resources = (!per_tag.is_empty()).then_some(FontResourceSet::PerTag(per_tag));

    log::info!("captured {} article elements", structure.len());
    Ok(StyleRecord {
        id: new_id(),
        name: article_name(url),
        source_url: url.to_string(),
        created_at: now_millis(),
        kind: StyleKind::Article {
            structure,
            sample_text: ARTICLE_SAMPLE_TEXT.to_string(),
        },
        font_resources,
    })
}
