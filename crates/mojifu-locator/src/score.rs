//! Readability-style content scoring.
//!
//! Higher is more article-like. Elements that can never be the article get
//! [`DISQUALIFIED`].

use std::sync::LazyLock;

use mojifu_dom::{BoxGeometry, DomTree, NodeId};
use regex::Regex;

/// Score of an element that must never be picked.
pub const DISQUALIFIED: i32 = -1;

/// Tags that are never the main content.
const UNLIKELY_TAGS: [&str; 16] = [
    "script", "style", "noscript", "iframe", "object", "embed", "applet", "nav", "aside", "header",
    "footer", "form", "button", "input", "select", "textarea",
];

/// Minimum trimmed text length of a candidate.
const MIN_TEXT_LENGTH: usize = 25;

/// A paragraph counts towards the bonus above this trimmed length...
const PARAGRAPH_MIN_LENGTH: usize = 50;
/// ...and with at least this many words.
const PARAGRAPH_MIN_WORDS: usize = 10;
const PARAGRAPH_BONUS_CAP: i32 = 30;

/// Depth below `<body>` after which every level costs points.
const MAX_UNPENALIZED_DEPTH: i32 = 8;

/// Minimum rendered box for the size bonus.
const MIN_WIDTH: f32 = 300.0;
const MIN_HEIGHT: f32 = 200.0;

static POSITIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)article|body|content|entry|main|page|post|text|blog|story|prose")
        .expect("POSITIVE_RE should compile")
});
static NEGATIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)combx|comment|community|disqus|extra|foot|header|menu|modal|nav|remark|rss|shoutbox|sidebar|sponsor|ad-break|agegate|pagination|pager|popup|tweet|twitter|facebook|social|share|related|recommend|widget|overlay|dialog|banner|promo|newsletter",
    )
    .expect("NEGATIVE_RE should compile")
});

/// Length in characters, which is what all thresholds are expressed in.
pub(crate) fn text_length(text: &str) -> usize {
    text.chars().count()
}

#[allow(clippy::cast_precision_loss)]
fn ratio(part: usize, whole: usize) -> f64 {
    part as f64 / whole.max(1) as f64
}

/// Score `node` as a main content candidate.
///
/// Returns [`DISQUALIFIED`] for non-elements, unlikely tags and elements
/// with less than 25 characters of trimmed text.
#[must_use]
pub fn score(tree: &DomTree, node: NodeId, geometry: &dyn BoxGeometry) -> i32 {
    let Some(element) = tree.as_element(node) else {
        return DISQUALIFIED;
    };
    if UNLIKELY_TAGS.contains(&element.tag_name.as_str()) {
        return DISQUALIFIED;
    }
    let text = tree.text_content(node);
    if text_length(text.trim()) < MIN_TEXT_LENGTH {
        return DISQUALIFIED;
    }

    let mut score = 0;

    // Semantic containers
    if element.is("article") {
        score += 30;
    }
    if element.is("main") {
        score += 25;
    }
    match element.attr("role") {
        Some("main") => score += 25,
        Some("article") => score += 30,
        _ => {}
    }

    // Class and id names
    let class_and_id = format!("{} {}", element.class_name(), element.id().unwrap_or(""));
    if POSITIVE_RE.is_match(&class_and_id) {
        score += 25;
    }
    if NEGATIVE_RE.is_match(&class_and_id) {
        score -= 50;
    }

    // Real paragraphs
    let paragraphs = tree
        .elements_by_tag(node, "p")
        .filter(|&p| {
            let text = tree.text_content(p);
            text_length(text.trim()) > PARAGRAPH_MIN_LENGTH
                && text.split_whitespace().count() >= PARAGRAPH_MIN_WORDS
        })
        .count();
    score += i32::try_from(paragraphs)
        .unwrap_or(i32::MAX)
        .saturating_mul(3)
        .min(PARAGRAPH_BONUS_CAP);

    // Text density
    let text_len = text_length(&text);
    let density = ratio(text_len, tree.inner_html_length(node));
    if density > 0.25 {
        score += 15;
    }
    if density > 0.5 {
        score += 10;
    }

    // Link density
    let link_text: usize = tree
        .elements_by_tag(node, "a")
        .map(|a| text_length(&tree.text_content(a)))
        .sum();
    let link_density = ratio(link_text, text_len);
    if link_density > 0.5 {
        score -= 30;
    } else if link_density > 0.3 {
        score -= 15;
    }

    // Article furniture
    let contains = |tag: &str| tree.elements_by_tag(node, tag).next().is_some();
    if contains("h1") || contains("h2") {
        score += 5;
    }
    if contains("blockquote") {
        score += 3;
    }
    if contains("img") {
        score += 2;
    }
    if contains("figure") {
        score += 3;
    }

    // Deep nesting
    let depth = depth_below_body(tree, node);
    if depth > MAX_UNPENALIZED_DEPTH {
        score -= 2 * (depth - MAX_UNPENALIZED_DEPTH);
    }

    // Rendered size
    if geometry
        .bounding_box(node)
        .is_some_and(|rect| rect.width >= MIN_WIDTH && rect.height >= MIN_HEIGHT)
    {
        score += 5;
    }

    score
}

/// Number of element ancestors between `node` and `<body>`.
fn depth_below_body(tree: &DomTree, node: NodeId) -> i32 {
    let body = tree.body();
    let depth = tree
        .ancestors(node)
        .take_while(|&a| tree.as_element(a).is_some() && Some(a) != body)
        .count();
    i32::try_from(depth).unwrap_or(i32::MAX)
}
