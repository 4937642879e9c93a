//! Deriving a selector that finds an element again.

use std::sync::LazyLock;

use mojifu_css::{parse_selector, query_selector_all};
use mojifu_dom::{DomTree, ElementData, NodeId};
use regex::Regex;

static ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9_-]*$").expect("ID_RE should compile"));
static UTILITY_CLASS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(is-|has-|js-|u-|wp-block-)").expect("UTILITY_CLASS_RE should compile")
});

/// Prefix of the classes MojiFu itself puts on a page.
const OWN_CLASS_PREFIX: &str = "moji-fu-";

/// Path segments above and including the element.
const MAX_PATH_LEVELS: usize = 4;
/// Classes kept per path segment.
const MAX_CLASSES: usize = 2;

/// Classes worth putting in a selector: not ours, not a utility class, and
/// between 3 and 29 characters long.
fn meaningful_classes(element: &ElementData) -> impl Iterator<Item = &str> {
    element
        .class_list()
        .filter(|class| {
            !class.starts_with(OWN_CLASS_PREFIX)
                && !UTILITY_CLASS_RE.is_match(class)
                && (3..30).contains(&class.chars().count())
        })
        .take(MAX_CLASSES)
}

/// `tag.class1.class2`, plus `:nth-of-type(n)` when more than one child of
/// the parent matches that.
fn path_segment(tree: &DomTree, node: NodeId, element: &ElementData) -> String {
    let mut segment = element.tag_name.clone();
    for class in meaningful_classes(element) {
        segment.push('.');
        segment.push_str(class);
    }

    if let Some(parent) = tree.parent_element(node)
        && let Some(selector) = parse_selector(&segment)
    {
        let siblings: Vec<NodeId> = tree
            .element_children(parent)
            .filter(|&child| selector.matches_in_tree(tree, child))
            .collect();
        if siblings.len() > 1
            && let Some(index) = siblings.iter().position(|&s| s == node)
        {
            segment.push_str(&format!(":nth-of-type({})", index + 1));
        }
    }
    segment
}

/// A CSS selector for `node`, tried in this order:
///
/// 1. `#id`, when the id is a plain identifier.
/// 2. `article` or `main`, when it is the only one in the document.
/// 3. `[role="main"]` or `[role="article"]`, when it is the only one.
/// 4. A `parent > child` path of up to four segments (stopping below
///    `<body>`), when it matches `node` and nothing else.
/// 5. The last two segments of that path.
///
/// `<html>`, `<body>` and non-elements give `body`.
#[must_use]
pub fn get_selector(tree: &DomTree, node: NodeId) -> String {
    let body = tree.body();
    let Some(element) = tree.as_element(node) else {
        return "body".to_string();
    };
    if Some(node) == body || Some(node) == tree.document_element() {
        return "body".to_string();
    }

    if let Some(id) = element.id()
        && ID_RE.is_match(id)
    {
        return format!("#{id}");
    }

    let tag = element.tag_name.as_str();
    if (tag == "article" || tag == "main") && query_selector_all(tree, NodeId::ROOT, tag).len() == 1 {
        return tag.to_string();
    }

    if let Some(role @ ("main" | "article")) = element.attr("role") {
        let selector = format!("[role=\"{role}\"]");
        if query_selector_all(tree, NodeId::ROOT, &selector).len() == 1 {
            return selector;
        }
    }

    let mut path = Vec::new();
    let mut current = Some(node);
    while let Some(id) = current
        && Some(id) != body
        && let Some(data) = tree.as_element(id)
    {
        path.push(path_segment(tree, id, data));
        if path.len() >= MAX_PATH_LEVELS {
            break;
        }
        current = tree.parent_element(id);
    }
    path.reverse();

    let full = path.join(" > ");
    if query_selector_all(tree, NodeId::ROOT, &full) == [node] {
        return full;
    }

    let short = path[path.len().saturating_sub(2)..].join(" > ");
    if short.is_empty() {
        tag.to_string()
    } else {
        short
    }
}
