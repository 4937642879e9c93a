//! [§ 3.1 Selector lists](https://www.w3.org/TR/selectors-4/#grouping) and
//! the DOM query entry points (`querySelector`, `querySelectorAll`).

use mojifu_dom::{DomTree, NodeId};

use super::{ParsedSelector, parse_selector};

/// "A list of simple/compound/complex selectors is a comma-separated list"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList {
    /// The selectors, in source order.
    pub selectors: Vec<ParsedSelector>,
}

impl SelectorList {
    /// True if any selector in the list matches the element.
    #[must_use]
    pub fn matches_in_tree(&self, tree: &DomTree, node_id: NodeId) -> bool {
        self.selectors
            .iter()
            .any(|selector| selector.matches_in_tree(tree, node_id))
    }
}

/// Parse a comma-separated selector list.
///
/// Commas inside brackets, parentheses or quotes do not split. A list with
/// any unparseable member is invalid as a whole, like in a browser.
#[must_use]
pub fn parse_selector_list(raw: &str) -> Option<SelectorList> {
    let mut selectors = Vec::new();
    for part in split_top_level_commas(raw) {
        selectors.push(parse_selector(part)?);
    }
    Some(SelectorList { selectors })
}

fn split_top_level_commas(raw: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, c) in raw.char_indices() {
        match (quote, c) {
            (Some(q), _) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '[' | '(') => depth += 1,
            (None, ']' | ')') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                parts.push(&raw[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&raw[start..]);
    parts
}

/// [DOM § 4.2.6 querySelectorAll](https://dom.spec.whatwg.org/#dom-parentnode-queryselectorall)
///
/// Every descendant element of `root` matching `selectors`, in tree order.
/// An invalid selector matches nothing (where the DOM would throw a
/// `SyntaxError`).
#[must_use]
pub fn query_selector_all(tree: &DomTree, root: NodeId, selectors: &str) -> Vec<NodeId> {
    let Some(list) = parse_selector_list(selectors) else {
        return Vec::new();
    };
    tree.descendants(root)
        .filter(|&id| list.matches_in_tree(tree, id))
        .collect()
}

/// [DOM § 4.2.6 querySelector](https://dom.spec.whatwg.org/#dom-parentnode-queryselector)
///
/// The first descendant element of `root` matching `selectors`.
#[must_use]
pub fn query_selector(tree: &DomTree, root: NodeId, selectors: &str) -> Option<NodeId> {
    let list = parse_selector_list(selectors)?;
    tree.descendants(root)
        .find(|&id| list.matches_in_tree(tree, id))
}
