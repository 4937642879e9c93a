//! Finding the main article of a document.

use std::collections::HashMap;

use mojifu_css::{query_selector, query_selector_all};
use mojifu_dom::{BoxGeometry, DomTree, NodeId};
use strum_macros::Display;

use crate::score::{score, text_length};

/// Semantic markup probed first, one element per selector.
pub const SEMANTIC_SELECTORS: [&str; 7] = [
    r#"article[role="main"]"#,
    "main article",
    r#"[role="main"] article"#,
    "article",
    r#"[role="article"]"#,
    "main",
    r#"[role="main"]"#,
];

/// Common content containers, every match probed.
pub const ARTICLE_SELECTORS: [&str; 12] = [
    "article",
    r#"[role="article"]"#,
    ".post-content",
    ".article-content",
    ".entry-content",
    ".content",
    ".post-body",
    ".article-body",
    ".story-body",
    ".markdown-body",
    ".prose",
    "main",
];

/// A semantic match above this score ends the search.
const SEMANTIC_ACCEPT_SCORE: i32 = 30;
/// Below this score every large `div` and `section` is probed.
const BROAD_PROBE_BELOW: i32 = 20;
/// Below this score paragraph clusters are tried.
const PARAGRAPH_FALLBACK_BELOW: i32 = 10;

/// Text length range of broad probe candidates, in characters.
const BROAD_MIN_TEXT: usize = 500;
const BROAD_MAX_TEXT: usize = 100_000;

/// Trimmed length a paragraph needs to take part in clustering.
const CLUSTER_MIN_PARAGRAPH: usize = 50;
/// How many ancestors of a paragraph share its text length.
const CLUSTER_LEVELS: usize = 3;

/// Which probe found the article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Tier {
    /// `<article>`, `<main>` and their ARIA roles.
    Semantic,
    /// Well-known content class names.
    ClassPattern,
    /// Any large `div` or `section`.
    Broad,
    /// The common ancestor of the most paragraph text.
    ParagraphCluster,
}

/// The located article.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Located {
    /// The article element.
    pub node: NodeId,
    /// Its content score.
    pub score: i32,
    /// The probe that found it.
    pub tier: Tier,
}

/// Running best candidate. Ties keep the earlier one.
#[derive(Default)]
struct Best(Option<Located>);

impl Best {
    fn score(&self) -> Option<i32> {
        self.0.map(|located| located.score)
    }

    fn consider(&mut self, tree: &DomTree, node: NodeId, geometry: &dyn BoxGeometry, tier: Tier) {
        let candidate = score(tree, node, geometry);
        if candidate < 0 {
            return;
        }
        if self.score().is_none_or(|best| candidate > best) {
            self.0 = Some(Located {
                node,
                score: candidate,
                tier,
            });
        }
    }

    fn below(&self, threshold: i32) -> bool {
        self.score().is_none_or(|best| best < threshold)
    }
}

/// Find the element most likely to hold the page's readable content.
///
/// Probes run in order and later ones only when the earlier ones came up
/// short:
///
/// 1. The first match of each of [`SEMANTIC_SELECTORS`]. A score above 30
///    is accepted immediately.
/// 2. Every match of [`ARTICLE_SELECTORS`].
/// 3. If the best score is still below 20, every `div` and `section` with
///    500 to 100 000 characters of text.
/// 4. If the best score is still below 10, the ancestor (up to three levels
///    above) collecting the most text of paragraphs of 50 characters or
///    more. A disqualified cluster gives way to the next largest one.
///
/// Elements with a negative score are never returned. `None` means the page
/// has no recognizable article.
#[must_use]
pub fn locate(tree: &DomTree, geometry: &dyn BoxGeometry) -> Option<Located> {
    let mut best = Best::default();

    for selector in SEMANTIC_SELECTORS {
        if let Some(node) = query_selector(tree, NodeId::ROOT, selector) {
            best.consider(tree, node, geometry, Tier::Semantic);
        }
    }
    if let Some(found) = best.0
        && found.score > SEMANTIC_ACCEPT_SCORE
    {
        log::debug!("article found via semantic elements, score {}", found.score);
        return Some(found);
    }

    for selector in ARTICLE_SELECTORS {
        for node in query_selector_all(tree, NodeId::ROOT, selector) {
            best.consider(tree, node, geometry, Tier::ClassPattern);
        }
    }

    if best.below(BROAD_PROBE_BELOW) {
        for node in query_selector_all(tree, NodeId::ROOT, "div, section") {
            let length = text_length(&tree.text_content(node));
            if (BROAD_MIN_TEXT..=BROAD_MAX_TEXT).contains(&length) {
                best.consider(tree, node, geometry, Tier::Broad);
            }
        }
    }

    if best.below(PARAGRAPH_FALLBACK_BELOW)
        && let Some(found) = paragraph_clusters(tree).into_iter().find_map(|node| {
            let cluster_score = score(tree, node, geometry);
            (cluster_score >= 0).then_some(Located {
                node,
                score: cluster_score,
                tier: Tier::ParagraphCluster,
            })
        })
    {
        best.0 = Some(found);
    }

    match best.0 {
        Some(found) => log::debug!("article found via {} probe, score {}", found.tier, found.score),
        None => log::debug!("no article candidate"),
    }
    best.0
}

/// The elements credited with paragraph text, most text first, when every
/// qualifying paragraph credits its length to its nearest three ancestors
/// below `<body>`. Ties go to the element credited first.
fn paragraph_clusters(tree: &DomTree) -> Vec<NodeId> {
    let body = tree.body();
    let mut order: Vec<NodeId> = Vec::new();
    let mut totals: HashMap<NodeId, usize> = HashMap::new();

    for p in tree.elements_by_tag(NodeId::ROOT, "p") {
        let text = tree.text_content(p);
        if text_length(text.trim()) < CLUSTER_MIN_PARAGRAPH {
            continue;
        }
        let length = text_length(&text);
        let ancestors = tree
            .ancestors(p)
            .take_while(|&a| tree.as_element(a).is_some() && Some(a) != body)
            .take(CLUSTER_LEVELS);
        for ancestor in ancestors {
            let total = totals.entry(ancestor).or_insert_with(|| {
                order.push(ancestor);
                0
            });
            *total += length;
        }
    }

    // Stable sort keeps credit order among equal totals.
    order.sort_by_key(|node| std::cmp::Reverse(totals.get(node).copied().unwrap_or(0)));
    order
}
