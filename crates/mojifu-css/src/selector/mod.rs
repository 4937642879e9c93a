//! CSS Selector parsing and matching
//!
//! This module implements the subset of
//! [Selectors Level 4](https://www.w3.org/TR/selectors-4/) that content
//! detection and selector generation rely on.

mod query;

use std::iter::Peekable;
use std::str::Chars;

use mojifu_dom::{DomTree, ElementData, NodeId};

pub use query::{SelectorList, parse_selector_list, query_selector, query_selector_all};

/// [§ 5 Elemental selectors](https://www.w3.org/TR/selectors-4/#elemental-selectors)
/// [§ 6 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
///
/// A simple selector is a single condition on an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimpleSelector {
    /// [§ 5.1 Type selector](https://www.w3.org/TR/selectors-4/#type-selectors)
    /// "A type selector is the name of a document language element type,
    /// and represents an instance of that element type in the document tree."
    ///
    /// Examples: `div`, `p`, `article`
    Type(String),

    /// [§ 6.6 Class selector](https://www.w3.org/TR/selectors-4/#class-html)
    /// "The class selector is given as a full stop (. U+002E) immediately
    /// followed by an identifier."
    ///
    /// Examples: `.post-content`, `.prose`
    Class(String),

    /// [§ 6.7 ID selector](https://www.w3.org/TR/selectors-4/#id-selectors)
    /// "An ID selector is a hash (#, U+0023) immediately followed by the
    /// ID value, which is an identifier."
    ///
    /// Examples: `#main`, `#story`
    Id(String),

    /// [§ 5.2 Universal selector](https://www.w3.org/TR/selectors-4/#universal-selector)
    /// "The universal selector is a single asterisk (*) and represents the
    /// qualified name of any element type."
    Universal,

    /// Pseudo-class or pseudo-element that always fails to match: interactive
    /// states (`:hover`), pseudo-elements (`::before`) and functional
    /// pseudo-classes this engine does not evaluate (`:not(...)`). Their
    /// presence keeps the rest of the selector list usable.
    NeverMatch,

    /// [§ 4 Pseudo-classes](https://www.w3.org/TR/selectors-4/#pseudo-classes)
    /// Structural pseudo-class that requires DOM tree context to match.
    PseudoClass(PseudoClass),

    /// [§ 6.4 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
    ///
    /// Examples: `[role]`, `[role="main"]`, `[class~=post]`, `[href^=https]`
    Attribute(AttributeSelector),
}

/// Structural pseudo-classes per [§ 14 Tree-Structural pseudo-classes](https://www.w3.org/TR/selectors-4/#structural-pseudos)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PseudoClass {
    /// [§ 14.1 :root](https://www.w3.org/TR/selectors-4/#the-root-pseudo)
    /// "The :root pseudo-class represents an element that is the root of the document."
    Root,

    /// [§ 14.3.3 :first-child](https://www.w3.org/TR/selectors-4/#the-first-child-pseudo)
    /// "The :first-child pseudo-class represents an element that is first among its
    /// inclusive siblings."
    FirstChild,

    /// [§ 14.3.4 :last-child](https://www.w3.org/TR/selectors-4/#the-last-child-pseudo)
    LastChild,

    /// [§ 14.3.5 :only-child](https://www.w3.org/TR/selectors-4/#the-only-child-pseudo)
    /// "The :only-child pseudo-class represents an element that has no siblings."
    OnlyChild,

    /// [§ 14.3.1 :nth-child()](https://www.w3.org/TR/selectors-4/#the-nth-child-pseudo)
    /// with a plain integer argument (1-based).
    NthChild(usize),

    /// [§ 14.4.3 :first-of-type](https://www.w3.org/TR/selectors-4/#the-first-of-type-pseudo)
    /// "The :first-of-type pseudo-class represents an element that is the first sibling
    /// of its type."
    FirstOfType,

    /// [§ 14.4.4 :last-of-type](https://www.w3.org/TR/selectors-4/#the-last-of-type-pseudo)
    LastOfType,

    /// [§ 14.4.5 :only-of-type](https://www.w3.org/TR/selectors-4/#the-only-of-type-pseudo)
    /// "The :only-of-type pseudo-class represents an element that has no siblings
    /// with the same expanded element name."
    OnlyOfType,

    /// [§ 14.4.1 :nth-of-type()](https://www.w3.org/TR/selectors-4/#the-nth-of-type-pseudo)
    /// with a plain integer argument (1-based): the n-th sibling sharing the
    /// element's tag name.
    NthOfType(usize),

    /// [§ 14.2 :empty](https://www.w3.org/TR/selectors-4/#the-empty-pseudo)
    /// "The :empty pseudo-class represents an element that has no children except,
    /// optionally, document white space characters."
    Empty,
}

/// Attribute selectors per [§ 6.4](https://www.w3.org/TR/selectors-4/#attribute-selectors)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeSelector {
    /// `[attr]`: "Represents an element with the att attribute"
    Exists(String),

    /// `[attr=value]`: "Represents an element with the att attribute whose value
    /// is exactly 'val'."
    Equals(String, String),

    /// `[attr~=value]`: "whose value is a whitespace-separated list of words,
    /// one of which is exactly 'val'."
    Includes(String, String),

    /// `[attr|=value]`: "its value either being exactly 'val' or beginning
    /// with 'val' immediately followed by '-'."
    DashMatch(String, String),

    /// `[attr^=value]`: "whose value begins with the prefix 'val'."
    PrefixMatch(String, String),

    /// `[attr$=value]`: "whose value ends with the suffix 'val'."
    SuffixMatch(String, String),

    /// `[attr*=value]`: "whose value contains at least one instance of the
    /// substring 'val'."
    SubstringMatch(String, String),
}

/// [§ 4.2 Compound selectors](https://www.w3.org/TR/selectors-4/#compound)
///
/// "A compound selector is a sequence of simple selectors that are not
/// separated by a combinator, and represents a set of simultaneous
/// conditions on a single element."
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompoundSelector {
    /// The list of simple selectors that make up this compound selector.
    pub simple_selectors: Vec<SimpleSelector>,
}

/// [§ 16 Combinators](https://www.w3.org/TR/selectors-4/#combinators)
///
/// "A combinator is punctuation that represents a particular kind of
/// relationship between the selectors on either side."
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// [§ 16.1 Descendant combinator](https://www.w3.org/TR/selectors-4/#descendant-combinators)
    /// "A selector of the form 'A B' represents an element B that is an arbitrary
    /// descendant of some ancestor element A."
    Descendant,

    /// [§ 16.2 Child combinator](https://www.w3.org/TR/selectors-4/#child-combinators)
    /// "A selector of the form 'A > B' represents an element B that is
    /// a direct child of element A."
    Child,

    /// [§ 16.3 Next-sibling combinator](https://www.w3.org/TR/selectors-4/#adjacent-sibling-combinators)
    /// "A selector of the form 'A + B' represents an element B that
    /// immediately follows element A, where A and B share the same parent."
    NextSibling,

    /// [§ 16.4 Subsequent-sibling combinator](https://www.w3.org/TR/selectors-4/#general-sibling-combinators)
    /// "A selector of the form 'A ~ B' represents an element B that
    /// follows element A (not necessarily immediately)"
    SubsequentSibling,
}

/// [§ 4.3 Complex selectors](https://www.w3.org/TR/selectors-4/#complex)
///
/// "A complex selector is a chain of one or more compound selectors separated
/// by combinators."
///
/// `main > div.post p` is stored as:
/// ```text
/// subject: [p]
/// combinators: [(Descendant, [div.post]), (Child, [main])]
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexSelector {
    /// The rightmost compound selector (the subject of the selector).
    /// "The elements represented by a complex selector are the elements matched
    /// by the last compound selector in the complex selector."
    pub subject: CompoundSelector,

    /// Chain of (combinator, `compound_selector`) pairs going left from the
    /// subject, in right-to-left order because matching walks up from the
    /// subject.
    pub combinators: Vec<(Combinator, CompoundSelector)>,
}

/// [§ 17 Calculating Specificity](https://www.w3.org/TR/selectors-4/#specificity-rules)
///
/// "count the number of ID selectors in the selector (= A); count the number
/// of class selectors, attributes selectors, and pseudo-classes in the
/// selector (= B); count the number of type selectors and pseudo-elements in
/// the selector (= C)". Compared component by component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Specificity(pub u32, pub u32, pub u32);

impl CompoundSelector {
    fn specificity(&self) -> Specificity {
        let mut spec = Specificity::default();
        for simple in &self.simple_selectors {
            match simple {
                SimpleSelector::Id(_) => spec.0 += 1,
                SimpleSelector::Class(_)
                | SimpleSelector::PseudoClass(_)
                | SimpleSelector::Attribute(_) => spec.1 += 1,
                SimpleSelector::Type(_) => spec.2 += 1,
                // The whole compound fails to match when one of these is present.
                SimpleSelector::Universal | SimpleSelector::NeverMatch => {}
            }
        }
        spec
    }
}

/// A parsed CSS selector ready for matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSelector {
    /// The complex selector (compound selectors with combinators).
    pub complex: ComplexSelector,
}

impl ParsedSelector {
    /// [§ 4.1 Selector Matching](https://www.w3.org/TR/selectors-4/#match-a-selector-against-an-element)
    ///
    /// Match against the element at `node_id`, with the tree available for
    /// combinators and structural pseudo-classes.
    #[must_use]
    pub fn matches_in_tree(&self, tree: &DomTree, node_id: NodeId) -> bool {
        compound_matches_in_tree(&self.complex.subject, tree, node_id)
            && self.matches_combinators(tree, node_id, 0)
    }

    /// The sum of the specificities of every compound in the chain.
    #[must_use]
    pub fn specificity(&self) -> Specificity {
        std::iter::once(&self.complex.subject)
            .chain(self.complex.combinators.iter().map(|(_, compound)| compound))
            .map(CompoundSelector::specificity)
            .fold(Specificity::default(), |sum, spec| {
                Specificity(sum.0 + spec.0, sum.1 + spec.1, sum.2 + spec.2)
            })
    }

    /// Match the combinator chain from `index` outward, starting at the
    /// already-matched element `current`. Descendant and subsequent-sibling
    /// steps try every candidate before giving up.
    fn matches_combinators(&self, tree: &DomTree, current: NodeId, index: usize) -> bool {
        let Some((combinator, compound)) = self.complex.combinators.get(index) else {
            return true;
        };
        let continues_from = |candidate: NodeId| {
            compound_matches_in_tree(compound, tree, candidate)
                && self.matches_combinators(tree, candidate, index + 1)
        };
        match combinator {
            Combinator::Descendant => tree.ancestors(current).any(continues_from),
            Combinator::Child => tree.parent(current).is_some_and(continues_from),
            Combinator::NextSibling => tree
                .preceding_siblings(current)
                .find(|&sibling| tree.as_element(sibling).is_some())
                .is_some_and(continues_from),
            Combinator::SubsequentSibling => tree.preceding_siblings(current).any(continues_from),
        }
    }
}

/// Check if a compound selector matches an element, with tree context for
/// structural pseudo-classes.
fn compound_matches_in_tree(compound: &CompoundSelector, tree: &DomTree, node_id: NodeId) -> bool {
    let Some(element) = tree.as_element(node_id) else {
        return false;
    };
    compound.simple_selectors.iter().all(|simple| match simple {
        SimpleSelector::PseudoClass(pc) => pseudo_class_matches(pc, tree, node_id, element),
        _ => simple.matches(element),
    })
}

/// 1-based position of `node_id` among the element siblings accepted by `keep`,
/// and how many such siblings there are.
fn sibling_position(
    tree: &DomTree,
    node_id: NodeId,
    keep: impl Fn(&ElementData) -> bool,
) -> Option<(usize, usize)> {
    let parent = tree.parent(node_id)?;
    let mut index = None;
    let mut count = 0;
    for sibling in tree.element_children(parent) {
        if tree.as_element(sibling).is_some_and(&keep) {
            count += 1;
            if sibling == node_id {
                index = Some(count);
            }
        }
    }
    index.map(|i| (i, count))
}

/// [§ 14 Tree-Structural pseudo-classes](https://www.w3.org/TR/selectors-4/#structural-pseudos)
fn pseudo_class_matches(
    pc: &PseudoClass,
    tree: &DomTree,
    node_id: NodeId,
    element: &ElementData,
) -> bool {
    let any = |_: &ElementData| true;
    let same_type = |e: &ElementData| e.tag_name.eq_ignore_ascii_case(&element.tag_name);

    match pc {
        PseudoClass::Root => tree.document_element() == Some(node_id),
        PseudoClass::FirstChild => sibling_position(tree, node_id, any).is_some_and(|(i, _)| i == 1),
        PseudoClass::LastChild => sibling_position(tree, node_id, any).is_some_and(|(i, n)| i == n),
        PseudoClass::OnlyChild => sibling_position(tree, node_id, any).is_some_and(|(_, n)| n == 1),
        PseudoClass::NthChild(k) => sibling_position(tree, node_id, any).is_some_and(|(i, _)| i == *k),
        PseudoClass::FirstOfType => {
            sibling_position(tree, node_id, same_type).is_some_and(|(i, _)| i == 1)
        }
        PseudoClass::LastOfType => {
            sibling_position(tree, node_id, same_type).is_some_and(|(i, n)| i == n)
        }
        PseudoClass::OnlyOfType => {
            sibling_position(tree, node_id, same_type).is_some_and(|(_, n)| n == 1)
        }
        PseudoClass::NthOfType(k) => {
            sibling_position(tree, node_id, same_type).is_some_and(|(i, _)| i == *k)
        }
        PseudoClass::Empty => tree.children(node_id).iter().all(|&c| {
            tree.as_element(c).is_none() && tree.as_text(c).is_none_or(|t| t.trim().is_empty())
        }),
    }
}

impl SimpleSelector {
    /// Check if this simple selector matches the given element on its own.
    /// Structural pseudo-classes need tree context and report `false` here.
    #[must_use]
    pub fn matches(&self, element: &ElementData) -> bool {
        match self {
            Self::Type(name) => element.tag_name.eq_ignore_ascii_case(name),
            Self::Class(class_name) => element.has_class(class_name),
            Self::Id(id) => element.id().is_some_and(|el_id| el_id == id),
            Self::Universal => true,
            Self::NeverMatch | Self::PseudoClass(_) => false,
            Self::Attribute(attr_sel) => attr_sel.matches(element),
        }
    }
}

impl AttributeSelector {
    fn matches(&self, element: &ElementData) -> bool {
        match self {
            Self::Exists(name) => element.attr(name).is_some(),
            Self::Equals(name, val) => element.attr(name).is_some_and(|v| v == val),
            Self::Includes(name, val) => element
                .attr(name)
                .is_some_and(|v| v.split_ascii_whitespace().any(|w| w == val)),
            Self::DashMatch(name, val) => element.attr(name).is_some_and(|v| {
                v == val || v.strip_prefix(val.as_str()).is_some_and(|rest| rest.starts_with('-'))
            }),
            Self::PrefixMatch(name, val) => element
                .attr(name)
                .is_some_and(|v| !val.is_empty() && v.starts_with(val.as_str())),
            Self::SuffixMatch(name, val) => element
                .attr(name)
                .is_some_and(|v| !val.is_empty() && v.ends_with(val.as_str())),
            Self::SubstringMatch(name, val) => element
                .attr(name)
                .is_some_and(|v| !val.is_empty() && v.contains(val.as_str())),
        }
    }
}

/// [§ 4.3.10 ident-start code point](https://www.w3.org/TR/css-syntax-3/#ident-start-code-point)
const fn is_ident_start_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

/// [§ 4.3.9 ident code point](https://www.w3.org/TR/css-syntax-3/#ident-code-point)
const fn is_ident_char(c: char) -> bool {
    is_ident_start_char(c) || c.is_ascii_digit() || c == '-'
}

type SelectorChars<'a> = Peekable<Chars<'a>>;

fn skip_whitespace(chars: &mut SelectorChars<'_>) {
    while chars.next_if(char::is_ascii_whitespace).is_some() {}
}

fn take_ident(chars: &mut SelectorChars<'_>) -> String {
    let mut ident = String::new();
    while let Some(ch) = chars.next_if(|&ch| is_ident_char(ch)) {
        ident.push(ch);
    }
    ident
}

/// Parse an attribute value inside `[attr=value]`.
/// Handles both quoted (`"val"`, `'val'`) and unquoted ident values.
fn parse_attr_value(chars: &mut SelectorChars<'_>) -> Option<String> {
    skip_whitespace(chars);
    match chars.peek().copied() {
        Some(q @ ('"' | '\'')) => {
            let _ = chars.next();
            let mut val = String::new();
            for ch in chars.by_ref() {
                if ch == q {
                    return Some(val);
                }
                val.push(ch);
            }
            None // unterminated string
        }
        Some(_) => {
            let mut val = String::new();
            while let Some(ch) = chars.next_if(|&ch| is_ident_char(ch) || ch == '.') {
                val.push(ch);
            }
            if val.is_empty() { None } else { Some(val) }
        }
        None => None,
    }
}

/// [§ 6.4 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
///
/// Called after the opening `[` has been consumed.
fn parse_attribute_selector(chars: &mut SelectorChars<'_>) -> Option<AttributeSelector> {
    skip_whitespace(chars);
    let name = take_ident(chars).to_ascii_lowercase();
    if name.is_empty() {
        return None;
    }
    skip_whitespace(chars);

    let op = match chars.next()? {
        ']' => return Some(AttributeSelector::Exists(name)),
        '=' => '=',
        op @ ('~' | '|' | '^' | '$' | '*') => {
            if chars.next() != Some('=') {
                return None;
            }
            op
        }
        _ => return None,
    };

    let val = parse_attr_value(chars)?;
    skip_whitespace(chars);
    if chars.next() != Some(']') {
        return None;
    }
    Some(match op {
        '~' => AttributeSelector::Includes(name, val),
        '|' => AttributeSelector::DashMatch(name, val),
        '^' => AttributeSelector::PrefixMatch(name, val),
        '$' => AttributeSelector::SuffixMatch(name, val),
        '*' => AttributeSelector::SubstringMatch(name, val),
        _ => AttributeSelector::Equals(name, val),
    })
}

/// [§ 4 Pseudo-classes](https://www.w3.org/TR/selectors-4/#pseudo-classes)
/// and [§ 11 Pseudo-elements](https://www.w3.org/TR/selectors-4/#pseudo-elements)
///
/// Called after the leading `:` has been consumed.
fn parse_pseudo(chars: &mut SelectorChars<'_>) -> Option<SimpleSelector> {
    let is_pseudo_element = chars.next_if_eq(&':').is_some();
    let name = take_ident(chars).to_ascii_lowercase();
    if name.is_empty() {
        return None;
    }

    // Functional notation: collect the balanced argument.
    let mut argument = None;
    if chars.next_if_eq(&'(').is_some() {
        let mut depth = 1u32;
        let mut arg = String::new();
        for ch in chars.by_ref() {
            match ch {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                _ => {}
            }
            arg.push(ch);
        }
        if depth != 0 {
            return None; // unbalanced parentheses
        }
        argument = Some(arg.trim().to_string());
    }

    if is_pseudo_element {
        return Some(SimpleSelector::NeverMatch);
    }

    let index = || {
        argument
            .as_deref()
            .and_then(|a| a.parse::<usize>().ok())
            .filter(|&n| n > 0)
    };
    let pseudo = match (name.as_str(), argument.is_some()) {
        ("root", false) => PseudoClass::Root,
        ("first-child", false) => PseudoClass::FirstChild,
        ("last-child", false) => PseudoClass::LastChild,
        ("only-child", false) => PseudoClass::OnlyChild,
        ("first-of-type", false) => PseudoClass::FirstOfType,
        ("last-of-type", false) => PseudoClass::LastOfType,
        ("only-of-type", false) => PseudoClass::OnlyOfType,
        ("empty", false) => PseudoClass::Empty,
        ("nth-child", true) => match index() {
            Some(n) => PseudoClass::NthChild(n),
            None => return Some(SimpleSelector::NeverMatch),
        },
        ("nth-of-type", true) => match index() {
            Some(n) => PseudoClass::NthOfType(n),
            None => return Some(SimpleSelector::NeverMatch),
        },
        // Interactive states, :not()/:is()/:has(), legacy pseudo-elements
        // and unknown names degrade to never matching.
        _ => return Some(SimpleSelector::NeverMatch),
    };
    Some(SimpleSelector::PseudoClass(pseudo))
}

/// Parse a single complex selector (no commas) into a [`ParsedSelector`].
///
/// [§ 4 Selector syntax](https://www.w3.org/TR/selectors-4/#syntax)
///
/// Supports type, class, id, universal and attribute selectors, structural
/// pseudo-classes and all four combinators. Returns `None` for syntax it
/// cannot read (dangling combinators, unterminated brackets, stray
/// punctuation).
#[must_use]
pub fn parse_selector(raw: &str) -> Option<ParsedSelector> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    // Parse left-to-right, collecting compound selectors and the combinators
    // between them; the chain is reversed at the end so the subject comes first.
    let mut compounds: Vec<CompoundSelector> = Vec::new();
    let mut combinators_between: Vec<Combinator> = Vec::new();
    let mut current: Vec<SimpleSelector> = Vec::new();
    let mut pending_combinator: Option<Combinator> = None;

    let mut chars = trimmed.chars().peekable();
    while let Some(&c) = chars.peek() {
        if c.is_ascii_whitespace() || matches!(c, '>' | '+' | '~') {
            skip_whitespace(&mut chars);
            let explicit = match chars.peek() {
                Some('>') => Some(Combinator::Child),
                Some('+') => Some(Combinator::NextSibling),
                Some('~') => Some(Combinator::SubsequentSibling),
                _ => None,
            };
            if explicit.is_some() {
                let _ = chars.next();
                skip_whitespace(&mut chars);
            }
            // A combinator needs a compound on its left.
            if current.is_empty() {
                return None;
            }
            compounds.push(CompoundSelector {
                simple_selectors: std::mem::take(&mut current),
            });
            pending_combinator = Some(explicit.unwrap_or(Combinator::Descendant));
            continue;
        }

        if let Some(combinator) = pending_combinator.take() {
            combinators_between.push(combinator);
        }

        let _ = chars.next();
        let simple = match c {
            '.' => SimpleSelector::Class(Some(take_ident(&mut chars)).filter(|s| !s.is_empty())?),
            '#' => SimpleSelector::Id(Some(take_ident(&mut chars)).filter(|s| !s.is_empty())?),
            '*' => SimpleSelector::Universal,
            '[' => SimpleSelector::Attribute(parse_attribute_selector(&mut chars)?),
            ':' => parse_pseudo(&mut chars)?,
            _ if is_ident_start_char(c) || c == '-' => {
                let mut name = String::from(c);
                name.push_str(&take_ident(&mut chars));
                SimpleSelector::Type(name.to_ascii_lowercase())
            }
            _ => return None,
        };
        current.push(simple);
    }

    // Trailing combinator with nothing after it.
    if pending_combinator.is_some() || current.is_empty() {
        return None;
    }
    let subject = CompoundSelector {
        simple_selectors: current,
    };

    // For "A > B C": compounds [A, B], combinators [Child, Descendant];
    // the chain becomes [(Descendant, B), (Child, A)].
    let combinators = compounds
        .into_iter()
        .zip(combinators_between)
        .rev()
        .map(|(compound, combinator)| (combinator, compound))
        .collect();

    Some(ParsedSelector {
        complex: ComplexSelector {
            subject,
            combinators,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_compound() {
        let sel = parse_selector("div.post.wide#main").unwrap();
        assert_eq!(
            sel.complex.subject.simple_selectors,
            vec![
                SimpleSelector::Type("div".to_string()),
                SimpleSelector::Class("post".to_string()),
                SimpleSelector::Class("wide".to_string()),
                SimpleSelector::Id("main".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_combinator_chain_is_right_to_left() {
        let sel = parse_selector("main > div.post  p").unwrap();
        assert_eq!(
            sel.complex.subject.simple_selectors,
            vec![SimpleSelector::Type("p".to_string())]
        );
        let kinds: Vec<Combinator> = sel.complex.combinators.iter().map(|(c, _)| *c).collect();
        assert_eq!(kinds, vec![Combinator::Descendant, Combinator::Child]);
    }

    #[test]
    fn test_parse_attribute_forms() {
        let sel = parse_selector(r#"article[role="main"]"#).unwrap();
        assert_eq!(
            sel.complex.subject.simple_selectors[1],
            SimpleSelector::Attribute(AttributeSelector::Equals(
                "role".to_string(),
                "main".to_string()
            ))
        );
        assert!(parse_selector("[role]").is_some());
        assert!(parse_selector("[class~=a]").is_some());
        assert!(parse_selector("[role=\"main\"").is_none());
    }

    #[test]
    fn test_parse_nth_of_type() {
        let sel = parse_selector("div:nth-of-type(3)").unwrap();
        assert_eq!(
            sel.complex.subject.simple_selectors[1],
            SimpleSelector::PseudoClass(PseudoClass::NthOfType(3))
        );
        let odd = parse_selector("li:nth-of-type(odd)").unwrap();
        assert_eq!(odd.complex.subject.simple_selectors[1], SimpleSelector::NeverMatch);
    }

    #[test]
    fn test_parse_rejects_dangling_combinators() {
        assert!(parse_selector("> p").is_none());
        assert!(parse_selector("div >").is_none());
        assert!(parse_selector("").is_none());
        assert!(parse_selector("div, p").is_none());
    }

    #[test]
    fn test_specificity_sums_the_chain() {
        let spec = |raw: &str| parse_selector(raw).unwrap().specificity();
        assert_eq!(spec("p"), Specificity(0, 0, 1));
        assert_eq!(spec("#story .body > p:first-child"), Specificity(1, 2, 1));
        assert_eq!(spec("*"), Specificity::default());
        assert!(spec(".a") > spec("div p span"));
        assert!(spec("#a") > spec(".a.b.c"));
    }

    #[test]
    fn test_unknown_pseudo_degrades_to_never_match() {
        let sel = parse_selector("a:hover").unwrap();
        assert_eq!(sel.complex.subject.simple_selectors[1], SimpleSelector::NeverMatch);
        assert!(parse_selector("p::first-line").is_some());
    }
}
