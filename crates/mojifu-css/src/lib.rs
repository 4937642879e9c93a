//! Selectors, the captured text style model and the rule compiler for MojiFu.
//!
//! # Scope
//!
//! This crate implements:
//! - **CSS Syntax** ([CSS Syntax Level 3](https://www.w3.org/TR/css-syntax-3/))
//!   - Tokenizer keeping the source span of every token
//!   - Style sheets, at-rules and declaration lists with `!important`
//!
//! - **CSS Selectors** ([Selectors Level 4](https://www.w3.org/TR/selectors-4/))
//!   - Type, class, ID, universal and attribute selectors
//!   - Tree-structural pseudo-classes (`:nth-of-type()`, `:first-child`, ...)
//!   - Descendant, child and sibling combinators
//!   - Selector lists, `querySelector()` and `querySelectorAll()`
//!   - Specificity
//!
//! - **Text style model**
//!   - The ten captured text properties and their CSS names
//!   - Per-tag styles of an article
//!
//! - **Rule compiler**
//!   - Exact and smart apply of a single-element style
//!   - Article styles with heading fallback and body text completion
//!
//! - **Web fonts** ([CSS Fonts Level 4 § 4](https://www.w3.org/TR/css-fonts-4/#font-resources))
//!   - `@font-face` rules from captured descriptors and font files
//!
//! # Not Yet Implemented
//!
//! - Property value parsing; captured values are passed through unvalidated
//! - Nested rules and the rules inside conditional at-rules (`@media`,
//!   `@supports`)
//! - `:not()`, `:is()`, `:has()` and other functional pseudo-classes
//! - Namespaced attribute selectors

/// Rule synthesis from captured styles.
pub mod compiler;
/// `@font-face` rules and captured font resources.
pub mod font_face;
/// CSS parsing per [CSS Syntax Level 3 § 5](https://www.w3.org/TR/css-syntax-3/#parsing).
pub mod parser;
/// The captured text style model.
pub mod properties;
/// CSS selector parsing and matching per [Selectors Level 4](https://www.w3.org/TR/selectors-4/).
pub mod selector;
/// CSS tokenization per [CSS Syntax Level 3 § 4](https://www.w3.org/TR/css-syntax-3/#tokenization).
pub mod tokenizer;

pub use compiler::{CompileOptions, compile_article, compile_single};
pub use font_face::{FontResourceSet, FontResources, FontSheet};
pub use parser::{
    AtRule, Declaration, Rule, StyleRule, Stylesheet, parse_declaration_list, parse_stylesheet,
};
pub use properties::{
    PropertySet, StructureEntry, StructureMap, StructureTag, StyleProperty, TextProperty,
};
pub use selector::{
    ParsedSelector, SelectorList, Specificity, parse_selector, parse_selector_list, query_selector,
    query_selector_all,
};
