//! HTML tokenizer and tree builder for MojiFu.
//!
//! # Scope
//!
//! Turns page source into a [`mojifu_dom::DomTree`] the way a browser would
//! for the purposes of article detection:
//!
//! - **HTML Tokenizer** ([WHATWG § 13.2.5](https://html.spec.whatwg.org/multipage/parsing.html#tokenization))
//!   - Data, RCDATA, RAWTEXT and tag states
//!   - DOCTYPE, comments and common character references
//!   - Attribute parsing, first duplicate wins
//!
//! - **HTML Parser / Tree Builder** ([WHATWG § 13.2.6](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction))
//!   - Implicit `html`, `head` and `body`
//!   - Paragraphs closed by block starts, list items and table cells closed
//!     by their siblings
//!
//! # Not Implemented
//!
//! - Adoption agency algorithm (mis-nested formatting is closed, not repaired)
//! - Foster parenting and the table insertion modes
//! - Foreign content (SVG, MathML) namespaces

/// HTML parser and tree construction.
pub mod parser;
/// HTML tokenizer for converting input into tokens.
pub mod tokenizer;

use mojifu_dom::DomTree;

pub use parser::{HTMLParser, InsertionMode, ParseIssue};
pub use tokenizer::{Attribute, HTMLTokenizer, Token};

/// Tokenize and parse a complete document.
#[must_use]
pub fn parse(html: &str) -> DomTree {
    parse_with_issues(html).0
}

/// Tokenize and parse a complete document, keeping the parse errors.
#[must_use]
pub fn parse_with_issues(html: &str) -> (DomTree, Vec<ParseIssue>) {
    let mut tokenizer = HTMLTokenizer::new(html.to_string());
    tokenizer.run();
    HTMLParser::new(tokenizer.into_tokens()).run_with_issues()
}
