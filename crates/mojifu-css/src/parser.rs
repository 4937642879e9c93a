//! CSS Parser per [§ 5 Parsing](https://www.w3.org/TR/css-syntax-3/#parsing).
//!
//! Reads style rules, at-rules and declaration lists. Values and preludes
//! are kept as source text with comments dropped and whitespace runs
//! collapsed, which is the form captured styles are stored in.

use std::ops::Range;

use crate::tokenizer::{CssToken, Token, tokenize};

/// [§ 5.4.6 Consume a declaration](https://www.w3.org/TR/css-syntax-3/#consume-declaration)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// The property name, lowercased unless it is a custom property.
    pub name: String,
    /// The value as written, without `!important`.
    pub value: String,
    /// Whether the declaration has `!important`.
    pub important: bool,
}

impl Declaration {
    /// The targets of `url(...)` references in the value, in order.
    #[must_use]
    pub fn urls(&self) -> Vec<String> {
        let tokens = tokenize(&self.value);
        let mut urls = Vec::new();
        let mut in_url_function = false;
        for token in tokens {
            match token.kind {
                CssToken::Url(url) => urls.push(url),
                CssToken::Function(name) => in_url_function = name.eq_ignore_ascii_case("url"),
                CssToken::String(url) if in_url_function => {
                    urls.push(url);
                    in_url_function = false;
                }
                CssToken::Whitespace => {}
                _ => in_url_function = false,
            }
        }
        urls
    }
}

/// [§ 5.4.3 Consume a qualified rule](https://www.w3.org/TR/css-syntax-3/#consume-qualified-rule)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleRule {
    /// The prelude, a selector list as text.
    pub selectors: String,
    /// The declarations of the rule block.
    pub declarations: Vec<Declaration>,
}

/// [§ 5.4.2 Consume an at-rule](https://www.w3.org/TR/css-syntax-3/#consume-at-rule)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtRule {
    /// The at-keyword name (without the `@`), lowercased.
    pub name: String,
    /// The prelude as text.
    pub prelude: String,
    /// The block contents as written, when the rule has a block.
    pub block: Option<String>,
    /// The whole rule as written.
    pub text: String,
}

impl AtRule {
    /// The block read as a declaration list, as in `@font-face`.
    #[must_use]
    pub fn declarations(&self) -> Vec<Declaration> {
        self.block
            .as_deref()
            .map(parse_declaration_list)
            .unwrap_or_default()
    }
}

/// A rule of a stylesheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// A style rule (qualified rule).
    Style(StyleRule),
    /// An at-rule.
    At(AtRule),
}

/// [§ 5.3.3 Parse a stylesheet](https://www.w3.org/TR/css-syntax-3/#parse-stylesheet)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Stylesheet {
    /// The rules, in source order.
    pub rules: Vec<Rule>,
}

impl Stylesheet {
    /// The style rules, in source order.
    pub fn style_rules(&self) -> impl Iterator<Item = &StyleRule> {
        self.rules.iter().filter_map(|rule| match rule {
            Rule::Style(style) => Some(style),
            Rule::At(_) => None,
        })
    }

    /// The at-rules named `name`, in source order.
    pub fn at_rules(&self, name: &str) -> impl Iterator<Item = &AtRule> {
        self.rules.iter().filter_map(move |rule| match rule {
            Rule::At(at) if at.name == name => Some(at),
            _ => None,
        })
    }
}

/// CSS parser over the tokens of one source text.
pub struct CssParser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    position: usize,
}

impl<'a> CssParser<'a> {
    /// Tokenize `source` and create a parser over it.
    #[must_use]
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            tokens: tokenize(source),
            position: 0,
        }
    }

    /// [§ 5.3.3 Parse a stylesheet](https://www.w3.org/TR/css-syntax-3/#parse-stylesheet)
    pub fn parse_stylesheet(&mut self) -> Stylesheet {
        // "Consume a list of rules from input, with the top-level flag set."
        Stylesheet {
            rules: self.consume_list_of_rules(),
        }
    }

    /// [§ 5.3.6 Parse a list of declarations](https://www.w3.org/TR/css-syntax-3/#parse-list-of-declarations),
    /// as in a `style` attribute.
    pub fn parse_declaration_list(&mut self) -> Vec<Declaration> {
        let mut declarations = self.consume_list_of_declarations();
        // A stray `}` ends nothing at the top level.
        while self.peek() == Some(&CssToken::RightBrace) {
            let _ = self.consume();
            declarations.extend(self.consume_list_of_declarations());
        }
        declarations
    }

    /// [§ 5.4.1 Consume a list of rules](https://www.w3.org/TR/css-syntax-3/#consume-list-of-rules),
    /// top level.
    fn consume_list_of_rules(&mut self) -> Vec<Rule> {
        let mut rules = Vec::new();
        loop {
            match self.peek() {
                None => return rules,
                // "<whitespace-token>", "<CDO-token>", "<CDC-token>": "Do nothing."
                Some(CssToken::Whitespace | CssToken::Cdo | CssToken::Cdc) => {
                    let _ = self.consume();
                }
                Some(CssToken::AtKeyword(_)) => {
                    if let Some(at_rule) = self.consume_at_rule() {
                        rules.push(Rule::At(at_rule));
                    }
                }
                Some(_) => {
                    if let Some(rule) = self.consume_qualified_rule() {
                        rules.push(Rule::Style(rule));
                    }
                }
            }
        }
    }

    /// [§ 5.4.2 Consume an at-rule](https://www.w3.org/TR/css-syntax-3/#consume-at-rule)
    fn consume_at_rule(&mut self) -> Option<AtRule> {
        let start = self.position;
        let name = match self.consume() {
            Some(CssToken::AtKeyword(name)) => name.to_ascii_lowercase(),
            _ => return None,
        };
        let prelude_start = self.position;

        loop {
            match self.peek() {
                // "<semicolon-token>: Return the at-rule."
                // "<EOF-token>: This is a parse error. Return the at-rule."
                Some(CssToken::Semicolon) | None => {
                    let prelude = self.text(prelude_start..self.position);
                    let _ = self.consume();
                    return Some(AtRule {
                        name,
                        prelude,
                        block: None,
                        text: self.source_text(start..self.position),
                    });
                }
                // "<{-token>: Consume a simple block and assign it to the
                // at-rule's block. Return the at-rule."
                Some(CssToken::LeftBrace) => {
                    let prelude = self.text(prelude_start..self.position);
                    let contents = self.consume_simple_block();
                    return Some(AtRule {
                        name,
                        prelude,
                        block: Some(self.source_text(contents)),
                        text: self.source_text(start..self.position),
                    });
                }
                Some(_) => self.consume_component_value(),
            }
        }
    }

    /// [§ 5.4.3 Consume a qualified rule](https://www.w3.org/TR/css-syntax-3/#consume-qualified-rule)
    fn consume_qualified_rule(&mut self) -> Option<StyleRule> {
        let prelude_start = self.position;
        loop {
            match self.peek() {
                // "<EOF-token>: This is a parse error. Return nothing."
                None => return None,
                Some(CssToken::LeftBrace) => {
                    let selectors = self.text(prelude_start..self.position);
                    let _ = self.consume();
                    let declarations = self.consume_list_of_declarations();
                    if self.peek() == Some(&CssToken::RightBrace) {
                        let _ = self.consume();
                    }
                    return Some(StyleRule {
                        selectors,
                        declarations,
                    });
                }
                Some(_) => self.consume_component_value(),
            }
        }
    }

    /// [§ 5.4.7 Consume a simple block](https://www.w3.org/TR/css-syntax-3/#consume-simple-block)
    ///
    /// Returns the token range of the block contents.
    fn consume_simple_block(&mut self) -> Range<usize> {
        let ending_token = match self.consume() {
            Some(CssToken::LeftBrace) => CssToken::RightBrace,
            Some(CssToken::LeftBracket) => CssToken::RightBracket,
            Some(CssToken::LeftParen | CssToken::Function(_)) => CssToken::RightParen,
            _ => return self.position..self.position,
        };
        let start = self.position;
        loop {
            match self.peek() {
                Some(token) if *token == ending_token => {
                    let end = self.position;
                    let _ = self.consume();
                    return start..end;
                }
                None => return start..self.position,
                Some(_) => self.consume_component_value(),
            }
        }
    }

    /// [§ 5.4.5 Consume a list of declarations](https://www.w3.org/TR/css-syntax-3/#consume-list-of-declarations)
    ///
    /// Stops before a `}` that closes the enclosing block.
    fn consume_list_of_declarations(&mut self) -> Vec<Declaration> {
        let mut declarations = Vec::new();
        loop {
            match self.peek() {
                Some(CssToken::Whitespace | CssToken::Semicolon) => {
                    let _ = self.consume();
                }
                None | Some(CssToken::RightBrace) => return declarations,
                Some(CssToken::AtKeyword(_)) => {
                    let _ = self.consume_at_rule();
                }
                Some(CssToken::Ident(_)) => {
                    if let Some(declaration) = self.consume_declaration() {
                        declarations.push(declaration);
                    }
                }
                // "This is a parse error. [...] As long as the next input token is
                // anything other than a <semicolon-token> or <EOF-token>, consume a
                // component value and throw away the returned value."
                Some(_) => self.skip_to_declaration_end(),
            }
        }
    }

    fn skip_to_declaration_end(&mut self) {
        while !matches!(
            self.peek(),
            None | Some(CssToken::Semicolon | CssToken::RightBrace)
        ) {
            self.consume_component_value();
        }
    }

    /// [§ 5.4.6 Consume a declaration](https://www.w3.org/TR/css-syntax-3/#consume-declaration)
    fn consume_declaration(&mut self) -> Option<Declaration> {
        let name = match self.consume() {
            Some(CssToken::Ident(name)) if name.starts_with("--") => name.clone(),
            Some(CssToken::Ident(name)) => name.to_ascii_lowercase(),
            _ => return None,
        };
        self.skip_whitespace();
        // "If the next input token is anything other than a <colon-token>, this
        // is a parse error. Return nothing."
        if self.peek() != Some(&CssToken::Colon) {
            self.skip_to_declaration_end();
            return None;
        }
        let _ = self.consume();
        self.skip_whitespace();

        let start = self.position;
        self.skip_to_declaration_end();
        let (end, important) = self.important_annotation(start..self.position);
        Some(Declaration {
            name,
            value: self.text(start..end),
            important,
        })
    }

    /// [§ 6.4.2 Important declarations](https://www.w3.org/TR/css-cascade-4/#importance)
    ///
    /// "A declaration is important if [...] the last two (non-whitespace,
    /// non-comment) tokens in its value are a <delim-token> with the value
    /// "!" followed by an <ident-token> with a value that is an ASCII
    /// case-insensitive match for "important"."
    ///
    /// Returns where the value proper ends and whether the annotation is
    /// present.
    fn important_annotation(&self, value: Range<usize>) -> (usize, bool) {
        let significant = |end: usize| {
            (value.start..end)
                .rev()
                .find(|&i| self.tokens[i].kind != CssToken::Whitespace)
        };
        let Some(last) = significant(value.end) else {
            return (value.start, false);
        };
        let is_important = matches!(
            &self.tokens[last].kind,
            CssToken::Ident(ident) if ident.eq_ignore_ascii_case("important")
        );
        if is_important
            && let Some(bang) = significant(last)
            && self.tokens[bang].kind == CssToken::Delim('!')
        {
            return (bang, true);
        }
        (value.end, false)
    }

    /// [§ 5.4.8 Consume a component value](https://www.w3.org/TR/css-syntax-3/#consume-component-value)
    fn consume_component_value(&mut self) {
        match self.peek() {
            Some(
                CssToken::LeftBrace
                | CssToken::LeftBracket
                | CssToken::LeftParen
                | CssToken::Function(_),
            ) => {
                let _ = self.consume_simple_block();
            }
            _ => {
                let _ = self.consume();
            }
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek() == Some(&CssToken::Whitespace) {
            let _ = self.consume();
        }
    }

    /// The tokens in `range` as text: comments dropped, whitespace runs as
    /// one space, trimmed.
    fn text(&self, range: Range<usize>) -> String {
        let mut text = String::new();
        for token in &self.tokens[range] {
            if token.kind == CssToken::Whitespace {
                // A comment between two whitespace runs leaves two tokens.
                if !text.ends_with(' ') {
                    text.push(' ');
                }
            } else {
                text.push_str(&self.source[token.span.clone()]);
            }
        }
        text.trim().to_string()
    }

    /// The source text covered by the tokens in `range`, verbatim.
    fn source_text(&self, range: Range<usize>) -> String {
        let start = self.tokens.get(range.start).map_or(self.source.len(), |t| t.span.start);
        let end = range
            .end
            .checked_sub(1)
            .filter(|&last| last >= range.start)
            .and_then(|last| self.tokens.get(last))
            .map_or(start, |t| t.span.end);
        self.source[start..end].to_string()
    }

    fn consume(&mut self) -> Option<&CssToken> {
        let token = self.tokens.get(self.position)?;
        self.position += 1;
        Some(&token.kind)
    }

    fn peek(&self) -> Option<&CssToken> {
        self.tokens.get(self.position).map(|t| &t.kind)
    }
}

/// Parse a whole style sheet, as the contents of a `<style>` element.
#[must_use]
pub fn parse_stylesheet(css: &str) -> Stylesheet {
    CssParser::new(css).parse_stylesheet()
}

/// Parse a declaration list, as the value of a `style` attribute.
#[must_use]
pub fn parse_declaration_list(css: &str) -> Vec<Declaration> {
    CssParser::new(css).parse_declaration_list()
}
