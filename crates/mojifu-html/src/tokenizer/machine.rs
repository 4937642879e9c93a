use mojifu_common::warning::warn_once;
use strum_macros::Display;

use super::character_reference;
use super::token::{Attribute, Token};

/// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
///
/// The tokenizer state machine. The RCDATA and RAWTEXT end-tag sub-states
/// are folded into a lookahead for the appropriate end tag, and script data
/// is handled as RAWTEXT: escaped `<!--` script blocks are not special-cased.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum TokenizerState {
    /// [§ 13.2.5.1 Data state](https://html.spec.whatwg.org/multipage/parsing.html#data-state)
    Data,
    /// [§ 13.2.5.2 RCDATA state](https://html.spec.whatwg.org/multipage/parsing.html#rcdata-state)
    RCDATA,
    /// [§ 13.2.5.3 RAWTEXT state](https://html.spec.whatwg.org/multipage/parsing.html#rawtext-state)
    RAWTEXT,
    /// [§ 13.2.5.6 Tag open state](https://html.spec.whatwg.org/multipage/parsing.html#tag-open-state)
    TagOpen,
    /// [§ 13.2.5.7 End tag open state](https://html.spec.whatwg.org/multipage/parsing.html#end-tag-open-state)
    EndTagOpen,
    /// [§ 13.2.5.8 Tag name state](https://html.spec.whatwg.org/multipage/parsing.html#tag-name-state)
    TagName,
    /// [§ 13.2.5.32 Before attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-name-state)
    BeforeAttributeName,
    /// [§ 13.2.5.33 Attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-name-state)
    AttributeName,
    /// [§ 13.2.5.34 After attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#after-attribute-name-state)
    AfterAttributeName,
    /// [§ 13.2.5.35 Before attribute value state](https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-value-state)
    BeforeAttributeValue,
    /// [§ 13.2.5.36 Attribute value (double-quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(double-quoted)-state)
    AttributeValueDoubleQuoted,
    /// [§ 13.2.5.37 Attribute value (single-quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(single-quoted)-state)
    AttributeValueSingleQuoted,
    /// [§ 13.2.5.38 Attribute value (unquoted) state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(unquoted)-state)
    AttributeValueUnquoted,
    /// [§ 13.2.5.39 After attribute value (quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#after-attribute-value-(quoted)-state)
    AfterAttributeValueQuoted,
    /// [§ 13.2.5.40 Self-closing start tag state](https://html.spec.whatwg.org/multipage/parsing.html#self-closing-start-tag-state)
    SelfClosingStartTag,
    /// [§ 13.2.5.41 Bogus comment state](https://html.spec.whatwg.org/multipage/parsing.html#bogus-comment-state)
    BogusComment,
    /// [§ 13.2.5.42 Markup declaration open state](https://html.spec.whatwg.org/multipage/parsing.html#markup-declaration-open-state)
    MarkupDeclarationOpen,
}

/// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
///
/// "Implementations must act as if they used the following state machine to tokenize HTML."
pub struct HTMLTokenizer {
    state: TokenizerState,
    input: Vec<char>,
    current_pos: usize,
    current_token: Option<Token>,
    current_attribute: Option<Attribute>,
    token_stream: Vec<Token>,
    done: bool,

    /// "The last start tag token emitted is used as part of the tree construction stage
    /// and in the RCDATA, RAWTEXT, and script data states."
    last_start_tag_name: Option<String>,
}

impl HTMLTokenizer {
    /// Create a new tokenizer for the given input.
    ///
    /// "The initial state is the data state."
    #[must_use]
    pub fn new(input: String) -> Self {
        Self {
            state: TokenizerState::Data,
            // [§ 13.2.3.5 Preprocessing the input stream](https://html.spec.whatwg.org/multipage/parsing.html#preprocessing-the-input-stream)
            // "normalize newlines"
            input: input.replace("\r\n", "\n").replace('\r', "\n").chars().collect(),
            current_pos: 0,
            current_token: None,
            current_attribute: None,
            token_stream: Vec::new(),
            done: false,
            last_start_tag_name: None,
        }
    }

    /// Consume the tokenizer and return the token stream.
    /// Call this after [`HTMLTokenizer::run`] to get the tokens for the parser.
    #[must_use]
    pub fn into_tokens(self) -> Vec<Token> {
        self.token_stream
    }

    /// Run the tokenizer to completion.
    ///
    /// The stream always ends with exactly one [`Token::EndOfFile`].
    pub fn run(&mut self) {
        while !self.done {
            let c = self.consume();
            match self.state {
                TokenizerState::Data => self.handle_data_state(c),
                TokenizerState::RCDATA => self.handle_text_state(c, true),
                TokenizerState::RAWTEXT => self.handle_text_state(c, false),
                TokenizerState::TagOpen => self.handle_tag_open_state(c),
                TokenizerState::EndTagOpen => self.handle_end_tag_open_state(c),
                TokenizerState::TagName => self.handle_tag_name_state(c),
                TokenizerState::BeforeAttributeName => self.handle_before_attribute_name_state(c),
                TokenizerState::AttributeName => self.handle_attribute_name_state(c),
                TokenizerState::AfterAttributeName => self.handle_after_attribute_name_state(c),
                TokenizerState::BeforeAttributeValue => {
                    self.handle_before_attribute_value_state(c);
                }
                TokenizerState::AttributeValueDoubleQuoted => {
                    self.handle_attribute_value_quoted_state(c, '"');
                }
                TokenizerState::AttributeValueSingleQuoted => {
                    self.handle_attribute_value_quoted_state(c, '\'');
                }
                TokenizerState::AttributeValueUnquoted => {
                    self.handle_attribute_value_unquoted_state(c);
                }
                TokenizerState::AfterAttributeValueQuoted => {
                    self.handle_after_attribute_value_quoted_state(c);
                }
                TokenizerState::SelfClosingStartTag => self.handle_self_closing_start_tag_state(c),
                TokenizerState::BogusComment => self.handle_bogus_comment_state(c),
                TokenizerState::MarkupDeclarationOpen => {
                    self.handle_markup_declaration_open_state(c);
                }
            }
        }
    }

    // =========================================================================
    // Input stream helpers
    // =========================================================================

    fn consume(&mut self) -> Option<char> {
        let c = self.input.get(self.current_pos).copied();
        if c.is_some() {
            self.current_pos += 1;
        }
        c
    }

    /// "Reconsume in the X state." EOF was never consumed, so there is
    /// nothing to step back over.
    fn reconsume_in(&mut self, state: TokenizerState, c: Option<char>) {
        if c.is_some() {
            self.current_pos -= 1;
        }
        self.state = state;
    }

    const fn switch_to(&mut self, state: TokenizerState) {
        self.state = state;
    }

    fn remaining(&self) -> &[char] {
        &self.input[self.current_pos..]
    }

    fn next_few_characters_are_case_insensitive(&self, target: &str) -> bool {
        let rest = self.remaining();
        target.chars().count() <= rest.len()
            && target
                .chars()
                .zip(rest)
                .all(|(a, b)| a.eq_ignore_ascii_case(b))
    }

    const fn is_whitespace(c: char) -> bool {
        matches!(c, ' ' | '\t' | '\n' | '\x0C')
    }

    fn log_parse_error(&self, message: &str) {
        warn_once(
            "HTML Tokenizer",
            &format!("{message} at position {}", self.current_pos),
        );
    }

    // =========================================================================
    // Token emission
    // =========================================================================

    fn emit_character_token(&mut self, c: char) {
        self.token_stream.push(Token::Character { data: c });
    }

    fn emit_eof_token(&mut self) {
        self.token_stream.push(Token::EndOfFile);
        self.done = true;
    }

    /// "Emit the current tag token."
    ///
    /// The parser runs after the tokenizer, so the tokenizer switches itself
    /// into RCDATA/RAWTEXT for the elements whose contents are not markup.
    fn emit_current_tag(&mut self) {
        self.finish_attribute();
        let Some(token) = self.current_token.take() else {
            return;
        };
        if let Token::StartTag { name, .. } = &token {
            self.last_start_tag_name = Some(name.clone());
            match name.as_str() {
                // [§ 13.2.6.2](https://html.spec.whatwg.org/multipage/parsing.html#generic-rcdata-element-parsing-algorithm)
                "title" | "textarea" => self.switch_to(TokenizerState::RCDATA),
                // [§ 13.2.6.3](https://html.spec.whatwg.org/multipage/parsing.html#generic-raw-text-element-parsing-algorithm)
                "style" | "script" | "xmp" | "iframe" | "noembed" | "noframes" | "noscript" => {
                    self.switch_to(TokenizerState::RAWTEXT);
                }
                _ => self.switch_to(TokenizerState::Data),
            }
        } else {
            self.switch_to(TokenizerState::Data);
        }
        self.token_stream.push(token);
    }

    fn start_new_attribute(&mut self, first: Option<char>) {
        self.finish_attribute();
        let mut attribute = Attribute::new(String::new(), String::new());
        if let Some(c) = first {
            attribute.name.push(c);
        }
        self.current_attribute = Some(attribute);
    }

    /// [§ 13.2.5.33 Attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-name-state)
    ///
    /// "if there is already an attribute on the token with the exact same name,
    /// then this is a duplicate-attribute parse error and the new attribute
    /// must be removed from the token."
    fn finish_attribute(&mut self) {
        let Some(attribute) = self.current_attribute.take() else {
            return;
        };
        if let Some(Token::StartTag { attributes, .. }) = &mut self.current_token {
            if attributes.iter().any(|a| a.name == attribute.name) {
                self.log_parse_error("duplicate-attribute");
            } else {
                attributes.push(attribute);
            }
        }
    }

    fn append_to_attribute_name(&mut self, c: char) {
        if let Some(attribute) = &mut self.current_attribute {
            attribute.name.push(c.to_ascii_lowercase());
        }
    }

    fn append_to_attribute_value(&mut self, text: &str) {
        if let Some(attribute) = &mut self.current_attribute {
            attribute.value.push_str(text);
        }
    }

    /// Resolve a character reference right after a consumed `&`, returning
    /// the text to use in its place.
    fn consume_character_reference(&mut self, in_attribute: bool) -> String {
        match character_reference::resolve(self.remaining(), in_attribute) {
            Some(resolved) => {
                self.current_pos += resolved.consumed;
                resolved.text
            }
            None => String::from('&'),
        }
    }

    /// The EOF-in-tag case shared by every tag state: "This is an eof-in-tag
    /// parse error. Emit an end-of-file token." The partial tag is dropped.
    fn eof_in_tag(&mut self) {
        self.log_parse_error("eof-in-tag");
        self.current_token = None;
        self.current_attribute = None;
        self.emit_eof_token();
    }

    // =========================================================================
    // State handlers
    // =========================================================================

    /// [§ 13.2.5.1 Data state](https://html.spec.whatwg.org/multipage/parsing.html#data-state)
    fn handle_data_state(&mut self, c: Option<char>) {
        match c {
            Some('&') => {
                for ch in self.consume_character_reference(false).chars() {
                    self.emit_character_token(ch);
                }
            }
            Some('<') => self.switch_to(TokenizerState::TagOpen),
            Some('\0') => self.log_parse_error("unexpected-null-character"),
            None => self.emit_eof_token(),
            Some(ch) => self.emit_character_token(ch),
        }
    }

    /// [§ 13.2.5.2 RCDATA state](https://html.spec.whatwg.org/multipage/parsing.html#rcdata-state)
    /// and [§ 13.2.5.3 RAWTEXT state](https://html.spec.whatwg.org/multipage/parsing.html#rawtext-state)
    ///
    /// A `<` only ends the text when it starts "an appropriate end tag token":
    /// "one whose tag name matches the tag name of the last start tag to have
    /// been emitted from this tokenizer".
    fn handle_text_state(&mut self, c: Option<char>, resolve_references: bool) {
        match c {
            Some('&') if resolve_references => {
                for ch in self.consume_character_reference(false).chars() {
                    self.emit_character_token(ch);
                }
            }
            Some('<') if self.at_appropriate_end_tag() => {
                self.switch_to(TokenizerState::EndTagOpen);
                let _ = self.consume();
            }
            Some('\0') => self.emit_character_token('\u{FFFD}'),
            None => self.emit_eof_token(),
            Some(ch) => self.emit_character_token(ch),
        }
    }

    fn at_appropriate_end_tag(&self) -> bool {
        let Some(name) = &self.last_start_tag_name else {
            return false;
        };
        let rest = self.remaining();
        if !self.next_few_characters_are_case_insensitive(&format!("/{name}")) {
            return false;
        }
        match rest.get(name.chars().count() + 1) {
            Some(&ch) => Self::is_whitespace(ch) || ch == '/' || ch == '>',
            None => false,
        }
    }

    /// [§ 13.2.5.6 Tag open state](https://html.spec.whatwg.org/multipage/parsing.html#tag-open-state)
    fn handle_tag_open_state(&mut self, c: Option<char>) {
        match c {
            Some('!') => self.switch_to(TokenizerState::MarkupDeclarationOpen),
            Some('/') => self.switch_to(TokenizerState::EndTagOpen),
            Some(ch) if ch.is_ascii_alphabetic() => {
                self.current_token = Some(Token::new_start_tag());
                self.reconsume_in(TokenizerState::TagName, c);
            }
            // "This is an unexpected-question-mark-instead-of-tag-name parse error.
            // Create a comment token whose data is the empty string. Reconsume in
            // the bogus comment state."
            Some('?') => {
                self.log_parse_error("unexpected-question-mark-instead-of-tag-name");
                self.current_token = Some(Token::Comment {
                    data: String::new(),
                });
                self.reconsume_in(TokenizerState::BogusComment, c);
            }
            None => {
                self.emit_character_token('<');
                self.emit_eof_token();
            }
            // "This is an invalid-first-character-of-tag-name parse error. Emit a
            // U+003C LESS-THAN SIGN character token. Reconsume in the data state."
            Some(_) => {
                self.log_parse_error("invalid-first-character-of-tag-name");
                self.emit_character_token('<');
                self.reconsume_in(TokenizerState::Data, c);
            }
        }
    }

    /// [§ 13.2.5.7 End tag open state](https://html.spec.whatwg.org/multipage/parsing.html#end-tag-open-state)
    fn handle_end_tag_open_state(&mut self, c: Option<char>) {
        match c {
            Some(ch) if ch.is_ascii_alphabetic() => {
                self.current_token = Some(Token::new_end_tag());
                self.reconsume_in(TokenizerState::TagName, c);
            }
            Some('>') => {
                self.log_parse_error("missing-end-tag-name");
                self.switch_to(TokenizerState::Data);
            }
            None => {
                self.emit_character_token('<');
                self.emit_character_token('/');
                self.emit_eof_token();
            }
            Some(_) => {
                self.log_parse_error("invalid-first-character-of-tag-name");
                self.current_token = Some(Token::Comment {
                    data: String::new(),
                });
                self.reconsume_in(TokenizerState::BogusComment, c);
            }
        }
    }

    /// [§ 13.2.5.8 Tag name state](https://html.spec.whatwg.org/multipage/parsing.html#tag-name-state)
    fn handle_tag_name_state(&mut self, c: Option<char>) {
        match c {
            Some(ch) if Self::is_whitespace(ch) => {
                self.switch_to(TokenizerState::BeforeAttributeName);
            }
            Some('/') => self.switch_to(TokenizerState::SelfClosingStartTag),
            Some('>') => self.emit_current_tag(),
            Some('\0') => {
                if let Some(token) = &mut self.current_token {
                    token.append_to_tag_name('\u{FFFD}');
                }
            }
            None => self.eof_in_tag(),
            Some(ch) => {
                if let Some(token) = &mut self.current_token {
                    token.append_to_tag_name(ch.to_ascii_lowercase());
                }
            }
        }
    }

    /// [§ 13.2.5.32 Before attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-name-state)
    fn handle_before_attribute_name_state(&mut self, c: Option<char>) {
        match c {
            Some(ch) if Self::is_whitespace(ch) => {}
            Some('/' | '>') | None => self.reconsume_in(TokenizerState::AfterAttributeName, c),
            // "This is an unexpected-equals-sign-before-attribute-name parse error.
            // Start a new attribute in the current tag token. Set that attribute's
            // name to the current input character"
            Some('=') => {
                self.log_parse_error("unexpected-equals-sign-before-attribute-name");
                self.start_new_attribute(Some('='));
                self.switch_to(TokenizerState::AttributeName);
            }
            Some(_) => {
                self.start_new_attribute(None);
                self.reconsume_in(TokenizerState::AttributeName, c);
            }
        }
    }

    /// [§ 13.2.5.33 Attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-name-state)
    fn handle_attribute_name_state(&mut self, c: Option<char>) {
        match c {
            Some(ch) if Self::is_whitespace(ch) => {
                self.reconsume_in(TokenizerState::AfterAttributeName, c);
            }
            Some('/' | '>') | None => self.reconsume_in(TokenizerState::AfterAttributeName, c),
            Some('=') => self.switch_to(TokenizerState::BeforeAttributeValue),
            Some('\0') => self.append_to_attribute_name('\u{FFFD}'),
            Some(ch) => self.append_to_attribute_name(ch),
        }
    }

    /// [§ 13.2.5.34 After attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#after-attribute-name-state)
    fn handle_after_attribute_name_state(&mut self, c: Option<char>) {
        match c {
            Some(ch) if Self::is_whitespace(ch) => {}
            Some('/') => self.switch_to(TokenizerState::SelfClosingStartTag),
            Some('=') => self.switch_to(TokenizerState::BeforeAttributeValue),
            Some('>') => self.emit_current_tag(),
            None => self.eof_in_tag(),
            Some(_) => {
                self.start_new_attribute(None);
                self.reconsume_in(TokenizerState::AttributeName, c);
            }
        }
    }

    /// [§ 13.2.5.35 Before attribute value state](https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-value-state)
    fn handle_before_attribute_value_state(&mut self, c: Option<char>) {
        match c {
            Some(ch) if Self::is_whitespace(ch) => {}
            Some('"') => self.switch_to(TokenizerState::AttributeValueDoubleQuoted),
            Some('\'') => self.switch_to(TokenizerState::AttributeValueSingleQuoted),
            // "This is a missing-attribute-value parse error. Switch to the data
            // state. Emit the current tag token."
            Some('>') => {
                self.log_parse_error("missing-attribute-value");
                self.emit_current_tag();
            }
            _ => self.reconsume_in(TokenizerState::AttributeValueUnquoted, c),
        }
    }

    /// [§ 13.2.5.36](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(double-quoted)-state)
    /// and [§ 13.2.5.37](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(single-quoted)-state)
    fn handle_attribute_value_quoted_state(&mut self, c: Option<char>, quote: char) {
        match c {
            Some(ch) if ch == quote => self.switch_to(TokenizerState::AfterAttributeValueQuoted),
            Some('&') => {
                let text = self.consume_character_reference(true);
                self.append_to_attribute_value(&text);
            }
            Some('\0') => self.append_to_attribute_value("\u{FFFD}"),
            None => self.eof_in_tag(),
            Some(ch) => {
                let mut buf = [0; 4];
                self.append_to_attribute_value(ch.encode_utf8(&mut buf));
            }
        }
    }

    /// [§ 13.2.5.38 Attribute value (unquoted) state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(unquoted)-state)
    fn handle_attribute_value_unquoted_state(&mut self, c: Option<char>) {
        match c {
            Some(ch) if Self::is_whitespace(ch) => {
                self.switch_to(TokenizerState::BeforeAttributeName);
            }
            Some('&') => {
                let text = self.consume_character_reference(true);
                self.append_to_attribute_value(&text);
            }
            Some('>') => self.emit_current_tag(),
            Some('\0') => self.append_to_attribute_value("\u{FFFD}"),
            None => self.eof_in_tag(),
            Some(ch) => {
                let mut buf = [0; 4];
                self.append_to_attribute_value(ch.encode_utf8(&mut buf));
            }
        }
    }

    /// [§ 13.2.5.39 After attribute value (quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#after-attribute-value-(quoted)-state)
    fn handle_after_attribute_value_quoted_state(&mut self, c: Option<char>) {
        match c {
            Some(ch) if Self::is_whitespace(ch) => {
                self.switch_to(TokenizerState::BeforeAttributeName);
            }
            Some('/') => self.switch_to(TokenizerState::SelfClosingStartTag),
            Some('>') => self.emit_current_tag(),
            None => self.eof_in_tag(),
            Some(_) => {
                self.log_parse_error("missing-whitespace-between-attributes");
                self.reconsume_in(TokenizerState::BeforeAttributeName, c);
            }
        }
    }

    /// [§ 13.2.5.40 Self-closing start tag state](https://html.spec.whatwg.org/multipage/parsing.html#self-closing-start-tag-state)
    fn handle_self_closing_start_tag_state(&mut self, c: Option<char>) {
        match c {
            // "Set the self-closing flag of the current tag token. Switch to the
            // data state. Emit the current tag token."
            Some('>') => {
                if let Some(Token::StartTag { self_closing, .. }) = &mut self.current_token {
                    *self_closing = true;
                }
                self.emit_current_tag();
            }
            None => self.eof_in_tag(),
            Some(_) => {
                self.log_parse_error("unexpected-solidus-in-tag");
                self.reconsume_in(TokenizerState::BeforeAttributeName, c);
            }
        }
    }

    /// [§ 13.2.5.41 Bogus comment state](https://html.spec.whatwg.org/multipage/parsing.html#bogus-comment-state)
    fn handle_bogus_comment_state(&mut self, c: Option<char>) {
        match c {
            Some('>') => {
                if let Some(token) = self.current_token.take() {
                    self.token_stream.push(token);
                }
                self.switch_to(TokenizerState::Data);
            }
            None => {
                if let Some(token) = self.current_token.take() {
                    self.token_stream.push(token);
                }
                self.emit_eof_token();
            }
            Some(ch) => {
                if let Some(Token::Comment { data }) = &mut self.current_token {
                    data.push(if ch == '\0' { '\u{FFFD}' } else { ch });
                }
            }
        }
    }

    /// [§ 13.2.5.42 Markup declaration open state](https://html.spec.whatwg.org/multipage/parsing.html#markup-declaration-open-state)
    ///
    /// Comments and DOCTYPEs are read in one step: a comment runs to the
    /// first `-->` (or EOF), a DOCTYPE to the next `>`.
    fn handle_markup_declaration_open_state(&mut self, c: Option<char>) {
        // The `!` was consumed to get here; step back onto what follows it.
        self.reconsume_in(TokenizerState::MarkupDeclarationOpen, c);

        if self.next_few_characters_are_case_insensitive("--") {
            self.current_pos += 2;
            self.consume_comment();
            return;
        }

        if self.next_few_characters_are_case_insensitive("doctype") {
            self.current_pos += "doctype".len();
            self.consume_doctype();
            return;
        }

        // "This is an incorrectly-opened-comment parse error. Create a comment
        // token whose data is the empty string. Switch to the bogus comment
        // state (don't consume anything in the current state)."
        self.log_parse_error("incorrectly-opened-comment");
        self.current_token = Some(Token::Comment {
            data: String::new(),
        });
        self.switch_to(TokenizerState::BogusComment);
    }

    /// [§ 13.2.5.43 Comment start state](https://html.spec.whatwg.org/multipage/parsing.html#comment-start-state)
    /// through [§ 13.2.5.52 Comment end bang state](https://html.spec.whatwg.org/multipage/parsing.html#comment-end-bang-state),
    /// collapsed: the comment runs to the first `-->`.
    fn consume_comment(&mut self) {
        let rest = self.remaining();
        let (data, advance, at_eof) = if rest.starts_with(&['>']) {
            // "<!-->": abrupt-closing-of-empty-comment
            (String::new(), 1, false)
        } else if rest.starts_with(&['-', '>']) {
            (String::new(), 2, false)
        } else if let Some(n) = rest.windows(3).position(|w| w == ['-', '-', '>']) {
            (rest[..n].iter().collect(), n + 3, false)
        } else {
            (rest.iter().collect(), rest.len(), true)
        };
        if at_eof {
            self.log_parse_error("eof-in-comment");
        }
        self.current_pos += advance;
        self.token_stream.push(Token::Comment { data });
        self.switch_to(TokenizerState::Data);
    }

    /// [§ 13.2.5.53 DOCTYPE state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-state)
    ///
    /// Only the name is kept; everything up to the next `>` is skipped.
    fn consume_doctype(&mut self) {
        let rest = self.remaining();
        let end = rest.iter().position(|&ch| ch == '>');
        let body: String = rest[..end.unwrap_or(rest.len())].iter().collect();
        let advance = end.map_or(rest.len(), |n| n + 1);
        self.current_pos += advance;

        let name = body
            .split_ascii_whitespace()
            .next()
            .map(str::to_ascii_lowercase);
        self.token_stream.push(Token::Doctype { name });
        self.switch_to(TokenizerState::Data);
    }
}
