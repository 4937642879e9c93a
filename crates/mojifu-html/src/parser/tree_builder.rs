use mojifu_common::warning::warn_once;
use mojifu_dom::{AttributesMap, DomTree, ElementData, NodeId, NodeType};
use strum_macros::Display;

use crate::tokenizer::{Attribute, Token};

/// [§ 13.2.4.1 The insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-insertion-mode)
///
/// "The insertion mode is a state variable that controls the primary operation
/// of the tree construction stage."
///
/// Table, select, template and frameset modes are not modelled: their
/// elements go through the "in body" rules, which is enough to keep table
/// cells and rows nested correctly for content extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum InsertionMode {
    /// [§ 13.2.6.4.1 The "initial" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-initial-insertion-mode)
    Initial,
    /// [§ 13.2.6.4.2 The "before html" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-html-insertion-mode)
    BeforeHtml,
    /// [§ 13.2.6.4.3 The "before head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-head-insertion-mode)
    BeforeHead,
    /// [§ 13.2.6.4.4 The "in head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inhead)
    InHead,
    /// [§ 13.2.6.4.6 The "after head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-head-insertion-mode)
    AfterHead,
    /// [§ 13.2.6.4.7 The "in body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
    InBody,
    /// [§ 13.2.6.4.19 The "after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterbody)
    AfterBody,
}

/// A recoverable problem found while building the tree.
///
/// [§ 13.2.2 Parse errors](https://html.spec.whatwg.org/multipage/parsing.html#parse-errors)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIssue {
    /// What went wrong, e.g. "unexpected end tag </div>".
    pub message: String,
    /// Index into the token stream where this error was encountered.
    pub token_index: usize,
}

/// "The following elements have varying levels of special parsing rules"
///
/// [§ 13.2.4.2 The stack of open elements](https://html.spec.whatwg.org/multipage/parsing.html#special)
const SPECIAL_ELEMENTS: &[&str] = &[
    "address", "applet", "area", "article", "aside", "base", "basefont", "bgsound",
    "blockquote", "body", "br", "button", "caption", "center", "col", "colgroup", "dd",
    "details", "dir", "div", "dl", "dt", "embed", "fieldset", "figcaption", "figure", "footer",
    "form", "frame", "frameset", "h1", "h2", "h3", "h4", "h5", "h6", "head", "header", "hgroup",
    "hr", "html", "iframe", "img", "input", "keygen", "li", "link", "listing", "main",
    "marquee", "menu", "meta", "nav", "noembed", "noframes", "noscript", "object", "ol", "p",
    "param", "plaintext", "pre", "script", "search", "section", "select", "source", "style",
    "summary", "table", "tbody", "td", "template", "textarea", "tfoot", "th", "thead", "title",
    "tr", "track", "ul", "wbr", "xmp",
];

/// [§ 13.1.2 Elements](https://html.spec.whatwg.org/multipage/syntax.html#void-elements)
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "basefont", "bgsound", "br", "col", "embed", "hr", "img", "input", "keygen",
    "link", "meta", "param", "source", "track", "wbr",
];

/// Start tags that close an open `p` element first.
///
/// [§ 13.2.6.4.7](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody):
/// "If the stack of open elements has a p element in button scope, then
/// close a p element."
const CLOSES_P: &[&str] = &[
    "address", "article", "aside", "blockquote", "center", "details", "dialog", "dir", "div",
    "dl", "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5",
    "h6", "header", "hgroup", "hr", "listing", "main", "menu", "nav", "ol", "p", "pre", "search",
    "section", "summary", "table", "ul",
];

/// End tags handled by "If the stack of open elements does not have an
/// element in scope that is an HTML element with the same tag name as that
/// of the token, then this is a parse error; ignore the token."
const BLOCK_END_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "button", "center", "details", "dialog", "dir",
    "div", "dl", "fieldset", "figcaption", "figure", "footer", "form", "header", "hgroup",
    "listing", "main", "menu", "nav", "ol", "pre", "search", "section", "summary", "ul",
];

/// Elements whose content belongs in `<head>`.
const HEAD_ELEMENTS: &[&str] = &[
    "base", "basefont", "bgsound", "link", "meta", "noframes", "noscript", "script", "style",
    "template", "title",
];

const HEADINGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

/// [§ 13.2.6.3 Generate implied end tags](https://html.spec.whatwg.org/multipage/parsing.html#generate-implied-end-tags)
const IMPLIED_END_TAGS: &[&str] = &[
    "dd", "dt", "li", "optgroup", "option", "p", "rb", "rp", "rt", "rtc",
];

const DEFAULT_SCOPE: &[&str] = &[
    "applet", "caption", "html", "table", "td", "th", "marquee", "object", "template",
];
const BUTTON_SCOPE: &[&str] = &[
    "applet", "caption", "html", "table", "td", "th", "marquee", "object", "template", "button",
];
const LIST_ITEM_SCOPE: &[&str] = &[
    "applet", "caption", "html", "table", "td", "th", "marquee", "object", "template", "ol",
    "ul",
];
const TABLE_SCOPE: &[&str] = &["html", "table", "template"];

/// [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction)
///
/// Builds a [`DomTree`] from the tokenizer's output. Every parse error is
/// recovered from; malformed markup always yields a tree with `html`,
/// `head` and `body` elements.
pub struct HTMLParser {
    insertion_mode: InsertionMode,
    stack_of_open_elements: Vec<NodeId>,
    head_element_pointer: Option<NodeId>,
    tree: DomTree,
    tokens: Vec<Token>,
    token_index: usize,
    stopped: bool,
    issues: Vec<ParseIssue>,
}

impl HTMLParser {
    /// Create a parser over a complete token stream.
    #[must_use]
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            insertion_mode: InsertionMode::Initial,
            stack_of_open_elements: Vec::new(),
            head_element_pointer: None,
            tree: DomTree::new(),
            tokens,
            token_index: 0,
            stopped: false,
            issues: Vec::new(),
        }
    }

    /// Run the parser and return the tree.
    #[must_use]
    pub fn run(self) -> DomTree {
        self.run_with_issues().0
    }

    /// Run the parser and return both the [`DomTree`] and any parse issues.
    #[must_use]
    pub fn run_with_issues(mut self) -> (DomTree, Vec<ParseIssue>) {
        let tokens = std::mem::take(&mut self.tokens);
        for (index, token) in tokens.iter().enumerate() {
            if self.stopped {
                break;
            }
            self.token_index = index;
            self.process_token(token);
        }
        if !self.stopped {
            self.stop_parsing();
        }
        (self.tree, self.issues)
    }

    /// [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction-dispatcher)
    fn process_token(&mut self, token: &Token) {
        match self.insertion_mode {
            InsertionMode::Initial => self.handle_initial_mode(token),
            InsertionMode::BeforeHtml => self.handle_before_html_mode(token),
            InsertionMode::BeforeHead => self.handle_before_head_mode(token),
            InsertionMode::InHead => self.handle_in_head_mode(token),
            InsertionMode::AfterHead => self.handle_after_head_mode(token),
            InsertionMode::InBody => self.handle_in_body_mode(token),
            InsertionMode::AfterBody => self.handle_after_body_mode(token),
        }
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    const fn is_whitespace(c: char) -> bool {
        matches!(c, '\t' | '\n' | '\x0C' | '\r' | ' ')
    }

    fn parse_error(&mut self, message: &str) {
        warn_once("HTML Parser", message);
        self.issues.push(ParseIssue {
            message: message.to_string(),
            token_index: self.token_index,
        });
    }

    /// "The current node is the bottommost node in this stack of open elements."
    fn current_node(&self) -> Option<NodeId> {
        self.stack_of_open_elements.last().copied()
    }

    fn tag_of(&self, id: NodeId) -> &str {
        self.tree.tag_name(id).unwrap_or("")
    }

    fn current_node_is(&self, tags: &[&str]) -> bool {
        self.current_node()
            .is_some_and(|id| tags.contains(&self.tag_of(id)))
    }

    /// "The appropriate place for inserting a node": inside the current node,
    /// or the Document before the `html` element exists.
    fn insertion_parent(&self) -> NodeId {
        self.current_node().unwrap_or(NodeId::ROOT)
    }

    /// [§ 13.2.6.1 Insert a character](https://html.spec.whatwg.org/multipage/parsing.html#insert-a-character)
    fn insert_character(&mut self, c: char) {
        let parent = self.insertion_parent();
        if parent == NodeId::ROOT {
            return;
        }
        let mut buf = [0; 4];
        self.tree.append_text(parent, c.encode_utf8(&mut buf));
    }

    /// [§ 13.2.6.1 Insert a comment](https://html.spec.whatwg.org/multipage/parsing.html#insert-a-comment)
    fn insert_comment(&mut self, data: &str, parent: NodeId) {
        let id = self.tree.alloc(NodeType::Comment(data.to_string()));
        self.tree.append_child(parent, id);
    }

    /// [§ 13.2.6.1 Insert an HTML element](https://html.spec.whatwg.org/multipage/parsing.html#insert-an-html-element)
    ///
    /// Creates the element, appends it at the insertion point and pushes it
    /// onto the stack of open elements.
    fn insert_html_element(&mut self, name: &str, attributes: &[Attribute]) -> NodeId {
        let mut attrs = AttributesMap::new();
        for attribute in attributes {
            let _ = attrs
                .entry(attribute.name.clone())
                .or_insert_with(|| attribute.value.clone());
        }
        let data = ElementData {
            tag_name: name.to_ascii_lowercase(),
            attrs,
        };
        let parent = self.insertion_parent();
        let id = self.tree.alloc(NodeType::Element(data));
        self.tree.append_child(parent, id);
        self.stack_of_open_elements.push(id);
        id
    }

    /// Insert a void element: created and immediately popped.
    fn insert_void_element(&mut self, name: &str, attributes: &[Attribute]) {
        let _ = self.insert_html_element(name, attributes);
        let _ = self.stack_of_open_elements.pop();
    }

    /// "add the attribute and its corresponding value to that element" for
    /// every attribute the element does not already have (`<html>`/`<body>`
    /// start tags seen after the element exists).
    fn merge_attributes(&mut self, target: Option<NodeId>, attributes: &[Attribute]) {
        let Some(data) = target.and_then(|id| self.tree.as_element_mut(id)) else {
            return;
        };
        for attribute in attributes {
            let _ = data
                .attrs
                .entry(attribute.name.clone())
                .or_insert_with(|| attribute.value.clone());
        }
    }

    /// [§ 13.2.4.2 Has an element in the specific scope](https://html.spec.whatwg.org/multipage/parsing.html#has-an-element-in-the-specific-scope)
    fn has_element_in_specific_scope(&self, targets: &[&str], scope: &[&str]) -> bool {
        for &id in self.stack_of_open_elements.iter().rev() {
            let tag = self.tag_of(id);
            if targets.contains(&tag) {
                return true;
            }
            if scope.contains(&tag) {
                return false;
            }
        }
        false
    }

    fn has_element_in_scope(&self, tag: &str) -> bool {
        self.has_element_in_specific_scope(&[tag], DEFAULT_SCOPE)
    }

    fn has_element_in_button_scope(&self, tag: &str) -> bool {
        self.has_element_in_specific_scope(&[tag], BUTTON_SCOPE)
    }

    /// [§ 13.2.6.3 Generate implied end tags](https://html.spec.whatwg.org/multipage/parsing.html#generate-implied-end-tags)
    ///
    /// "while the current node is ... pop the current node off the stack of
    /// open elements", skipping `exclude`.
    fn generate_implied_end_tags(&mut self, exclude: Option<&str>) {
        while let Some(id) = self.current_node() {
            let tag = self.tag_of(id);
            if !IMPLIED_END_TAGS.contains(&tag) || exclude == Some(tag) {
                break;
            }
            let _ = self.stack_of_open_elements.pop();
        }
    }

    /// Pop elements until one whose tag is in `tags` has been popped.
    fn pop_until_one_of(&mut self, tags: &[&str]) {
        while let Some(id) = self.stack_of_open_elements.pop() {
            if tags.contains(&self.tag_of(id)) {
                break;
            }
        }
    }

    /// [§ 13.2.6.4.7](https://html.spec.whatwg.org/multipage/parsing.html#close-a-p-element)
    ///
    /// "Generate implied end tags, except for p elements. ... Pop elements from
    /// the stack of open elements until a p element has been popped from the stack."
    fn close_p_element(&mut self) {
        self.generate_implied_end_tags(Some("p"));
        if !self.current_node_is(&["p"]) {
            self.parse_error("unclosed elements inside p");
        }
        self.pop_until_one_of(&["p"]);
    }

    fn close_p_if_in_button_scope(&mut self) {
        if self.has_element_in_button_scope("p") {
            self.close_p_element();
        }
    }

    fn html_element(&self) -> Option<NodeId> {
        self.stack_of_open_elements.first().copied()
    }

    /// [§ 13.2.6.5 Stopping parsing](https://html.spec.whatwg.org/multipage/parsing.html#stop-parsing)
    ///
    /// Also makes sure the skeleton exists so that `body` is always present.
    fn stop_parsing(&mut self) {
        if self.tree.document_element().is_none() {
            let _ = self.insert_html_element("html", &[]);
        }
        if self.head_element_pointer.is_none() {
            self.stack_of_open_elements.truncate(1);
            self.head_element_pointer = Some(self.insert_html_element("head", &[]));
            let _ = self.stack_of_open_elements.pop();
        }
        if self.tree.body().is_none() {
            self.stack_of_open_elements.truncate(1);
            let _ = self.insert_html_element("body", &[]);
        }
        self.stack_of_open_elements.clear();
        self.stopped = true;
    }

    // =========================================================================
    // Insertion modes
    // =========================================================================

    /// [§ 13.2.6.4.1 The "initial" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-initial-insertion-mode)
    fn handle_initial_mode(&mut self, token: &Token) {
        match token {
            Token::Character { data } if Self::is_whitespace(*data) => {}
            Token::Comment { data } => self.insert_comment(data, NodeId::ROOT),
            Token::Doctype { .. } => self.insertion_mode = InsertionMode::BeforeHtml,
            _ => {
                self.insertion_mode = InsertionMode::BeforeHtml;
                self.process_token(token);
            }
        }
    }

    /// [§ 13.2.6.4.2 The "before html" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-html-insertion-mode)
    fn handle_before_html_mode(&mut self, token: &Token) {
        match token {
            Token::Doctype { .. } => self.parse_error("unexpected DOCTYPE"),
            Token::Comment { data } => self.insert_comment(data, NodeId::ROOT),
            Token::Character { data } if Self::is_whitespace(*data) => {}
            Token::StartTag {
                name, attributes, ..
            } if name == "html" => {
                let _ = self.insert_html_element("html", attributes);
                self.insertion_mode = InsertionMode::BeforeHead;
            }
            Token::EndTag { name } if !matches!(name.as_str(), "head" | "body" | "html" | "br") => {
                self.parse_error(&format!("unexpected end tag </{name}> before html"));
            }
            _ => {
                let _ = self.insert_html_element("html", &[]);
                self.insertion_mode = InsertionMode::BeforeHead;
                self.process_token(token);
            }
        }
    }

    /// [§ 13.2.6.4.3 The "before head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-head-insertion-mode)
    fn handle_before_head_mode(&mut self, token: &Token) {
        match token {
            Token::Character { data } if Self::is_whitespace(*data) => {}
            Token::Comment { data } => {
                let parent = self.insertion_parent();
                self.insert_comment(data, parent);
            }
            Token::Doctype { .. } => self.parse_error("unexpected DOCTYPE"),
            Token::StartTag {
                name, attributes, ..
            } if name == "html" => {
                let html = self.html_element();
                self.merge_attributes(html, attributes);
            }
            Token::StartTag {
                name, attributes, ..
            } if name == "head" => {
                self.head_element_pointer = Some(self.insert_html_element("head", attributes));
                self.insertion_mode = InsertionMode::InHead;
            }
            Token::EndTag { name } if !matches!(name.as_str(), "head" | "body" | "html" | "br") => {
                self.parse_error(&format!("unexpected end tag </{name}> before head"));
            }
            _ => {
                self.head_element_pointer = Some(self.insert_html_element("head", &[]));
                self.insertion_mode = InsertionMode::InHead;
                self.process_token(token);
            }
        }
    }

    /// [§ 13.2.6.4.4 The "in head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inhead)
    ///
    /// Raw-text children (title, style, script) arrive as character tokens
    /// because the tokenizer switched state on their start tag; they are
    /// inserted while such an element is the current node.
    fn handle_in_head_mode(&mut self, token: &Token) {
        let in_raw_text = !self.current_node_is(&["head"]);
        match token {
            Token::Character { data } if Self::is_whitespace(*data) || in_raw_text => {
                self.insert_character(*data);
            }
            Token::Comment { data } => {
                let parent = self.insertion_parent();
                self.insert_comment(data, parent);
            }
            Token::Doctype { .. } => self.parse_error("unexpected DOCTYPE"),
            Token::StartTag {
                name, attributes, ..
            } if name == "html" => {
                let html = self.html_element();
                self.merge_attributes(html, attributes);
            }
            Token::StartTag {
                name, attributes, ..
            } if VOID_ELEMENTS.contains(&name.as_str()) && HEAD_ELEMENTS.contains(&name.as_str()) => {
                self.insert_void_element(name, attributes);
            }
            Token::StartTag {
                name, attributes, ..
            } if HEAD_ELEMENTS.contains(&name.as_str()) => {
                let _ = self.insert_html_element(name, attributes);
            }
            Token::StartTag { name, .. } if name == "head" => {
                self.parse_error("unexpected <head> in head");
            }
            Token::EndTag { name } if in_raw_text && self.current_node_is(&[name.as_str()]) => {
                let _ = self.stack_of_open_elements.pop();
            }
            Token::EndTag { name } if name == "head" => {
                self.pop_until_one_of(&["head"]);
                self.insertion_mode = InsertionMode::AfterHead;
            }
            Token::EndTag { name } if !matches!(name.as_str(), "body" | "html" | "br") => {
                self.parse_error(&format!("unexpected end tag </{name}> in head"));
            }
            _ => {
                // "Pop the current node (which will be the head element) off
                // the stack of open elements. Switch the insertion mode to
                // "after head". Reprocess the token."
                self.pop_until_one_of(&["head"]);
                self.insertion_mode = InsertionMode::AfterHead;
                self.process_token(token);
            }
        }
    }

    /// [§ 13.2.6.4.6 The "after head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-head-insertion-mode)
    fn handle_after_head_mode(&mut self, token: &Token) {
        match token {
            Token::Character { data } if Self::is_whitespace(*data) => {
                self.insert_character(*data);
            }
            Token::Comment { data } => {
                let parent = self.insertion_parent();
                self.insert_comment(data, parent);
            }
            Token::Doctype { .. } => self.parse_error("unexpected DOCTYPE"),
            Token::StartTag {
                name, attributes, ..
            } if name == "html" => {
                let html = self.html_element();
                self.merge_attributes(html, attributes);
            }
            Token::StartTag {
                name, attributes, ..
            } if name == "body" => {
                let _ = self.insert_html_element("body", attributes);
                self.insertion_mode = InsertionMode::InBody;
            }
            // "Push the node pointed to by the head element pointer onto the
            // stack of open elements. Process the token using the rules for
            // the "in head" insertion mode."
            Token::StartTag { name, .. } if HEAD_ELEMENTS.contains(&name.as_str()) => {
                self.parse_error(&format!("<{name}> after head"));
                if let Some(head) = self.head_element_pointer {
                    self.stack_of_open_elements.push(head);
                }
                self.insertion_mode = InsertionMode::InHead;
                self.process_token(token);
            }
            Token::StartTag { name, .. } if name == "head" => {
                self.parse_error("unexpected <head> after head");
            }
            Token::EndTag { name } if !matches!(name.as_str(), "body" | "html" | "br") => {
                self.parse_error(&format!("unexpected end tag </{name}> after head"));
            }
            _ => {
                let _ = self.insert_html_element("body", &[]);
                self.insertion_mode = InsertionMode::InBody;
                self.process_token(token);
            }
        }
    }

    /// [§ 13.2.6.4.7 The "in body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
    fn handle_in_body_mode(&mut self, token: &Token) {
        match token {
            Token::Character { data } => {
                if *data == '\0' {
                    self.parse_error("unexpected-null-character");
                } else {
                    self.insert_character(*data);
                }
            }
            Token::Comment { data } => {
                let parent = self.insertion_parent();
                self.insert_comment(data, parent);
            }
            Token::Doctype { .. } => self.parse_error("unexpected DOCTYPE"),
            Token::StartTag {
                name,
                attributes,
                self_closing,
            } => self.handle_in_body_start_tag(name, attributes, *self_closing),
            Token::EndTag { name } => self.handle_in_body_end_tag(name),
            Token::EndOfFile => self.stop_parsing(),
        }
    }

    fn handle_in_body_start_tag(&mut self, name: &str, attributes: &[Attribute], self_closing: bool) {
        match name {
            "html" => {
                self.parse_error("unexpected <html> in body");
                let html = self.html_element();
                self.merge_attributes(html, attributes);
            }
            "body" => {
                self.parse_error("unexpected <body> in body");
                let body = self.tree.body();
                self.merge_attributes(body, attributes);
            }
            _ if HEAD_ELEMENTS.contains(&name) => {
                if VOID_ELEMENTS.contains(&name) {
                    self.insert_void_element(name, attributes);
                } else {
                    let _ = self.insert_html_element(name, attributes);
                }
            }
            // "If the current node is an HTML element whose tag name is one of
            // "h1", "h2", "h3", "h4", "h5", or "h6", then this is a parse error;
            // pop the current node off the stack of open elements."
            _ if HEADINGS.contains(&name) => {
                self.close_p_if_in_button_scope();
                if self.current_node_is(HEADINGS) {
                    self.parse_error(&format!("<{name}> inside another heading"));
                    let _ = self.stack_of_open_elements.pop();
                }
                let _ = self.insert_html_element(name, attributes);
            }
            "li" => {
                self.close_list_item(&["li"]);
                self.close_p_if_in_button_scope();
                let _ = self.insert_html_element(name, attributes);
            }
            "dd" | "dt" => {
                self.close_list_item(&["dd", "dt"]);
                self.close_p_if_in_button_scope();
                let _ = self.insert_html_element(name, attributes);
            }
            "hr" => {
                self.close_p_if_in_button_scope();
                self.insert_void_element(name, attributes);
            }
            _ if CLOSES_P.contains(&name) => {
                self.close_p_if_in_button_scope();
                let _ = self.insert_html_element(name, attributes);
            }
            "td" | "th" => {
                if self.has_element_in_specific_scope(&["td", "th"], TABLE_SCOPE) {
                    self.generate_implied_end_tags(None);
                    self.pop_until_one_of(&["td", "th"]);
                }
                let _ = self.insert_html_element(name, attributes);
            }
            "tr" => {
                if self.has_element_in_specific_scope(&["tr"], TABLE_SCOPE) {
                    self.generate_implied_end_tags(None);
                    self.pop_until_one_of(&["tr"]);
                }
                let _ = self.insert_html_element(name, attributes);
            }
            "tbody" | "thead" | "tfoot" => {
                if self.has_element_in_specific_scope(&["tbody", "thead", "tfoot"], TABLE_SCOPE) {
                    self.generate_implied_end_tags(None);
                    self.pop_until_one_of(&["tbody", "thead", "tfoot"]);
                }
                let _ = self.insert_html_element(name, attributes);
            }
            "option" => {
                if self.current_node_is(&["option"]) {
                    let _ = self.stack_of_open_elements.pop();
                }
                let _ = self.insert_html_element(name, attributes);
            }
            "a" => {
                // Nested anchors are not allowed; the earlier one is closed.
                if self.has_element_in_scope("a") {
                    self.parse_error("<a> inside another <a>");
                    self.pop_until_one_of(&["a"]);
                }
                let _ = self.insert_html_element(name, attributes);
            }
            _ if VOID_ELEMENTS.contains(&name) => self.insert_void_element(name, attributes),
            _ => {
                // "the self-closing flag ... is not acknowledged" for non-void
                // HTML elements: the element stays open.
                if self_closing {
                    self.parse_error(&format!("non-void element <{name}/> treated as open"));
                }
                let _ = self.insert_html_element(name, attributes);
            }
        }
    }

    /// The `li`/`dd`/`dt` start tag loop: close the nearest open item unless a
    /// special element other than address, div and p intervenes.
    fn close_list_item(&mut self, items: &[&str]) {
        let mut open_item = None;
        for &id in self.stack_of_open_elements.iter().rev() {
            let tag = self.tag_of(id);
            if items.contains(&tag) {
                open_item = Some(tag.to_string());
                break;
            }
            if SPECIAL_ELEMENTS.contains(&tag) && !matches!(tag, "address" | "div" | "p") {
                break;
            }
        }
        if let Some(tag) = open_item {
            self.generate_implied_end_tags(Some(&tag));
            self.pop_until_one_of(&[tag.as_str()]);
        }
    }

    fn handle_in_body_end_tag(&mut self, name: &str) {
        match name {
            "body" | "html" => {
                if !self.has_element_in_scope("body") {
                    self.parse_error(&format!("</{name}> without open body"));
                    return;
                }
                self.insertion_mode = InsertionMode::AfterBody;
                if name == "html" {
                    self.process_token(&Token::EndTag {
                        name: name.to_string(),
                    });
                }
            }
            // "If the stack of open elements does not have a p element in button
            // scope, then this is a parse error; insert an HTML element for a "p"
            // start tag token with no attributes."
            "p" => {
                if !self.has_element_in_button_scope("p") {
                    self.parse_error("</p> without open p");
                    let _ = self.insert_html_element("p", &[]);
                }
                self.close_p_element();
            }
            "li" => {
                if self.has_element_in_specific_scope(&["li"], LIST_ITEM_SCOPE) {
                    self.generate_implied_end_tags(Some("li"));
                    self.pop_until_one_of(&["li"]);
                } else {
                    self.parse_error("</li> without open li");
                }
            }
            "dd" | "dt" => {
                if self.has_element_in_scope(name) {
                    self.generate_implied_end_tags(Some(name));
                    self.pop_until_one_of(&[name]);
                } else {
                    self.parse_error(&format!("</{name}> without open {name}"));
                }
            }
            _ if HEADINGS.contains(&name) => {
                if self.has_element_in_specific_scope(HEADINGS, DEFAULT_SCOPE) {
                    self.generate_implied_end_tags(None);
                    self.pop_until_one_of(HEADINGS);
                } else {
                    self.parse_error(&format!("</{name}> without open heading"));
                }
            }
            "table" | "td" | "th" | "tr" | "tbody" | "thead" | "tfoot" => {
                if self.has_element_in_specific_scope(&[name], TABLE_SCOPE) {
                    self.generate_implied_end_tags(None);
                    self.pop_until_one_of(&[name]);
                } else {
                    self.parse_error(&format!("</{name}> without open {name}"));
                }
            }
            _ if BLOCK_END_TAGS.contains(&name) => {
                if self.has_element_in_scope(name) {
                    self.generate_implied_end_tags(None);
                    self.pop_until_one_of(&[name]);
                } else {
                    self.parse_error(&format!("</{name}> without open {name}"));
                }
            }
            "br" => {
                // "Parse error. Drop the attributes from the token, and act as
                // described in the next entry; i.e. act as if this was a "br"
                // start tag token with no attributes"
                self.parse_error("</br> treated as <br>");
                self.insert_void_element("br", &[]);
            }
            _ => self.any_other_end_tag(name),
        }
    }

    /// "Any other end tag" in [§ 13.2.6.4.7](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody).
    fn any_other_end_tag(&mut self, name: &str) {
        for index in (0..self.stack_of_open_elements.len()).rev() {
            let node = self.stack_of_open_elements[index];
            let tag = self.tag_of(node);
            if tag == name {
                self.generate_implied_end_tags(Some(name));
                self.stack_of_open_elements.truncate(index);
                return;
            }
            if SPECIAL_ELEMENTS.contains(&tag) {
                self.parse_error(&format!("stray end tag </{name}>"));
                return;
            }
        }
    }

    /// [§ 13.2.6.4.19 The "after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterbody)
    fn handle_after_body_mode(&mut self, token: &Token) {
        match token {
            Token::Character { data } if Self::is_whitespace(*data) => {
                if let Some(body) = self.tree.body() {
                    let mut buf = [0; 4];
                    self.tree.append_text(body, data.encode_utf8(&mut buf));
                }
            }
            // "Insert a comment as the last child of the first element in the
            // stack of open elements (the html element)."
            Token::Comment { data } => {
                let parent = self.html_element().unwrap_or(NodeId::ROOT);
                self.insert_comment(data, parent);
            }
            Token::Doctype { .. } => self.parse_error("unexpected DOCTYPE"),
            Token::EndTag { name } if name == "html" => {}
            Token::EndOfFile => self.stop_parsing(),
            _ => {
                self.parse_error("content after </body>");
                self.insertion_mode = InsertionMode::InBody;
                self.process_token(token);
            }
        }
    }
}
