//! Integration tests for the HTML tokenizer.

use mojifu_html::{Attribute, HTMLTokenizer, Token};

/// Helper to tokenize a string and return the tokens
fn tokenize(input: &str) -> Vec<Token> {
    let mut tokenizer = HTMLTokenizer::new(input.to_string());
    tokenizer.run();
    tokenizer.into_tokens()
}

/// Concatenate every character token.
fn text(tokens: &[Token]) -> String {
    tokens
        .iter()
        .filter_map(|t| match t {
            Token::Character { data } => Some(*data),
            _ => None,
        })
        .collect()
}

#[test]
fn test_plain_text() {
    let tokens = tokenize("Hello");
    assert_eq!(tokens.len(), 6); // 5 chars + EOF
    assert!(matches!(tokens[0], Token::Character { data: 'H' }));
    assert!(matches!(tokens[4], Token::Character { data: 'o' }));
    assert!(matches!(tokens[5], Token::EndOfFile));
}

#[test]
fn test_doctype() {
    let tokens = tokenize("<!DOCTYPE html>");
    assert_eq!(
        tokens,
        vec![
            Token::Doctype {
                name: Some("html".to_string())
            },
            Token::EndOfFile
        ]
    );
}

#[test]
fn test_start_tag_with_attributes() {
    let tokens = tokenize(r#"<A HREF="/x" class=big data-x='y'>"#);
    match &tokens[0] {
        Token::StartTag {
            name,
            self_closing,
            attributes,
        } => {
            assert_eq!(name, "a");
            assert!(!self_closing);
            assert_eq!(
                attributes,
                &vec![
                    Attribute::new("href".to_string(), "/x".to_string()),
                    Attribute::new("class".to_string(), "big".to_string()),
                    Attribute::new("data-x".to_string(), "y".to_string()),
                ]
            );
        }
        other => panic!("Expected start tag, got {other:?}"),
    }
}

#[test]
fn test_duplicate_attribute_keeps_first() {
    let tokens = tokenize(r#"<p id="a" id="b">"#);
    match &tokens[0] {
        Token::StartTag { attributes, .. } => {
            assert_eq!(attributes.len(), 1);
            assert_eq!(attributes[0].value, "a");
        }
        other => panic!("Expected start tag, got {other:?}"),
    }
}

#[test]
fn test_self_closing_flag() {
    let tokens = tokenize("<br/>");
    assert!(matches!(
        &tokens[0],
        Token::StartTag { name, self_closing: true, .. } if name == "br"
    ));
}

#[test]
fn test_comment() {
    let tokens = tokenize("<!-- hi -->x");
    assert_eq!(
        tokens[0],
        Token::Comment {
            data: " hi ".to_string()
        }
    );
    assert_eq!(text(&tokens), "x");
}

#[test]
fn test_script_contents_are_raw_text() {
    let tokens = tokenize("<script>if (a<b) { x = '<p>'; }</script>");
    assert!(matches!(&tokens[0], Token::StartTag { name, .. } if name == "script"));
    assert_eq!(text(&tokens), "if (a<b) { x = '<p>'; }");
    assert!(
        tokens
            .iter()
            .any(|t| matches!(t, Token::EndTag { name } if name == "script"))
    );
    assert!(
        !tokens
            .iter()
            .any(|t| matches!(t, Token::StartTag { name, .. } if name == "p"))
    );
}

#[test]
fn test_character_references() {
    let tokens = tokenize("a &amp; b &lt;c&gt; &#8212; &#x41; &bogus; AT&T");
    assert_eq!(text(&tokens), "a & b <c> \u{2014} A &bogus; AT&T");
}

#[test]
fn test_character_references_in_attributes() {
    let tokens = tokenize(r#"<a title="Tom &amp; Jerry" href="?a=1&b=2">"#);
    match &tokens[0] {
        Token::StartTag { attributes, .. } => {
            assert_eq!(attributes[0].value, "Tom & Jerry");
            assert_eq!(attributes[1].value, "?a=1&b=2");
        }
        other => panic!("Expected start tag, got {other:?}"),
    }
}

#[test]
fn test_eof_inside_tag_drops_it() {
    let tokens = tokenize("text<div class=");
    assert_eq!(text(&tokens), "text");
    assert_eq!(tokens.last(), Some(&Token::EndOfFile));
    assert!(!tokens.iter().any(|t| matches!(t, Token::StartTag { .. })));
}

#[test]
fn test_lone_less_than_is_text() {
    let tokens = tokenize("1 < 2");
    assert_eq!(text(&tokens), "1 < 2");
}
