//! [§ 13.2.5.72 Character reference state](https://html.spec.whatwg.org/multipage/parsing.html#character-reference-state)
//!
//! Only the entities that show up in article prose are recognised. Anything
//! else is left in the text as written, which keeps text lengths close to
//! what a browser reports without carrying the full 2,231-entry table.

/// Named references and their replacement text. Sorted by name.
const NAMED_REFERENCES: &[(&str, &str)] = &[
    ("amp", "&"),
    ("apos", "'"),
    ("bull", "\u{2022}"),
    ("cent", "\u{00A2}"),
    ("copy", "\u{00A9}"),
    ("deg", "\u{00B0}"),
    ("emsp", "\u{2003}"),
    ("ensp", "\u{2002}"),
    ("euro", "\u{20AC}"),
    ("gt", ">"),
    ("hellip", "\u{2026}"),
    ("laquo", "\u{00AB}"),
    ("ldquo", "\u{201C}"),
    ("lsquo", "\u{2018}"),
    ("lt", "<"),
    ("mdash", "\u{2014}"),
    ("middot", "\u{00B7}"),
    ("nbsp", "\u{00A0}"),
    ("ndash", "\u{2013}"),
    ("para", "\u{00B6}"),
    ("pound", "\u{00A3}"),
    ("quot", "\""),
    ("raquo", "\u{00BB}"),
    ("rdquo", "\u{201D}"),
    ("reg", "\u{00AE}"),
    ("rsquo", "\u{2019}"),
    ("sect", "\u{00A7}"),
    ("shy", "\u{00AD}"),
    ("thinsp", "\u{2009}"),
    ("times", "\u{00D7}"),
    ("trade", "\u{2122}"),
    ("yen", "\u{00A5}"),
    ("zwj", "\u{200D}"),
    ("zwnj", "\u{200C}"),
];

/// Legacy references that browsers still honour without the trailing `;`.
const LEGACY_WITHOUT_SEMICOLON: &[&str] = &["amp", "copy", "gt", "lt", "nbsp", "quot", "reg"];

/// Look up a named reference (without `&` or `;`).
#[must_use]
pub fn lookup_entity(name: &str) -> Option<&'static str> {
    NAMED_REFERENCES
        .binary_search_by(|(entry, _)| entry.cmp(&name))
        .ok()
        .map(|index| NAMED_REFERENCES[index].1)
}

/// The outcome of resolving a reference that starts right after an `&`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedReference {
    /// Replacement text.
    pub text: String,
    /// Number of input characters consumed after the `&`.
    pub consumed: usize,
}

/// Resolve the reference at the start of `rest` (the input after `&`).
///
/// Returns `None` when the `&` should be emitted literally.
///
/// [§ 13.2.5.73 Named character reference state](https://html.spec.whatwg.org/multipage/parsing.html#named-character-reference-state):
/// "If the character reference was consumed as part of an attribute, and the
/// last character matched is not a U+003B SEMICOLON character (;), and the
/// next input character is either a U+003D EQUALS SIGN character (=) or an
/// ASCII alphanumeric, then, for historical reasons, flush code points
/// consumed as a character reference and switch to the return state."
#[must_use]
pub fn resolve(rest: &[char], in_attribute: bool) -> Option<ResolvedReference> {
    match rest.first() {
        Some('#') => resolve_numeric(rest),
        Some(c) if c.is_ascii_alphanumeric() => resolve_named(rest, in_attribute),
        _ => None,
    }
}

fn resolve_named(rest: &[char], in_attribute: bool) -> Option<ResolvedReference> {
    let name_len = rest
        .iter()
        .take_while(|c| c.is_ascii_alphanumeric())
        .count();
    let name: String = rest[..name_len].iter().collect();
    let text = lookup_entity(&name)?;

    if rest.get(name_len) == Some(&';') {
        return Some(ResolvedReference {
            text: text.to_string(),
            consumed: name_len + 1,
        });
    }

    if !LEGACY_WITHOUT_SEMICOLON.contains(&name.as_str()) {
        return None;
    }
    if in_attribute && rest.get(name_len) == Some(&'=') {
        return None;
    }
    Some(ResolvedReference {
        text: text.to_string(),
        consumed: name_len,
    })
}

/// [§ 13.2.5.75 Numeric character reference state](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-state)
fn resolve_numeric(rest: &[char]) -> Option<ResolvedReference> {
    let hex = matches!(rest.get(1), Some('x' | 'X'));
    let digits_start = if hex { 2 } else { 1 };
    let radix = if hex { 16 } else { 10 };

    let digit_count = rest[digits_start..]
        .iter()
        .take_while(|c| c.is_digit(radix))
        .count();
    // "absence-of-digits-in-numeric-character-reference parse error":
    // the whole thing is flushed as text.
    if digit_count == 0 {
        return None;
    }

    let digits: String = rest[digits_start..digits_start + digit_count]
        .iter()
        .collect();
    let mut consumed = digits_start + digit_count;
    if rest.get(consumed) == Some(&';') {
        consumed += 1;
    }

    // [§ 13.2.5.80 Numeric character reference end state](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-end-state)
    // "If the number is 0x00 ... greater than 0x10FFFF ... or a surrogate,
    // set the character reference code to 0xFFFD."
    let c = u32::from_str_radix(&digits, radix)
        .ok()
        .filter(|&code| code != 0)
        .and_then(char::from_u32)
        .unwrap_or('\u{FFFD}');

    Some(ResolvedReference {
        text: c.to_string(),
        consumed,
    })
}
