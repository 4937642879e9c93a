//! Turns a captured style into CSS rules.
//!
//! Every declaration is `<property>: <value> !important`. Values are written
//! exactly as captured; a value the browser cannot parse just drops that
//! declaration on the floor when the stylesheet is applied.
//!
//! Two placements exist:
//!
//! - **Exact apply**: every enabled property on the selector itself.
//! - **Smart apply**: identity properties ([`TextProperty::IDENTITY`]) on the
//!   container and all of its descendants, typography properties on the
//!   container and its body text only. Headings keep their own sizes.

use serde::{Deserialize, Serialize};

use mojifu_common::warning::warn_once;

use crate::properties::{PropertySet, StructureMap, StructureTag, TextProperty};

/// Descendants that receive typography under smart apply. Headings are
/// left out.
pub const SMART_BODY_SELECTORS: [&str; 9] =
    ["p", "span", "li", "a", "div", "td", "blockquote", "pre", "code"];

/// Text elements that inherit the paragraph typography of an article style
/// when they were not captured themselves.
pub const BODY_TEXT_ELEMENTS: [&str; 14] = [
    "p",
    "span",
    "li",
    "td",
    "th",
    "blockquote",
    "figcaption",
    "cite",
    "q",
    "address",
    "dd",
    "dt",
    "label",
    "summary",
];

/// How a single-element style is placed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompileOptions {
    /// Use smart apply instead of exact apply.
    pub smart_apply: bool,
}

impl CompileOptions {
    /// Exact apply.
    pub const EXACT: Self = Self { smart_apply: false };
    /// Smart apply.
    pub const SMART: Self = Self { smart_apply: true };
}

fn declaration(prop: TextProperty, value: &str) -> String {
    format!("{}: {value} !important", prop.css_name())
}

fn rule(selector: &str, declarations: &[String]) -> String {
    format!("{selector} {{ {}; }}", declarations.join("; "))
}

/// Enabled typography declarations of `properties`.
fn typography(properties: &PropertySet) -> Vec<String> {
    properties
        .enabled()
        .filter(|(prop, _)| !prop.is_identity())
        .map(|(prop, p)| declaration(prop, &p.value))
        .collect()
}

/// CSS for a single-element style applied to `selector`.
///
/// Under exact apply the result is always one rule, even when no property
/// is enabled (`sel { ; }`). Under smart apply a tier with nothing enabled
/// produces no rule, so the result may be empty.
#[must_use]
pub fn compile_single(selector: &str, properties: &PropertySet, options: CompileOptions) -> String {
    if !options.smart_apply {
        let declarations: Vec<String> = properties
            .enabled()
            .map(|(prop, p)| declaration(prop, &p.value))
            .collect();
        return rule(selector, &declarations);
    }

    let identity: Vec<String> = properties
        .enabled()
        .filter(|(prop, _)| prop.is_identity())
        .map(|(prop, p)| declaration(prop, &p.value))
        .collect();
    let typography = typography(properties);

    let mut rules = Vec::new();
    if !identity.is_empty() {
        rules.push(rule(selector, &identity));
        rules.push(rule(&format!("{selector} *"), &identity));
    }
    if !typography.is_empty() {
        let targets: Vec<String> = std::iter::once(selector.to_string())
            .chain(
                SMART_BODY_SELECTORS
                    .iter()
                    .map(|tag| format!("{selector} {tag}")),
            )
            .collect();
        rules.push(rule(&targets.join(",\n"), &typography));
    }
    rules.join("\n")
}

/// Identity declarations of an entry, skipping empty values.
fn identity_of(structure: &StructureMap, tag: StructureTag) -> Vec<String> {
    let Some(properties) = structure.get(&tag).and_then(|e| e.properties.as_ref()) else {
        return Vec::new();
    };
    TextProperty::IDENTITY
        .iter()
        .filter_map(|&prop| {
            properties
                .get(prop)
                .filter(|p| p.enabled && !p.value.is_empty())
                .map(|p| declaration(prop, &p.value))
        })
        .collect()
}

/// The nearest captured heading for a missing one: higher levels first
/// (`H3` looks at `H2`, then `H1`), then lower ones (`H4`..`H6`).
fn heading_fallback(structure: &StructureMap, missing: usize) -> Option<StructureTag> {
    let headings = StructureTag::HEADINGS;
    headings[..missing]
        .iter()
        .rev()
        .chain(headings[missing + 1..].iter())
        .copied()
        .find(|tag| structure.contains_key(tag))
}

/// CSS for an article style rooted at `base`.
///
/// 1. Identity properties from `P` (or `H1` when `P` has none) go on `base`
///    and `base *`.
/// 2. Every captured tag gets its typography under `base <tag>`.
/// 3. Every heading level that was not captured borrows the typography of
///    the nearest captured heading, see [`heading_fallback`].
/// 4. Uncaptured body text elements and all links get the typography of
///    `P`, in [`TextProperty::TYPOGRAPHY`] order.
///
/// Entries without properties are skipped.
#[must_use]
pub fn compile_article(base: &str, structure: &StructureMap) -> String {
    let mut rules = Vec::new();

    let mut identity = identity_of(structure, StructureTag::P);
    if identity.is_empty() {
        identity = identity_of(structure, StructureTag::H1);
    }
    if !identity.is_empty() {
        rules.push(rule(base, &identity));
        rules.push(rule(&format!("{base} *"), &identity));
    }

    for (tag, entry) in structure {
        let Some(properties) = &entry.properties else {
            warn_once(
                "Style Compiler",
                &format!("captured {tag} has no properties, skipping it"),
            );
            continue;
        };
        let declarations = typography(properties);
        if !declarations.is_empty() {
            rules.push(rule(&format!("{base} {}", tag.tag_name()), &declarations));
        }
    }

    for (level, heading) in StructureTag::HEADINGS.iter().enumerate() {
        if structure.contains_key(heading) {
            continue;
        }
        let Some(properties) = heading_fallback(structure, level)
            .and_then(|source| structure.get(&source))
            .and_then(|entry| entry.properties.as_ref())
        else {
            continue;
        };
        let declarations = typography(properties);
        if !declarations.is_empty() {
            rules.push(rule(&format!("{base} {}", heading.tag_name()), &declarations));
        }
    }

    if let Some(properties) = structure
        .get(&StructureTag::P)
        .and_then(|entry| entry.properties.as_ref())
    {
        let declarations: Vec<String> = TextProperty::TYPOGRAPHY
            .iter()
            .filter_map(|&prop| {
                properties
                    .get(prop)
                    .filter(|p| p.enabled && !p.value.is_empty())
                    .map(|p| declaration(prop, &p.value))
            })
            .collect();
        if !declarations.is_empty() {
            for element in BODY_TEXT_ELEMENTS {
                let captured = StructureTag::from_tag_name(element)
                    .is_some_and(|tag| structure.contains_key(&tag));
                if !captured {
                    rules.push(rule(&format!("{base} {element}"), &declarations));
                }
            }
            rules.push(rule(&format!("{base} a"), &declarations));
        }
    }

    rules.join("\n")
}
