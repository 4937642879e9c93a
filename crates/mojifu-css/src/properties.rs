//! The captured text style model.
//!
//! A style is a handful of text properties read from
//! [`getComputedStyle()`](https://drafts.csswg.org/cssom/#dom-window-getcomputedstyle).
//! The set of properties is closed: [`TextProperty`] names all of them, and a
//! [`PropertySet`] has exactly one slot per property.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use mojifu_common::warning::warn_once;
use serde::de::{IgnoredAny, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum::{EnumCount, IntoEnumIterator};
use strum_macros::{Display, EnumCount as EnumCountMacro, EnumIter, EnumString, IntoStaticStr};

/// A text property that can be captured and re-applied.
///
/// Variants are declared in capture order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
    EnumCountMacro,
)]
#[strum(serialize_all = "camelCase")]
pub enum TextProperty {
    /// [§ 5.1 font-family](https://www.w3.org/TR/css-fonts-4/#font-family-prop)
    FontFamily,
    /// [§ 2.5 font-size](https://www.w3.org/TR/css-fonts-4/#font-size-prop)
    FontSize,
    /// [§ 2.2 font-weight](https://www.w3.org/TR/css-fonts-4/#font-weight-prop)
    FontWeight,
    /// [§ 2.4 font-style](https://www.w3.org/TR/css-fonts-4/#font-style-prop)
    FontStyle,
    /// [§ 3.1 color](https://www.w3.org/TR/css-color-4/#the-color-property)
    Color,
    /// [CSS 2.1 § 10.8.1 line-height](https://www.w3.org/TR/CSS2/visudet.html#propdef-line-height)
    LineHeight,
    /// [§ 8.2 letter-spacing](https://www.w3.org/TR/css-text-3/#letter-spacing-property)
    LetterSpacing,
    /// [§ 3 text-decoration](https://www.w3.org/TR/css-text-decor-3/#text-decoration-property)
    TextDecoration,
    /// [§ 2.1 text-transform](https://www.w3.org/TR/css-text-3/#text-transform-property)
    TextTransform,
    /// [§ 4 text-shadow](https://www.w3.org/TR/css-text-decor-3/#text-shadow-property)
    TextShadow,
}

impl TextProperty {
    /// The properties that define a text's look regardless of its role:
    /// they apply to a container and every descendant.
    pub const IDENTITY: [Self; 3] = [Self::FontFamily, Self::Color, Self::TextShadow];

    /// Everything that is not identity, in the order paragraph typography
    /// is handed down to uncaptured body text.
    pub const TYPOGRAPHY: [Self; 7] = [
        Self::FontSize,
        Self::LineHeight,
        Self::FontWeight,
        Self::LetterSpacing,
        Self::FontStyle,
        Self::TextDecoration,
        Self::TextTransform,
    ];

    /// The storage key, e.g. `fontSize`.
    #[must_use]
    pub fn key(self) -> &'static str {
        self.into()
    }

    /// The CSS property name, e.g. `font-size`.
    #[must_use]
    pub const fn css_name(self) -> &'static str {
        match self {
            Self::FontFamily => "font-family",
            Self::FontSize => "font-size",
            Self::FontWeight => "font-weight",
            Self::FontStyle => "font-style",
            Self::Color => "color",
            Self::LineHeight => "line-height",
            Self::LetterSpacing => "letter-spacing",
            Self::TextDecoration => "text-decoration",
            Self::TextTransform => "text-transform",
            Self::TextShadow => "text-shadow",
        }
    }

    /// Look up a property by storage key.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::from_str(key).ok()
    }

    /// Look up a property by CSS name.
    #[must_use]
    pub fn from_css_name(name: &str) -> Option<Self> {
        Self::iter().find(|prop| prop.css_name() == name)
    }

    /// True for identity properties (`font-family`, `color`, `text-shadow`).
    /// Everything else is typography.
    #[must_use]
    pub fn is_identity(self) -> bool {
        Self::IDENTITY.contains(&self)
    }
}

/// One captured property value and whether it is applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleProperty {
    /// The computed value, passed through to CSS as is.
    pub value: String,
    /// Disabled properties are kept but never emitted.
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

const fn enabled_by_default() -> bool {
    true
}

impl StyleProperty {
    /// An enabled property.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            enabled: true,
        }
    }
}

/// One optional [`StyleProperty`] per [`TextProperty`].
///
/// Entries iterate in the order they were first inserted, which is the
/// order declarations are emitted in. Serialized as a JSON object keyed by
/// [`TextProperty::key`], in that order. Keys that name no known property
/// are dropped on load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertySet {
    slots: [Option<StyleProperty>; TextProperty::COUNT],
    order: Vec<TextProperty>,
}

impl PropertySet {
    /// An empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`PropertySet::insert`] for an enabled value.
    #[must_use]
    pub fn with(mut self, prop: TextProperty, value: impl Into<String>) -> Self {
        self.insert(prop, StyleProperty::new(value));
        self
    }

    /// Builder form of [`PropertySet::insert`] for a disabled value.
    #[must_use]
    pub fn with_disabled(mut self, prop: TextProperty, value: impl Into<String>) -> Self {
        self.insert(
            prop,
            StyleProperty {
                value: value.into(),
                enabled: false,
            },
        );
        self
    }

    /// The entry for `prop`, if captured.
    #[must_use]
    pub fn get(&self, prop: TextProperty) -> Option<&StyleProperty> {
        self.slots[prop as usize].as_ref()
    }

    /// Set the entry for `prop`. A replaced entry keeps its position.
    pub fn insert(&mut self, prop: TextProperty, property: StyleProperty) {
        if self.slots[prop as usize].replace(property).is_none() {
            self.order.push(prop);
        }
    }

    /// Clear the entry for `prop`, returning it.
    pub fn remove(&mut self, prop: TextProperty) -> Option<StyleProperty> {
        let removed = self.slots[prop as usize].take();
        if removed.is_some() {
            self.order.retain(|&p| p != prop);
        }
        removed
    }

    /// Flip the `enabled` flag of `prop`. Returns false if `prop` was never
    /// captured.
    pub fn set_enabled(&mut self, prop: TextProperty, enabled: bool) -> bool {
        match self.slots[prop as usize].as_mut() {
            Some(property) => {
                property.enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// Captured entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (TextProperty, &StyleProperty)> {
        self.order
            .iter()
            .filter_map(|&prop| self.get(prop).map(|p| (prop, p)))
    }

    /// Enabled entries in insertion order.
    pub fn enabled(&self) -> impl Iterator<Item = (TextProperty, &StyleProperty)> {
        self.iter().filter(|(_, p)| p.enabled)
    }

    /// Number of captured entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True if nothing was captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl Serialize for PropertySet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (prop, property) in self.iter() {
            map.serialize_entry(prop.key(), property)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for PropertySet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PropertySetVisitor;

        impl<'de> Visitor<'de> for PropertySetVisitor {
            type Value = PropertySet;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of text property keys to {value, enabled}")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<PropertySet, A::Error> {
                let mut set = PropertySet::new();
                while let Some(key) = map.next_key::<String>()? {
                    if let Some(prop) = TextProperty::from_key(&key) {
                        set.insert(prop, map.next_value()?);
                    } else {
                        warn_once("Style Model", &format!("unknown property '{key}' ignored"));
                        let _: IgnoredAny = map.next_value()?;
                    }
                }
                Ok(set)
            }
        }

        deserializer.deserialize_map(PropertySetVisitor)
    }
}

/// An element type captured by an article style.
///
/// Ordered `H1` through `H6`, then `P`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter, EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum StructureTag {
    /// `<h1>`
    H1,
    /// `<h2>`
    H2,
    /// `<h3>`
    H3,
    /// `<h4>`
    H4,
    /// `<h5>`
    H5,
    /// `<h6>`
    H6,
    /// `<p>`
    P,
}

impl StructureTag {
    /// The heading tags, highest level first.
    pub const HEADINGS: [Self; 6] = [Self::H1, Self::H2, Self::H3, Self::H4, Self::H5, Self::H6];

    /// Lowercase HTML tag name.
    #[must_use]
    pub const fn tag_name(self) -> &'static str {
        match self {
            Self::H1 => "h1",
            Self::H2 => "h2",
            Self::H3 => "h3",
            Self::H4 => "h4",
            Self::H5 => "h5",
            Self::H6 => "h6",
            Self::P => "p",
        }
    }

    /// Map an HTML tag name (any case) to a structure tag.
    #[must_use]
    pub fn from_tag_name(name: &str) -> Option<Self> {
        Self::from_str(name).ok()
    }

    /// True for `H1` through `H6`.
    #[must_use]
    pub const fn is_heading(self) -> bool {
        !matches!(self, Self::P)
    }
}

impl Serialize for StructureTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for StructureTag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Self::from_tag_name(&name)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown structure tag '{name}'")))
    }
}

/// The captured style of one element type within an article.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureEntry {
    /// Missing in malformed records; such entries contribute no rules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<PropertySet>,
    /// A snippet of the element's text, shown next to the style.
    #[serde(default)]
    pub sample_text: String,
}

impl StructureEntry {
    /// An entry with properties.
    #[must_use]
    pub fn new(properties: PropertySet, sample_text: impl Into<String>) -> Self {
        Self {
            properties: Some(properties),
            sample_text: sample_text.into(),
        }
    }
}

/// Per-tag styles of an article.
pub type StructureMap = BTreeMap<StructureTag, StructureEntry>;

/// Deserialize a [`StructureMap`], dropping entries whose key is not one of
/// `H1`..`H6`/`P` instead of failing the whole record.
///
/// For use with `#[serde(deserialize_with = ...)]`.
///
/// # Errors
///
/// Returns the deserializer's error if the input is not a map or an entry
/// is not a valid [`StructureEntry`].
pub fn deserialize_structure_map<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<StructureMap, D::Error> {
    struct StructureMapVisitor;

    impl<'de> Visitor<'de> for StructureMapVisitor {
        type Value = StructureMap;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of tag names to structure entries")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<StructureMap, A::Error> {
            let mut structure = StructureMap::new();
            while let Some(key) = map.next_key::<String>()? {
                if let Some(tag) = StructureTag::from_tag_name(&key) {
                    let _ = structure.insert(tag, map.next_value()?);
                } else {
                    warn_once("Style Model", &format!("unsupported structure tag '{key}' ignored"));
                    let _: IgnoredAny = map.next_value()?;
                }
            }
            Ok(structure)
        }
    }

    deserializer.deserialize_map(StructureMapVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_table_round_trips() {
        for prop in TextProperty::iter() {
            assert_eq!(TextProperty::from_key(prop.key()), Some(prop));
            assert_eq!(TextProperty::from_css_name(prop.css_name()), Some(prop));
        }
        assert_eq!(TextProperty::LetterSpacing.key(), "letterSpacing");
        assert_eq!(TextProperty::from_key("font-size"), None);
    }

    #[test]
    fn test_identity_split() {
        let identity: Vec<_> = TextProperty::iter().filter(|p| p.is_identity()).collect();
        assert_eq!(identity, TextProperty::IDENTITY);
        assert_eq!(TextProperty::iter().filter(|p| !p.is_identity()).count(), 7);
    }

    #[test]
    fn test_property_set_keeps_insertion_order() {
        let mut set = PropertySet::new()
            .with(TextProperty::FontSize, "18px")
            .with(TextProperty::FontFamily, "Lora")
            .with(TextProperty::Color, "#111");
        set.insert(TextProperty::FontSize, StyleProperty::new("20px"));
        let keys: Vec<_> = set.iter().map(|(prop, _)| prop).collect();
        assert_eq!(
            keys,
            [TextProperty::FontSize, TextProperty::FontFamily, TextProperty::Color]
        );

        let _ = set.remove(TextProperty::FontFamily);
        set.insert(TextProperty::FontFamily, StyleProperty::new("Lora"));
        let keys: Vec<_> = set.iter().map(|(prop, _)| prop).collect();
        assert_eq!(
            keys,
            [TextProperty::FontSize, TextProperty::Color, TextProperty::FontFamily]
        );

        let loaded: PropertySet = serde_json::from_str(
            r#"{"lineHeight": {"value": "1.5"}, "fontFamily": {"value": "Lora"}}"#,
        )
        .unwrap();
        let keys: Vec<_> = loaded.iter().map(|(prop, _)| prop).collect();
        assert_eq!(keys, [TextProperty::LineHeight, TextProperty::FontFamily]);
    }

    #[test]
    fn test_structure_tag_accepts_either_case() {
        assert_eq!(StructureTag::from_tag_name("h2"), Some(StructureTag::H2));
        assert_eq!(StructureTag::from_tag_name("P"), Some(StructureTag::P));
        assert_eq!(StructureTag::from_tag_name("li"), None);
        assert_eq!(StructureTag::H3.to_string(), "H3");
    }
}
