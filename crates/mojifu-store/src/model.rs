use std::fmt;

use mojifu_css::properties::deserialize_structure_map;
use mojifu_css::{
    CompileOptions, FontResourceSet, PropertySet, StructureMap, StructureTag, TextProperty,
    compile_article, compile_single,
};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Sample text of an article style.
pub const ARTICLE_SAMPLE_TEXT: &str = "Article Structure";

/// What a style record captured.
///
/// Written with a `type` tag. On load an `article` record needs
/// `structureStyles`; anything else with `properties` is read as a single
/// style, so records saved without a `type` still load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StyleKind {
    /// The style of one element.
    Single {
        /// The captured properties.
        properties: PropertySet,
        /// The text the style was captured from.
        #[serde(rename = "sampleText")]
        sample_text: String,
    },
    /// The styles of the headings and paragraphs of an article.
    Article {
        /// Per-tag styles.
        #[serde(rename = "structureStyles")]
        structure: StructureMap,
        /// Display text for the record.
        #[serde(rename = "sampleText")]
        sample_text: String,
    },
}

impl<'de> Deserialize<'de> for StyleKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::Error;

        let value = Value::deserialize(deserializer)?;
        let sample_text = value
            .get("sampleText")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        if value.get("type").and_then(Value::as_str) == Some("article")
            && let Some(structure) = value.get("structureStyles")
        {
            let structure = deserialize_structure_map(structure).map_err(D::Error::custom)?;
            return Ok(Self::Article {
                structure,
                sample_text,
            });
        }
        let Some(properties) = value.get("properties") else {
            return Err(D::Error::custom(
                "style record has neither properties nor structureStyles",
            ));
        };
        let properties = PropertySet::deserialize(properties).map_err(D::Error::custom)?;
        Ok(Self::Single {
            properties,
            sample_text,
        })
    }
}

/// A saved style.
///
/// Created by a capture. Afterwards only the `enabled` flags of its
/// properties change, through user edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleRecord {
    /// Unique id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Page the style was captured on.
    #[serde(default)]
    pub source_url: String,
    /// Capture time, milliseconds since the Unix epoch.
    #[serde(default)]
    pub created_at: u64,
    /// Single-element or article body.
    #[serde(flatten)]
    pub kind: StyleKind,
    /// Fonts the style needs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_resources: Option<FontResourceSet>,
}

impl StyleRecord {
    /// True for article styles.
    #[must_use]
    pub const fn is_article(&self) -> bool {
        matches!(self.kind, StyleKind::Article { .. })
    }

    /// The sample text shown with the style.
    #[must_use]
    pub fn sample_text(&self) -> &str {
        match &self.kind {
            StyleKind::Single { sample_text, .. } | StyleKind::Article { sample_text, .. } => {
                sample_text
            }
        }
    }

    /// CSS that applies this style to `selector`. Article styles ignore
    /// `options`.
    #[must_use]
    pub fn compile(&self, selector: &str, options: CompileOptions) -> String {
        match &self.kind {
            StyleKind::Single { properties, .. } => compile_single(selector, properties, options),
            StyleKind::Article { structure, .. } => compile_article(selector, structure),
        }
    }

    /// The property set a user edit targets: the record's own for single
    /// styles, the one of `tag` for article styles.
    pub fn properties_mut(&mut self, tag: Option<StructureTag>) -> Option<&mut PropertySet> {
        match (&mut self.kind, tag) {
            (StyleKind::Single { properties, .. }, _) => Some(properties),
            (StyleKind::Article { structure, .. }, Some(tag)) => {
                structure.get_mut(&tag).and_then(|entry| entry.properties.as_mut())
            }
            (StyleKind::Article { .. }, None) => None,
        }
    }

    /// Enable or disable one captured property. Returns false if there is
    /// no such property to toggle.
    pub fn set_property_enabled(
        &mut self,
        tag: Option<StructureTag>,
        prop: TextProperty,
        enabled: bool,
    ) -> bool {
        self.properties_mut(tag)
            .is_some_and(|properties| properties.set_enabled(prop, enabled))
    }
}

/// Which pages a rule applies to: an exact URL, or a prefix followed by `*`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UrlPattern(String);

impl UrlPattern {
    /// Wrap a pattern string.
    #[must_use]
    pub fn new(pattern: impl Into<String>) -> Self {
        Self(pattern.into())
    }

    /// The pattern text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Does `url` fall under this pattern?
    #[must_use]
    pub fn matches(&self, url: &str) -> bool {
        match self.0.strip_suffix('*') {
            Some(prefix) => url.starts_with(prefix),
            None => url == self.0,
        }
    }
}

impl fmt::Display for UrlPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A style bound to a selector on the pages matching a URL pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedRule {
    /// Unique id.
    pub id: String,
    /// The [`StyleRecord::id`] it applies.
    pub style_id: String,
    /// Pages it applies to.
    pub url_pattern: UrlPattern,
    /// Elements it applies to.
    pub selector: String,
    /// How a single-element style is placed.
    #[serde(default)]
    pub options: CompileOptions,
}
