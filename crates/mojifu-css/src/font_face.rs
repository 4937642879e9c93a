//! Web font resources captured alongside a style, and the
//! [`@font-face`](https://www.w3.org/TR/css-fonts-4/#font-face-rule) rules
//! that make them available again on another page.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use url::Url;

static FONT_EXTENSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\.(woff2?|ttf|otf|eot|svg)$").expect("FONT_EXTENSION_RE should compile")
});
static FONT_SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[-_](regular|bold|italic|light|medium|semibold|thin|black|condensed)")
        .expect("FONT_SUFFIX_RE should compile")
});

/// Keys that mark a per-tag bundle map (article styles) rather than a single
/// bundle.
const PER_TAG_KEYS: [&str; 9] = ["H1", "H2", "H3", "H4", "H5", "H6", "P", "BLOCKQUOTE", "LI"];

/// A font face as described by a page's stylesheet or by the
/// [`FontFace`](https://www.w3.org/TR/css-font-loading-3/#fontface-interface)
/// objects it loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FontFaceDescriptor {
    /// `font-family` name, unquoted.
    pub family: String,
    /// `font-weight` descriptor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<String>,
    /// `font-style` descriptor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    /// `font-stretch` descriptor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stretch: Option<String>,
    /// `unicode-range` descriptor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unicode_range: Option<String>,
    /// Source URLs from `src`, in declaration order.
    pub sources: Vec<String>,
}

/// A font file that was downloaded at capture time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CapturedFont {
    /// Where the file came from.
    pub url: String,
    /// The file contents as a `data:` URL, if the download succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_url: Option<String>,
}

/// Everything needed to load the fonts a style refers to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FontResources {
    /// `<link rel=stylesheet>` hrefs of Google Fonts.
    pub google_fonts_links: Vec<String>,
    /// `@font-face` rules copied verbatim from readable stylesheets.
    pub font_face_rules: Vec<String>,
    /// Descriptors of `@font-face` rules the page declared.
    pub font_face_entries: Vec<FontFaceDescriptor>,
    /// Descriptors of fonts the page loaded through the Font Loading API.
    pub loaded_fonts: Vec<FontFaceDescriptor>,
    /// Downloaded font files.
    pub captured_fonts: Vec<CapturedFont>,
    /// Font file URLs seen in stylesheets.
    pub font_urls: Vec<String>,
}

/// Font resources of a style record: one bundle for a single-element style,
/// one per captured tag for an article style.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FontResourceSet {
    /// Bundle of a single-element style.
    Single(FontResources),
    /// Bundles of an article style, keyed by tag name.
    PerTag(BTreeMap<String, FontResources>),
}

impl FontResourceSet {
    /// Every bundle in the set.
    #[must_use]
    pub fn bundles(&self) -> Vec<&FontResources> {
        match self {
            Self::Single(resources) => vec![resources],
            Self::PerTag(by_tag) => by_tag.values().collect(),
        }
    }
}

impl<'de> Deserialize<'de> for FontResourceSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::Error;

        let value = serde_json::Value::deserialize(deserializer)?;
        let per_tag = value
            .as_object()
            .is_some_and(|map| map.keys().any(|key| PER_TAG_KEYS.contains(&key.as_str())));
        if per_tag {
            serde_json::from_value(value).map(Self::PerTag).map_err(D::Error::custom)
        } else {
            serde_json::from_value(value).map(Self::Single).map_err(D::Error::custom)
        }
    }
}

/// A fully resolved face, ready to be written as a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontFace {
    /// `font-family`
    pub family: String,
    /// `font-weight`
    pub weight: String,
    /// `font-style`
    pub style: String,
    /// `font-stretch`
    pub stretch: String,
    /// `unicode-range`, omitted from the rule when `None`.
    pub unicode_range: Option<String>,
}

/// An `@font-face` rule for `font` loading from `source_url` (a regular or a
/// `data:` URL).
#[must_use]
pub fn generate_font_face_rule(font: &FontFace, source_url: &str) -> String {
    let mut rule = format!(
        "@font-face {{\n  font-family: \"{}\";\n  font-weight: {};\n  font-style: {};\n  font-stretch: {};\n  src: url(\"{source_url}\");\n",
        font.family, font.weight, font.style, font.stretch
    );
    if let Some(range) = &font.unicode_range {
        rule.push_str(&format!("  unicode-range: {range};\n"));
    }
    rule.push('}');
    rule
}

/// True if `existing` already declares a face with the same family, weight
/// and style.
#[must_use]
pub fn has_font_face_rule(existing: &str, font: &FontFace) -> bool {
    existing.contains(&format!("font-family: \"{}\"", font.family))
        && existing.contains(&format!("font-weight: {}", font.weight))
        && existing.contains(&format!("font-style: {}", font.style))
}

/// Rules for every usable descriptor.
///
/// A descriptor needs a family and at least one source. Its first source is
/// used unless one of its sources was captured, in which case the captured
/// data URL wins. Missing weight, style and stretch default to `normal`,
/// a missing unicode range to `U+0-10FFFF`. Descriptors that resolve to the
/// same family, weight, style and source are emitted once, and faces
/// already declared in `existing` (or earlier in the result) are skipped.
#[must_use]
pub fn build_font_face_rules(
    descriptors: &[FontFaceDescriptor],
    captured: &[CapturedFont],
    existing: &str,
) -> Vec<String> {
    let captured_by_url: HashMap<&str, &str> = captured
        .iter()
        .filter_map(|font| font.data_url.as_deref().map(|data| (font.url.as_str(), data)))
        .collect();
    let mut seen = HashSet::new();
    let mut rules: Vec<String> = Vec::new();

    for descriptor in descriptors {
        if descriptor.family.is_empty() {
            continue;
        }
        let Some(first) = descriptor.sources.first() else {
            continue;
        };
        let source = descriptor
            .sources
            .iter()
            .find_map(|src| captured_by_url.get(src.as_str()).copied())
            .unwrap_or(first.as_str());

        let font = FontFace {
            family: descriptor.family.clone(),
            weight: descriptor.weight.clone().unwrap_or_else(|| "normal".to_string()),
            style: descriptor.style.clone().unwrap_or_else(|| "normal".to_string()),
            stretch: descriptor.stretch.clone().unwrap_or_else(|| "normal".to_string()),
            unicode_range: Some(
                descriptor
                    .unicode_range
                    .clone()
                    .unwrap_or_else(|| "U+0-10FFFF".to_string()),
            ),
        };

        let key = format!("{}|{}|{}|{source}", font.family, font.weight, font.style);
        if !seen.insert(key) {
            continue;
        }

        let known = format!("{existing}{}", rules.join("\n"));
        if !has_font_face_rule(&known, &font) {
            rules.push(generate_font_face_rule(&font, source));
        }
    }
    rules
}

/// Guess a family name from a font file URL:
/// `https://x/fonts/Inter-Bold.woff2` gives `Inter Bold`.
#[must_use]
pub fn font_name_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let file = parsed.path_segments()?.next_back()?;
    let stem = FONT_EXTENSION_RE.replace(file, "");
    let name = FONT_SUFFIX_RE.replace_all(&stem, " $1");
    let name = name.trim();
    (!name.is_empty()).then(|| name.to_string())
}

/// Font CSS collected from any number of bundles.
///
/// Mirrors what a page would hold after the bundles were injected one after
/// another: stylesheet links plus one block of `@font-face` rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FontSheet {
    /// Stylesheet hrefs, without duplicates, in first-seen order.
    pub links: Vec<String>,
    /// `@font-face` rules, newline separated.
    pub css: String,
}

impl FontSheet {
    /// An empty sheet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn append(&mut self, rule: &str) {
        self.css.push('\n');
        self.css.push_str(rule);
    }

    /// Add the fonts of a style record.
    pub fn add_set(&mut self, set: &FontResourceSet) {
        let bundles = set.bundles();
        let mut merged = FontResources::default();
        for bundle in bundles {
            merged.google_fonts_links.extend(bundle.google_fonts_links.iter().cloned());
            merged.font_face_rules.extend(bundle.font_face_rules.iter().cloned());
            merged.font_face_entries.extend(bundle.font_face_entries.iter().cloned());
            merged.loaded_fonts.extend(bundle.loaded_fonts.iter().cloned());
            merged.captured_fonts.extend(bundle.captured_fonts.iter().cloned());
            merged.font_urls.extend(bundle.font_urls.iter().cloned());
        }
        self.add(&merged);
    }

    /// Add one bundle.
    ///
    /// Copied rules are added unless already present. Rules are then built
    /// from the descriptors. A bundle that has nothing but bare font URLs
    /// gets a minimal rule per URL, named by [`font_name_from_url`].
    pub fn add(&mut self, resources: &FontResources) {
        for link in &resources.google_fonts_links {
            if !self.links.contains(link) {
                self.links.push(link.clone());
            }
        }

        for rule in &resources.font_face_rules {
            if !self.css.contains(rule.as_str()) {
                self.append(rule);
            }
        }

        let descriptors: Vec<FontFaceDescriptor> = resources
            .font_face_entries
            .iter()
            .chain(&resources.loaded_fonts)
            .cloned()
            .collect();
        let generated = build_font_face_rules(&descriptors, &resources.captured_fonts, &self.css);
        if !generated.is_empty() {
            self.append(&generated.join("\n"));
        }

        let only_urls = resources.font_face_rules.is_empty()
            && resources.loaded_fonts.is_empty()
            && resources.font_face_entries.is_empty();
        if only_urls {
            for url in &resources.font_urls {
                let Some(name) = font_name_from_url(url) else {
                    continue;
                };
                if !self.css.contains(url.as_str()) {
                    self.append(&format!(
                        "@font-face {{\n  font-family: \"{name}\";\n  src: url(\"{url}\");\n}}"
                    ));
                }
            }
        }
    }

    /// True if nothing was collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.links.is_empty() && self.css.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_name_from_url() {
        assert_eq!(
            font_name_from_url("https://cdn.example.com/fonts/Inter-Bold.woff2").as_deref(),
            Some("Inter Bold")
        );
        assert_eq!(
            font_name_from_url("https://cdn.example.com/Lora_italic.TTF?v=2").as_deref(),
            Some("Lora italic")
        );
        assert_eq!(font_name_from_url("https://cdn.example.com/"), None);
        assert_eq!(font_name_from_url("not a url"), None);
    }

    #[test]
    fn test_has_font_face_rule_needs_all_three() {
        let font = FontFace {
            family: "Lora".to_string(),
            weight: "700".to_string(),
            style: "normal".to_string(),
            stretch: "normal".to_string(),
            unicode_range: None,
        };
        let rule = generate_font_face_rule(&font, "https://x/lora.woff2");
        assert!(has_font_face_rule(&rule, &font));
        let lighter = FontFace {
            weight: "400".to_string(),
            ..font
        };
        assert!(!has_font_face_rule(&rule, &lighter));
    }
}
