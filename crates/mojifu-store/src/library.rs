use mojifu_common::warning::warn_once;
use mojifu_css::{CompileOptions, FontSheet, StructureTag, TextProperty};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::model::{AppliedRule, StyleRecord, UrlPattern};
use crate::storage::{APPLIED_RULES_KEY, SAVED_STYLES_KEY, Storage};
use crate::StoreError;

/// Name shown for a rule whose style was deleted.
pub const UNKNOWN_STYLE_NAME: &str = "Unknown";

/// An applied rule together with the name of its style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleView {
    /// The rule.
    pub rule: AppliedRule,
    /// The style's name, or [`UNKNOWN_STYLE_NAME`].
    pub style_name: String,
}

/// Result of [`StyleLibrary::apply_style`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// A new rule was stored.
    Applied(AppliedRule),
    /// The same style, selector and pattern were already applied.
    Duplicate,
}

/// The stylesheet content for one page, replaced wholesale whenever the
/// rules change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InjectedStyles {
    /// Rules of every applied style, oldest rule first.
    pub css: String,
    /// `@font-face` rules the styles need.
    pub font_css: String,
    /// Font stylesheets to link.
    pub font_links: Vec<String>,
}

impl InjectedStyles {
    /// True if there is nothing to inject.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.css.is_empty() && self.font_css.is_empty() && self.font_links.is_empty()
    }
}

/// A stored array: the entries that parsed, and the ones that did not.
///
/// Unreadable entries are written back unchanged after the readable ones,
/// so an edit never drops data this version cannot understand.
struct StoredList<T> {
    items: Vec<T>,
    unreadable: Vec<Value>,
}

/// Saved styles and applied rules on top of a [`Storage`].
#[derive(Debug)]
pub struct StyleLibrary<S: Storage> {
    storage: S,
}

impl<S: Storage> StyleLibrary<S> {
    /// A library over `storage`.
    pub const fn new(storage: S) -> Self {
        Self { storage }
    }

    /// The underlying storage.
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// The underlying storage, e.g. to subscribe to changes.
    pub const fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// Load the array stored under `key`. Elements that do not deserialize
    /// are set aside with a warning. A value that is not an array at all is
    /// kept as a single unreadable element.
    fn load_list<T: DeserializeOwned>(&self, key: &str) -> Result<StoredList<T>, StoreError> {
        let mut list = StoredList {
            items: Vec::new(),
            unreadable: Vec::new(),
        };
        let Some(value) = self.storage.get(key)? else {
            return Ok(list);
        };
        let Value::Array(entries) = value else {
            warn_once("Style Store", &format!("'{key}' is not an array, ignoring it"));
            list.unreadable.push(value);
            return Ok(list);
        };
        for entry in entries {
            match T::deserialize(&entry) {
                Ok(parsed) => list.items.push(parsed),
                Err(e) => {
                    warn_once("Style Store", &format!("skipping malformed entry in '{key}': {e}"));
                    list.unreadable.push(entry);
                }
            }
        }
        Ok(list)
    }

    fn store_list<T: Serialize>(&mut self, key: &str, list: StoredList<T>) -> Result<(), StoreError> {
        let json_error = |source| StoreError::Json {
            key: key.to_string(),
            source,
        };
        let mut entries = Vec::with_capacity(list.items.len() + list.unreadable.len());
        for item in &list.items {
            entries.push(serde_json::to_value(item).map_err(json_error)?);
        }
        entries.extend(list.unreadable);
        self.storage.set(key, Value::Array(entries))
    }

    /// Every saved style, in capture order.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be read.
    pub fn saved_styles(&self) -> Result<Vec<StyleRecord>, StoreError> {
        Ok(self.load_list(SAVED_STYLES_KEY)?.items)
    }

    /// The saved style with `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be read.
    pub fn find_style(&self, id: &str) -> Result<Option<StyleRecord>, StoreError> {
        Ok(self.saved_styles()?.into_iter().find(|style| style.id == id))
    }

    /// Append a newly captured style.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be read or written.
    pub fn save_style(&mut self, record: StyleRecord) -> Result<(), StoreError> {
        let mut styles = self.load_list(SAVED_STYLES_KEY)?;
        log::info!("saving style '{}' ({})", record.name, record.id);
        styles.items.push(record);
        self.store_list(SAVED_STYLES_KEY, styles)
    }

    /// Delete the style with `id`. Rules applying it stay and are skipped
    /// on replay. Returns false if there was no such style.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be read or written.
    pub fn delete_style(&mut self, id: &str) -> Result<bool, StoreError> {
        let mut styles = self.load_list::<StyleRecord>(SAVED_STYLES_KEY)?;
        let before = styles.items.len();
        styles.items.retain(|style| style.id != id);
        if styles.items.len() == before {
            return Ok(false);
        }
        self.store_list(SAVED_STYLES_KEY, styles)?;
        Ok(true)
    }

    /// Enable or disable one property of a saved style. `tag` selects the
    /// element type of an article style and is ignored for single styles.
    /// Returns false if the style or the property does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be read or written.
    pub fn set_property_enabled(
        &mut self,
        style_id: &str,
        tag: Option<StructureTag>,
        prop: TextProperty,
        enabled: bool,
    ) -> Result<bool, StoreError> {
        let mut styles = self.load_list::<StyleRecord>(SAVED_STYLES_KEY)?;
        let changed = styles
            .items
            .iter_mut()
            .find(|style| style.id == style_id)
            .is_some_and(|style| style.set_property_enabled(tag, prop, enabled));
        if changed {
            self.store_list(SAVED_STYLES_KEY, styles)?;
        }
        Ok(changed)
    }

    /// Every applied rule, most recent first.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be read.
    pub fn applied_rules(&self) -> Result<Vec<AppliedRule>, StoreError> {
        Ok(self.load_list(APPLIED_RULES_KEY)?.items)
    }

    /// Bind a style to `selector` on pages matching `url_pattern`.
    ///
    /// The new rule goes first, so it is replayed last and wins conflicts.
    /// Applying the same style to the same selector and pattern twice is a
    /// no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be read or written.
    pub fn apply_style(
        &mut self,
        style_id: &str,
        selector: &str,
        url_pattern: UrlPattern,
        options: CompileOptions,
    ) -> Result<ApplyOutcome, StoreError> {
        let mut rules = self.load_list::<AppliedRule>(APPLIED_RULES_KEY)?;
        let duplicate = rules.items.iter().any(|rule| {
            rule.style_id == style_id && rule.selector == selector && rule.url_pattern == url_pattern
        });
        if duplicate {
            log::info!("style {style_id} already applied to '{selector}' on {url_pattern}");
            return Ok(ApplyOutcome::Duplicate);
        }

        let rule = AppliedRule {
            id: uuid::Uuid::new_v4().simple().to_string(),
            style_id: style_id.to_string(),
            url_pattern,
            selector: selector.to_string(),
            options,
        };
        rules.items.insert(0, rule.clone());
        self.store_list(APPLIED_RULES_KEY, rules)?;
        Ok(ApplyOutcome::Applied(rule))
    }

    /// Delete the rule with `id`. Returns false if there was no such rule.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be read or written.
    pub fn remove_rule(&mut self, id: &str) -> Result<bool, StoreError> {
        let mut rules = self.load_list::<AppliedRule>(APPLIED_RULES_KEY)?;
        let before = rules.items.len();
        rules.items.retain(|rule| rule.id != id);
        if rules.items.len() == before {
            return Ok(false);
        }
        self.store_list(APPLIED_RULES_KEY, rules)?;
        Ok(true)
    }

    /// Every applied rule, most recent first, with the name of its style.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be read.
    pub fn rule_views(&self) -> Result<Vec<RuleView>, StoreError> {
        let styles = self.saved_styles()?;
        Ok(self
            .applied_rules()?
            .into_iter()
            .map(|rule| {
                let style_name = styles
                    .iter()
                    .find(|style| style.id == rule.style_id)
                    .map_or_else(|| UNKNOWN_STYLE_NAME.to_string(), |style| style.name.clone());
                RuleView { rule, style_name }
            })
            .collect())
    }

    /// The rules that apply to `url`, most recent first, with the names of
    /// their styles.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be read.
    pub fn rules_for_url(&self, url: &str) -> Result<Vec<RuleView>, StoreError> {
        let mut views = self.rule_views()?;
        views.retain(|view| view.rule.url_pattern.matches(url));
        Ok(views)
    }

    /// Everything to inject into the page at `url`.
    ///
    /// Matching rules are replayed oldest first, so with equal selectors
    /// the most recent rule's declarations come last. Rules whose style no
    /// longer exists are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be read.
    pub fn stylesheet_for_url(&self, url: &str) -> Result<InjectedStyles, StoreError> {
        let styles = self.saved_styles()?;
        let mut css = String::new();
        let mut fonts = FontSheet::new();

        let rules = self.applied_rules()?;
        for rule in rules.iter().rev().filter(|rule| rule.url_pattern.matches(url)) {
            let Some(style) = styles.iter().find(|style| style.id == rule.style_id) else {
                log::debug!("rule {} refers to missing style {}", rule.id, rule.style_id);
                continue;
            };
            if let Some(resources) = &style.font_resources {
                fonts.add_set(resources);
            }
            css.push_str(&style.compile(&rule.selector, rule.options));
            css.push('\n');
        }

        Ok(InjectedStyles {
            css,
            font_css: fonts.css,
            font_links: fonts.links,
        })
    }
}
