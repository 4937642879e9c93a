//! The apply workflow for one page: picking elements, quick apply, and the
//! stylesheet to inject.

use mojifu_css::{CompileOptions, StructureTag};
use mojifu_dom::{BoxGeometry, DomTree, NodeId};
use mojifu_locator::{get_selector, locate};
use mojifu_store::{
    ApplyOutcome, InjectedStyles, Storage, StoreError, StyleLibrary, StyleRecord, UrlPattern,
};
use url::{Origin, Url};

use crate::capture::{CaptureError, ComputedStyleSource, capture_article, capture_selection};

/// Errors from a [`Session`].
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Quick apply found no article on the page.
    #[error("no article content found on this page")]
    NoArticle,
    /// Capturing a style failed.
    #[error(transparent)]
    Capture(#[from] CaptureError),
    /// No saved style has this id.
    #[error("no saved style with id '{0}'")]
    UnknownStyle(String),
    /// [`Session::pick`] was called outside picker mode.
    #[error("the element picker is not active")]
    PickerInactive,
    /// The page URL does not parse.
    #[error("invalid page URL '{url}': {source}")]
    InvalidUrl {
        /// The offending URL.
        url: String,
        /// Why it did not parse.
        source: url::ParseError,
    },
    /// The store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Which placement a picked element gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplyPolicy {
    /// Options for picked headings (`h1`..`h6`).
    pub headings: CompileOptions,
    /// Options for every other picked element.
    pub elements: CompileOptions,
}

impl Default for ApplyPolicy {
    /// Smart apply keeps nested markup intact. Headings get exact apply so a
    /// style can force its size onto them.
    fn default() -> Self {
        Self {
            headings: CompileOptions::EXACT,
            elements: CompileOptions::SMART,
        }
    }
}

impl ApplyPolicy {
    /// Options for an element with tag name `tag`.
    #[must_use]
    pub fn options_for(&self, tag: &str) -> CompileOptions {
        if StructureTag::from_tag_name(tag).is_some_and(StructureTag::is_heading) {
            self.headings
        } else {
            self.elements
        }
    }
}

/// `scheme://host[:port]`, also for URLs without a tuple origin such as
/// `file:` URLs.
fn origin_of(url: &Url) -> String {
    match url.origin() {
        origin @ Origin::Tuple(..) => origin.ascii_serialization(),
        Origin::Opaque(_) => format!("{}://{}", url.scheme(), url.host_str().unwrap_or_default()),
    }
}

fn parse_url(url: &str) -> Result<Url, SessionError> {
    Url::parse(url).map_err(|source| SessionError::InvalidUrl {
        url: url.to_string(),
        source,
    })
}

/// One page's interaction with the style library.
///
/// Holds the picker state explicitly: at most one style waits for an
/// element at a time.
#[derive(Debug)]
pub struct Session<S: Storage> {
    library: StyleLibrary<S>,
    policy: ApplyPolicy,
    pending_style: Option<String>,
}

impl<S: Storage> Session<S> {
    /// A session over `library` with the default [`ApplyPolicy`].
    pub fn new(library: StyleLibrary<S>) -> Self {
        Self {
            library,
            policy: ApplyPolicy::default(),
            pending_style: None,
        }
    }

    /// Replace the apply policy.
    #[must_use]
    pub const fn with_policy(mut self, policy: ApplyPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The style library.
    pub const fn library(&self) -> &StyleLibrary<S> {
        &self.library
    }

    /// The style library, for edits.
    pub const fn library_mut(&mut self) -> &mut StyleLibrary<S> {
        &mut self.library
    }

    /// The style waiting for an element, if the picker is active.
    #[must_use]
    pub fn pending_style(&self) -> Option<&str> {
        self.pending_style.as_deref()
    }

    /// Capture the element holding a selection and save it.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn collect_selection(
        &mut self,
        tree: &DomTree,
        node: NodeId,
        selected_text: &str,
        url: &str,
        source: &dyn ComputedStyleSource,
    ) -> Result<StyleRecord, SessionError> {
        let record = capture_selection(tree, node, selected_text, url, source);
        self.library.save_style(record.clone())?;
        Ok(record)
    }

    /// Capture the page's article structure and save it.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Capture`] if there is nothing to capture, or
    /// an error if the store fails.
    pub fn collect_article(
        &mut self,
        tree: &DomTree,
        geometry: &dyn BoxGeometry,
        url: &str,
        source: &dyn ComputedStyleSource,
    ) -> Result<StyleRecord, SessionError> {
        let record = capture_article(tree, geometry, url, source)?;
        self.library.save_style(record.clone())?;
        Ok(record)
    }

    /// Wait for an element to apply `style_id` to.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::UnknownStyle`] if no such style is saved.
    pub fn enter_picker(&mut self, style_id: &str) -> Result<(), SessionError> {
        if self.library.find_style(style_id)?.is_none() {
            return Err(SessionError::UnknownStyle(style_id.to_string()));
        }
        log::debug!("picker active for style {style_id}");
        self.pending_style = Some(style_id.to_string());
        Ok(())
    }

    /// Leave picker mode without applying anything.
    pub fn exit_picker(&mut self) {
        self.pending_style = None;
    }

    /// Apply the pending style to `node` on the page at `url`.
    ///
    /// The rule covers every URL starting with the page's origin and path.
    /// Picker mode ends whether a rule was stored or it was a duplicate.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::PickerInactive`] outside picker mode and
    /// [`SessionError::InvalidUrl`] for an unparsable `url`, both leaving
    /// the picker state unchanged. Store failures are passed on.
    pub fn pick(
        &mut self,
        tree: &DomTree,
        node: NodeId,
        url: &str,
    ) -> Result<ApplyOutcome, SessionError> {
        let style_id = self
            .pending_style
            .clone()
            .ok_or(SessionError::PickerInactive)?;
        let page = parse_url(url)?;

        let selector = get_selector(tree, node);
        let pattern = UrlPattern::new(format!("{}{}*", origin_of(&page), page.path()));
        let options = self.policy.options_for(tree.tag_name(node).unwrap_or_default());

        let outcome = self
            .library
            .apply_style(&style_id, &selector, pattern, options)?;
        self.exit_picker();
        Ok(outcome)
    }

    /// Apply `style_id` to the page's main article, on every page of the
    /// site.
    ///
    /// Article styles keep their own per-tag placement; single styles use
    /// smart apply on the article container.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoArticle`] when the locator finds nothing,
    /// [`SessionError::UnknownStyle`] for a style that is not saved and
    /// [`SessionError::InvalidUrl`] for an unparsable `url`.
    pub fn quick_apply(
        &mut self,
        style_id: &str,
        tree: &DomTree,
        geometry: &dyn BoxGeometry,
        url: &str,
    ) -> Result<ApplyOutcome, SessionError> {
        let page = parse_url(url)?;
        let article = locate(tree, geometry).ok_or(SessionError::NoArticle)?;
        let style = self
            .library
            .find_style(style_id)?
            .ok_or_else(|| SessionError::UnknownStyle(style_id.to_string()))?;

        let selector = get_selector(tree, article.node);
        let pattern = UrlPattern::new(format!("{}/*", origin_of(&page)));
        let options = if style.is_article() {
            CompileOptions::default()
        } else {
            CompileOptions::SMART
        };
        log::info!(
            "quick apply of '{}' to '{selector}' ({} tier)",
            style.name,
            article.tier
        );
        Ok(self
            .library
            .apply_style(style_id, &selector, pattern, options)?)
    }

    /// The styles to inject into the page at `url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn applied_stylesheet(&self, url: &str) -> Result<InjectedStyles, SessionError> {
        Ok(self.library.stylesheet_for_url(url)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_of() {
        let url = Url::parse("https://www.example.com:8443/a/b?q=1").unwrap();
        assert_eq!(origin_of(&url), "https://www.example.com:8443");
        let file = Url::parse("file:///tmp/page.html").unwrap();
        assert_eq!(origin_of(&file), "file://");
    }

    #[test]
    fn test_default_policy() {
        let policy = ApplyPolicy::default();
        assert_eq!(policy.options_for("h2"), CompileOptions::EXACT);
        assert_eq!(policy.options_for("p"), CompileOptions::SMART);
        assert_eq!(policy.options_for("div"), CompileOptions::SMART);
    }
}
