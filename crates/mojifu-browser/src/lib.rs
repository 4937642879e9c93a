//! High-level API for MojiFu.
//!
//! # Scope
//!
//! This crate provides:
//! - **Document Loading** - read and parse HTML documents
//! - **Style Capture** - turn an element or an article into a style record
//! - **Font Capture** - collect the font resources a captured family needs
//! - **Apply Session** - element picker, quick apply and the stylesheet for
//!   a page
//!
//! # Not Yet Implemented
//!
//! - Fetching documents over the network
//! - External style sheets (`<link rel="stylesheet">`) and the rules inside
//!   `@media` blocks; captured values come from `<style>` elements, `style`
//!   attributes and user-agent defaults

pub mod capture;
pub mod fonts;
pub mod session;

pub use mojifu_css as css;
pub use mojifu_dom as dom;
pub use mojifu_html as html;
pub use mojifu_locator as locator;
pub use mojifu_store as store;

pub use capture::{
    CaptureError, CascadeStyleSource, ComputedStyleSource, article_name, capture_article,
    capture_selection, extract_article_structure, extract_styles, generate_name,
};
pub use fonts::collect_font_resources;
pub use session::{ApplyPolicy, Session, SessionError};

use std::fs;
use std::path::PathBuf;

use mojifu_dom::DomTree;

/// A parsed document.
#[derive(Debug)]
pub struct LoadedDocument {
    /// Original HTML source
    pub html_source: String,

    /// Source path
    pub source_path: String,

    /// Parsed DOM tree
    pub dom: DomTree,

    /// Parse issues/warnings
    pub parse_issues: Vec<String>,
}

/// Error type for document loading.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// Failed to read file
    #[error("failed to read '{}': {source}", path.display())]
    File {
        /// The file that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

/// Load a document from a file path.
///
/// # Errors
///
/// Returns [`LoadError::File`] if the file cannot be read as UTF-8 text.
pub fn load_document(path: &str) -> Result<LoadedDocument, LoadError> {
    let html_source = fs::read_to_string(path).map_err(|source| LoadError::File {
        path: PathBuf::from(path),
        source,
    })?;

    let mut doc = parse_html_string(&html_source);
    doc.source_path = path.to_string();
    log::debug!(
        "loaded {path}: {} nodes, {} parse issues",
        doc.dom.len(),
        doc.parse_issues.len()
    );
    Ok(doc)
}

/// Parse an HTML string into a [`LoadedDocument`].
#[must_use]
pub fn parse_html_string(html: &str) -> LoadedDocument {
    mojifu_common::warning::clear_warnings();
    let (dom, issues) = mojifu_html::parse_with_issues(html);
    LoadedDocument {
        html_source: html.to_string(),
        source_path: String::new(),
        dom,
        parse_issues: issues.into_iter().map(|issue| issue.message).collect(),
    }
}
