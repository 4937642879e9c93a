//! Main article detection for MojiFu.
//!
//! # Scope
//!
//! - **Content scoring**: a Readability-style score for one element, built
//!   from its tag, role, class and id names, paragraphs, text and link
//!   density, structure, depth and rendered size.
//! - **Article location**: probes the document in tiers (semantic elements,
//!   common content classes, every large `div`/`section`, paragraph
//!   clusters) and returns the best scoring element.
//! - **Selector derivation**: a CSS selector that finds the same element
//!   again on a later visit.
//!
//! Everything here is read-only over the tree.

/// Article location.
pub mod locate;
/// Content scoring.
pub mod score;
/// Selector derivation.
pub mod selector_path;

pub use locate::{Located, Tier, locate};
pub use score::{DISQUALIFIED, score};
pub use selector_path::get_selector;
