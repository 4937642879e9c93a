//! HTML parser module for tree construction.

/// HTML parser implementation.
pub mod tree_builder;

pub use tree_builder::{HTMLParser, InsertionMode, ParseIssue};
