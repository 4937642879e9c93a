//! Saved styles and applied rules for MojiFu.
//!
//! # Scope
//!
//! - **Model**: [`StyleRecord`] (a captured single-element or article style)
//!   and [`AppliedRule`] (a style bound to a selector on matching URLs).
//! - **Storage**: a key-value [`Storage`] with change notification, kept in
//!   memory or as one JSON file per key.
//! - **Library**: the operations on top of storage, up to replaying every
//!   rule that matches a URL into one stylesheet.
//!
//! Two keys are used: [`SAVED_STYLES_KEY`] holds the array of style records
//! and [`APPLIED_RULES_KEY`] the array of applied rules, most recent first.

mod error;
/// Operations on saved styles and applied rules.
pub mod library;
/// Style records and applied rules.
pub mod model;
/// Key-value storage backends.
pub mod storage;

pub use error::StoreError;
pub use library::{ApplyOutcome, InjectedStyles, RuleView, StyleLibrary};
pub use model::{AppliedRule, StyleKind, StyleRecord, UrlPattern};
pub use storage::{
    APPLIED_RULES_KEY, JsonFileStorage, MemoryStorage, SAVED_STYLES_KEY, Storage, StorageChange,
    migrate_saved_styles,
};
