//! Common utilities for MojiFu.
//!
//! This crate provides shared infrastructure used by every MojiFu component:
//! - **Warning System** - deduplicated warnings for recoverable input problems

pub mod warning;
