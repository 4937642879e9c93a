//! Deduplicated warnings routed through the `log` facade.
//!
//! Parsers and loaders hit the same recoverable problem many times per
//! document (an unknown property key in every saved style, a stray end tag
//! in every paragraph). Each distinct message is logged once per process
//! until [`clear_warnings`] is called.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// Messages already logged, keyed by `[component] message`.
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// Log a warning for `component` once per unique message.
///
/// # Example
/// ```ignore
/// warn_once("Store", "unknown property key 'wordSpacing' skipped");
/// ```
pub fn warn_once(component: &str, message: &str) {
    if record(component, message) {
        log::warn!(target: "mojifu", "[MojiFu {component}] {message}");
    }
}

/// Remember the message; true if it had not been seen before.
fn record(component: &str, message: &str) -> bool {
    let key = format!("[{component}] {message}");
    WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get_or_insert_with(HashSet::new)
        .insert(key)
}

/// Forget every recorded warning (call when starting on a new document).
pub fn clear_warnings() {
    let mut guard = WARNED.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(set) = guard.as_mut() {
        set.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_message_is_reported_once() {
        assert!(record("Test", "dedupe-check"));
        assert!(!record("Test", "dedupe-check"));
        // Same text under another component is a different warning.
        assert!(record("Other", "dedupe-check"));
        warn_once("Test", "dedupe-check");
    }
}
