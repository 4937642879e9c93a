use std::path::PathBuf;

/// Errors from reading or writing the style store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A storage file could not be read or written.
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        /// The file involved.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },
    /// A stored value is not valid JSON, or does not have the expected shape.
    #[error("invalid data under '{key}': {source}")]
    Json {
        /// The storage key.
        key: String,
        /// The underlying error.
        source: serde_json::Error,
    },
}
