use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, Sender, channel};

use serde_json::Value;

use crate::StoreError;

/// Key of the saved style records.
pub const SAVED_STYLES_KEY: &str = "savedStyles";
/// Key of the applied rules.
pub const APPLIED_RULES_KEY: &str = "appliedRules";

/// A change made through [`Storage::set`] or [`Storage::remove`].
#[derive(Debug, Clone, PartialEq)]
pub struct StorageChange {
    /// The key that changed.
    pub key: String,
    /// Its value afterwards; `None` once removed.
    pub new_value: Option<Value>,
}

/// A key-value store of JSON values that tells subscribers about changes.
pub trait Storage {
    /// The value under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Replace the value under `key` and notify subscribers.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn set(&mut self, key: &str, value: Value) -> Result<(), StoreError>;

    /// Delete `key` and notify subscribers. Removing a missing key is not an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;

    /// A channel that receives every later change.
    fn subscribe(&mut self) -> Receiver<StorageChange>;
}

/// Fan-out of changes to every live subscriber.
#[derive(Debug, Default)]
struct Subscribers {
    senders: Vec<Sender<StorageChange>>,
}

impl Subscribers {
    fn subscribe(&mut self) -> Receiver<StorageChange> {
        let (tx, rx) = channel();
        self.senders.push(tx);
        rx
    }

    /// Deliver `change`, dropping subscribers whose receiver is gone.
    fn notify(&mut self, key: &str, new_value: Option<Value>) {
        let change = StorageChange {
            key: key.to_string(),
            new_value,
        };
        self.senders.retain(|tx| tx.send(change.clone()).is_ok());
    }
}

/// Storage that lives as long as the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: HashMap<String, Value>,
    subscribers: Subscribers,
}

impl MemoryStorage {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), StoreError> {
        let _ = self.values.insert(key.to_string(), value.clone());
        self.subscribers.notify(key, Some(value));
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        if self.values.remove(key).is_some() {
            self.subscribers.notify(key, None);
        }
        Ok(())
    }

    fn subscribe(&mut self) -> Receiver<StorageChange> {
        self.subscribers.subscribe()
    }
}

/// Storage kept as `<dir>/<key>.json`, one file per key.
#[derive(Debug)]
pub struct JsonFileStorage {
    dir: PathBuf,
    subscribers: Subscribers,
}

impl JsonFileStorage {
    /// Storage under `dir`. The directory is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            subscribers: Subscribers::default(),
        }
    }

    /// The storage directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

impl Storage for JsonFileStorage {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let path = self.path_for(key);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error(&path, e)),
        };
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|source| StoreError::Json {
                key: key.to_string(),
                source,
            })
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir).map_err(|e| io_error(&self.dir, e))?;
        let path = self.path_for(key);
        let text = serde_json::to_string_pretty(&value).map_err(|source| StoreError::Json {
            key: key.to_string(),
            source,
        })?;
        // Replaced by rename, never written in place.
        let partial = path.with_extension("json.partial");
        fs::write(&partial, text).map_err(|e| io_error(&partial, e))?;
        fs::rename(&partial, &path).map_err(|e| io_error(&path, e))?;
        log::debug!("wrote {}", path.display());
        self.subscribers.notify(key, Some(value));
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => {
                self.subscribers.notify(key, None);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(&path, e)),
        }
    }

    fn subscribe(&mut self) -> Receiver<StorageChange> {
        self.subscribers.subscribe()
    }
}

/// Move the saved styles of `legacy` into `primary`.
///
/// Nothing happens when `legacy` has no styles. When `primary` already has
/// some, they win and the legacy copy is only deleted. Returns true if
/// styles were moved.
///
/// # Errors
///
/// Returns an error if either store fails. The legacy copy is only deleted
/// after the primary write succeeded.
pub fn migrate_saved_styles(
    legacy: &mut impl Storage,
    primary: &mut impl Storage,
) -> Result<bool, StoreError> {
    let is_non_empty = |value: &Option<Value>| {
        value
            .as_ref()
            .and_then(Value::as_array)
            .is_some_and(|styles| !styles.is_empty())
    };

    let existing = legacy.get(SAVED_STYLES_KEY)?;
    if !is_non_empty(&existing) {
        return Ok(false);
    }
    if is_non_empty(&primary.get(SAVED_STYLES_KEY)?) {
        legacy.remove(SAVED_STYLES_KEY)?;
        log::info!("legacy saved styles dropped, primary store already has data");
        return Ok(false);
    }

    let Some(styles) = existing else {
        return Ok(false);
    };
    let count = styles.as_array().map_or(0, Vec::len);
    primary.set(SAVED_STYLES_KEY, styles)?;
    legacy.remove(SAVED_STYLES_KEY)?;
    log::info!("migrated {count} saved styles");
    Ok(true)
}
