//! Single-value option storage.

use std::collections::HashMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Errors from an option store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to access option store: {0}")]
    Io(#[from] io::Error),

    #[error("option store {path} is not a JSON object: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("option store lock poisoned")]
    Poisoned,
}

/// Named string options, each read and replaced as a whole.
///
/// An update either fully replaces the value or leaves the old one in place.
pub trait OptionStore: Send + Sync {
    /// Read an option. Never-written options read as `None`.
    fn get(&self, name: &str) -> Result<Option<String>, StoreError>;

    /// Replace an option's value.
    fn update(&self, name: &str, value: &str) -> Result<(), StoreError>;
}

impl<S: OptionStore + ?Sized> OptionStore for std::sync::Arc<S> {
    fn get(&self, name: &str) -> Result<Option<String>, StoreError> {
        (**self).get(name)
    }

    fn update(&self, name: &str, value: &str) -> Result<(), StoreError> {
        (**self).update(name, value)
    }
}

/// In-process store.
#[derive(Debug, Default)]
pub struct MemoryOptionStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryOptionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OptionStore for MemoryOptionStore {
    fn get(&self, name: &str) -> Result<Option<String>, StoreError> {
        let values = self.values.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(values.get(name).cloned())
    }

    fn update(&self, name: &str, value: &str) -> Result<(), StoreError> {
        let mut values = self.values.lock().map_err(|_| StoreError::Poisoned)?;
        values.insert(name.to_string(), value.to_string());
        Ok(())
    }
}

/// Options kept as a JSON object in a file.
///
/// Writes go to a temporary file in the same directory which is then renamed
/// over the original, so readers never see a half-written file. Keys this
/// store does not manage are preserved.
#[derive(Debug)]
pub struct JsonFileOptionStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileOptionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<serde_json::Map<String, serde_json::Value>, StoreError> {
        let content = match fs_err::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(serde_json::Map::new()),
            Err(e) => return Err(e.into()),
        };
        if content.trim().is_empty() {
            return Ok(serde_json::Map::new());
        }
        serde_json::from_str(&content).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn save(&self, options: &serde_json::Map<String, serde_json::Value>) -> Result<(), StoreError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs_err::create_dir_all(&dir)?;

        let json = serde_json::to_string_pretty(options).map_err(io::Error::other)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.write_all(b"\n")?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl OptionStore for JsonFileOptionStore {
    fn get(&self, name: &str) -> Result<Option<String>, StoreError> {
        let _guard = self.lock.lock().map_err(|_| StoreError::Poisoned)?;
        let options = self.load()?;
        Ok(options.get(name).and_then(|v| v.as_str()).map(str::to_string))
    }

    fn update(&self, name: &str, value: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock().map_err(|_| StoreError::Poisoned)?;
        let mut options = self.load()?;
        options.insert(name.to_string(), serde_json::Value::String(value.to_string()));
        self.save(&options)?;
        tracing::debug!(option = name, path = %self.path.display(), "option written");
        Ok(())
    }
}
