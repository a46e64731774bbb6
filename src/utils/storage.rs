use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::utils::{GameError, GameResult};
use tracing::{debug, warn};

/// Durable string-keyed storage used for progress and settings.
///
/// Values are opaque strings; callers own the serialization format.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> GameResult<Option<String>>;

    fn set(&mut self, key: &str, value: &str) -> GameResult<()>;

    fn remove(&mut self, key: &str) -> GameResult<()>;
}

/// One file per key under a data directory.
///
/// Writes go to a temporary sibling first and are renamed into place, so a
/// crash mid-write leaves the previous value intact.
pub struct FileStore {
    directory: PathBuf,
}

impl FileStore {
    pub fn new<P: AsRef<Path>>(directory: P) -> Self {
        Self {
            directory: directory.as_ref().to_path_buf(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn key_path(&self, key: &str) -> GameResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(GameError::storage_write(format!("Invalid storage key: {:?}", key)));
        }
        Ok(self.directory.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> GameResult<Option<String>> {
        let path = self
            .key_path(key)
            .map_err(|e| GameError::storage_read(e.to_string()))?;

        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)
            .map_err(|e| GameError::storage_read(format!("Failed to read {:?}: {}", path, e)))?;
        Ok(Some(content))
    }

    fn set(&mut self, key: &str, value: &str) -> GameResult<()> {
        let path = self.key_path(key)?;

        if !self.directory.exists() {
            fs::create_dir_all(&self.directory).map_err(|e| {
                GameError::storage_write(format!("Failed to create data directory: {}", e))
            })?;
        }

        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, value)
            .map_err(|e| GameError::storage_write(format!("Failed to write {:?}: {}", tmp_path, e)))?;
        fs::rename(&tmp_path, &path)
            .map_err(|e| GameError::storage_write(format!("Failed to replace {:?}: {}", path, e)))?;

        debug!("Stored key '{}' at {:?}", key, path);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> GameResult<()> {
        let path = self.key_path(key)?;
        if path.exists() {
            fs::remove_file(&path)
                .map_err(|e| GameError::storage_write(format!("Failed to remove {:?}: {}", path, e)))?;
        }
        Ok(())
    }
}

/// In-process store. Clones share the same entries, which lets a caller keep
/// a handle on what a component persisted.
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
    fail_writes: Rc<Cell<bool>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `set`/`remove` fail, as a full or disabled
    /// browser storage would.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> GameResult<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> GameResult<()> {
        if self.fail_writes.get() {
            warn!("Memory store rejected write for '{}'", key);
            return Err(GameError::storage_write("Storage quota exceeded"));
        }
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> GameResult<()> {
        if self.fail_writes.get() {
            return Err(GameError::storage_write("Storage quota exceeded"));
        }
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}
