//! Host key-value blob storage
//!
//! The store only needs a string-in, string-out facility addressed by key,
//! the way browser local storage behaves. Implementations decide where the
//! blobs actually live.

use crate::{Error, Result};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::{debug, info};

/// String blob storage provided by the host environment
pub trait HostStorage {
    /// Read the blob stored under `key`, `None` if nothing was written yet
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Replace the blob stored under `key`
    fn set_item(&mut self, key: &str, value: &str) -> Result<()>;

    /// Whether the runtime actually offers this storage.
    ///
    /// A store never loads from or saves to an unavailable storage.
    fn is_available(&self) -> bool {
        true
    }
}

/// In-process storage.
///
/// Clones share the same blobs, so one handle can be given to a store while
/// another is kept to seed or inspect what was persisted.
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    items: Rc<RefCell<HashMap<String, String>>>,
    available: bool,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStorage {
    /// Empty, available storage
    pub fn new() -> Self {
        MemoryStorage {
            items: Rc::new(RefCell::new(HashMap::new())),
            available: true,
        }
    }

    /// Storage that reports itself missing, as on a server-side runtime
    pub fn unavailable() -> Self {
        MemoryStorage {
            available: false,
            ..Self::new()
        }
    }

    /// Peek at a blob without going through the trait
    pub fn item(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }

    /// Number of keys written
    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    /// Whether nothing was written yet
    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }
}

impl HostStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn is_available(&self) -> bool {
        self.available
    }
}

/// Storage keeping each key in its own `<key>.json` file under a data directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    data_dir: PathBuf,
}

impl FileStorage {
    /// The directory is created on first write.
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        let data_dir = data_dir.as_ref().to_path_buf();
        info!("File storage initialized: {:?}", data_dir);
        FileStorage { data_dir }
    }

    /// Directory holding the storage files
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn item_path(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) || key == "." || key == ".." {
            return Err(Error::Storage(format!("Invalid storage key: {:?}", key)));
        }
        Ok(self.data_dir.join(format!("{}.json", key)))
    }
}

impl HostStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let path = self.item_path(key)?;

        match fs::read_to_string(&path) {
            Ok(contents) => {
                debug!("Read {} bytes from {:?}", contents.len(), path);
                Ok(Some(contents))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Storage file not found: {:?}", path);
                Ok(None)
            }
            Err(e) => Err(Error::Io(e)),
        }
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.item_path(key)?;
        fs::create_dir_all(&self.data_dir)?;
        fs::write(&path, value)?;

        debug!("Wrote {} bytes to {:?}", value.len(), path);
        Ok(())
    }
}
