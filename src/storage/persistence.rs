//! Persistence layer mirroring the whole entry set into host storage

use crate::storage::{HostStorage, Name};
use crate::{Error, Result};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

/// Key of the single blob holding every persisted entry
pub const STORAGE_KEY: &str = "simple-store-data";

/// Persistence adapter over a host storage.
///
/// Every save overwrites the blob with the full entry set, encoded as a JSON
/// object whose keys are entry names.
pub struct Persistence {
    storage: Box<dyn HostStorage>,
}

impl Persistence {
    pub fn new<S: HostStorage + 'static>(storage: S) -> Self {
        Persistence {
            storage: Box::new(storage),
        }
    }

    /// Whether the underlying host storage can be used
    pub fn is_available(&self) -> bool {
        self.storage.is_available()
    }

    /// Write all entries to host storage
    pub fn save<V: Serialize>(&mut self, entries: &IndexMap<Name, V>) -> Result<()> {
        let serialized = serde_json::to_string(entries)
            .map_err(|e| Error::Storage(format!("Serialization error: {}", e)))?;

        self.storage.set_item(STORAGE_KEY, &serialized)?;

        debug!("Saved {} entries to {}", entries.len(), STORAGE_KEY);
        Ok(())
    }

    /// Read all entries back, empty when nothing was saved yet
    pub fn load<V: DeserializeOwned>(&self) -> Result<IndexMap<Name, V>> {
        let Some(serialized) = self.storage.get_item(STORAGE_KEY)? else {
            debug!("Nothing persisted under {}, starting fresh", STORAGE_KEY);
            return Ok(IndexMap::new());
        };

        let entries: IndexMap<Name, V> = serde_json::from_str(&serialized)
            .map_err(|e| Error::CorruptPersistedData(format!("{}: {}", STORAGE_KEY, e)))?;

        debug!("Loaded {} entries from {}", entries.len(), STORAGE_KEY);
        Ok(entries)
    }
}
