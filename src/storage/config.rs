//! Store configuration

use serde::{Deserialize, Serialize};

/// Options recognized by a [`Store`](crate::Store).
///
/// Deserializing a partial document merges it over the defaults:
///
/// ```
/// use simple_store::StoreConfig;
///
/// let config: StoreConfig = serde_json::from_str(r#"{"persist": true}"#).unwrap();
/// assert!(config.persist);
/// assert!(config.allow_existing_data);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StoreConfig {
    /// Mirror all entries to host storage after every mutation
    pub persist: bool,

    /// Let `add` overwrite an entry that already exists
    pub allow_existing_data: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            persist: false,
            allow_existing_data: true,
        }
    }
}

impl StoreConfig {
    /// Turn persistence on or off
    pub fn with_persist(mut self, persist: bool) -> Self {
        self.persist = persist;
        self
    }

    /// Let `add` overwrite existing entries or reject them as duplicates
    pub fn with_allow_existing_data(mut self, allow: bool) -> Self {
        self.allow_existing_data = allow;
        self
    }
}
