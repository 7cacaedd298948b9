//! Simple Store - an in-memory key-value store with change effects
//!
//! This crate provides:
//! - Named entries with add/get/update/delete and bulk reads
//! - Effects: callbacks fired in registration order when an entry is updated
//! - Optional persistence of the whole entry set to a host key-value blob store

pub mod storage;

pub use storage::{
    Effect, EffectError, FileStorage, HostStorage, MemoryStorage, Name, Persistence, Store,
    StoreConfig, STORAGE_KEY,
};

/// Result type for store operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the store
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{0} already exists in the store")]
    DuplicateKey(Name),

    #[error("{0} does not exist in the store")]
    NotFound(Name),

    #[error("Corrupt persisted data: {0}")]
    CorruptPersistedData(String),

    #[error("Effect bound to {name} failed: {source}")]
    Effect {
        name: Name,
        #[source]
        source: EffectError,
    },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
