//! Storage module: the store, its configuration, and persistence

pub mod config;
pub mod host;
pub mod name;
pub mod persistence;
pub mod store;

pub use config::StoreConfig;
pub use host::{FileStorage, HostStorage, MemoryStorage};
pub use name::Name;
pub use persistence::{Persistence, STORAGE_KEY};
pub use store::{Effect, EffectError, Store};
