//! In-memory store with change effects

use crate::storage::{HostStorage, Name, Persistence, StoreConfig};
use crate::{Error, Result};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info, warn};

/// Error returned by an effect to stop dispatch
pub type EffectError = Box<dyn std::error::Error + Send + Sync>;

/// Callback run with `(new_value, old_value)` whenever its entry is updated.
///
/// The store is mutably borrowed while effects run, so an effect sees the
/// committed value only through its first argument. A store shared through
/// `Rc<RefCell<_>>` must not be borrowed from inside one of its effects; the
/// `RefCell` is already mutably borrowed there and the borrow panics.
pub type Effect<V> = Box<dyn FnMut(&V, &V) -> std::result::Result<(), EffectError>>;

/// Key-value store with effects and optional persistence.
///
/// Entries keep their insertion order. Effects stay bound to a name when its
/// entry is deleted, so adding it again re-arms them.
pub struct Store<V = serde_json::Value> {
    data: IndexMap<Name, V>,
    effects: HashMap<Name, Vec<Effect<V>>>,
    configs: StoreConfig,
    persistence: Option<Persistence>,
}

impl<V> Store<V>
where
    V: Clone + Serialize + DeserializeOwned,
{
    /// Create a store without host storage.
    ///
    /// `persist` is kept in the config but never engaged.
    pub fn new(configs: StoreConfig) -> Self {
        if configs.persist {
            warn!("Persistence requested without host storage, entries stay in memory");
        }

        Store {
            data: IndexMap::new(),
            effects: HashMap::new(),
            configs,
            persistence: None,
        }
    }

    /// Create a store backed by host storage.
    ///
    /// With `persist` on and the storage available, previously saved entries
    /// are loaded first.
    pub fn with_storage<S: HostStorage + 'static>(
        configs: StoreConfig,
        storage: S,
    ) -> Result<Self> {
        let persistence = Persistence::new(storage);

        let data = if configs.persist && persistence.is_available() {
            let data = persistence.load()?;
            info!("Loaded {} entries from persistence", data.len());
            data
        } else {
            if configs.persist {
                warn!("Host storage unavailable, entries stay in memory");
            }
            IndexMap::new()
        };

        Ok(Store {
            data,
            effects: HashMap::new(),
            configs,
            persistence: Some(persistence),
        })
    }

    /// Add an entry, overwriting an existing one unless the config forbids it.
    ///
    /// If saving to host storage fails the entry stays committed in memory.
    pub fn add(&mut self, name: impl Into<Name>, value: V) -> Result<()> {
        self.insert(name.into(), value, None)
    }

    /// Add an entry and bind `effect` to it.
    ///
    /// If saving to host storage fails the entry and effect stay in place.
    pub fn add_with_effect<F>(&mut self, name: impl Into<Name>, value: V, effect: F) -> Result<()>
    where
        F: FnMut(&V, &V) -> std::result::Result<(), EffectError> + 'static,
    {
        self.insert(name.into(), value, Some(Box::new(effect)))
    }

    fn insert(&mut self, name: Name, value: V, effect: Option<Effect<V>>) -> Result<()> {
        if !self.configs.allow_existing_data && self.data.contains_key(&name) {
            debug!("ADD {} rejected, entry exists", name);
            return Err(Error::DuplicateKey(name));
        }

        self.data.insert(name.clone(), value);
        debug!("ADD {}", name);

        if let Some(effect) = effect {
            self.bind(name, effect);
        }

        self.persist()
    }

    /// Current value of an entry, `None` when absent
    pub fn get(&self, name: impl Into<Name>) -> Option<&V> {
        self.data.get(&name.into())
    }

    /// Snapshot of every entry
    pub fn all(&self) -> IndexMap<Name, V> {
        self.data.clone()
    }

    /// Snapshot restricted to `fields`, in the order requested.
    ///
    /// Requested names missing from the store map to `None`.
    pub fn only<I, N>(&self, fields: I) -> IndexMap<Name, Option<V>>
    where
        I: IntoIterator<Item = N>,
        N: Into<Name>,
    {
        fields
            .into_iter()
            .map(|field| {
                let name = field.into();
                let value = self.data.get(&name).cloned();
                (name, value)
            })
            .collect()
    }

    /// Whether an entry exists
    pub fn has(&self, name: impl Into<Name>) -> bool {
        self.data.contains_key(&name.into())
    }

    /// Replace the value of an existing entry and run its effects.
    ///
    /// The new value is committed before any effect runs. The first failing
    /// effect stops dispatch and its error is returned; nothing is saved then.
    /// If saving to host storage fails the new value stays committed.
    pub fn update(&mut self, name: impl Into<Name>, value: V) -> Result<()> {
        let name = name.into();

        let Some(slot) = self.data.get_mut(&name) else {
            return Err(Error::NotFound(name));
        };
        let old_value = std::mem::replace(slot, value);
        debug!("UPDATE {}", name);

        Self::run_effects(&mut self.effects, &name, &self.data[&name], &old_value)?;

        self.persist()
    }

    /// Remove an entry. Its effects stay bound.
    ///
    /// If saving to host storage fails the entry stays removed.
    pub fn delete(&mut self, name: impl Into<Name>) -> Result<()> {
        let name = name.into();

        if self.data.shift_remove(&name).is_none() {
            return Err(Error::NotFound(name));
        }
        debug!("DELETE {}", name);

        self.persist()
    }

    /// Bind an effect to an existing entry
    pub fn listen<F>(&mut self, name: impl Into<Name>, callback: F) -> Result<()>
    where
        F: FnMut(&V, &V) -> std::result::Result<(), EffectError> + 'static,
    {
        let name = name.into();

        if !self.data.contains_key(&name) {
            return Err(Error::NotFound(name));
        }

        self.bind(name, Box::new(callback));
        Ok(())
    }

    fn bind(&mut self, name: Name, effect: Effect<V>) {
        let effects = self.effects.entry(name.clone()).or_default();
        effects.push(effect);
        debug!("LISTEN {} ({} effects)", name, effects.len());
    }

    fn run_effects(
        effects: &mut HashMap<Name, Vec<Effect<V>>>,
        name: &Name,
        value: &V,
        old_value: &V,
    ) -> Result<()> {
        let Some(callbacks) = effects.get_mut(name) else {
            return Ok(());
        };

        for callback in callbacks.iter_mut() {
            callback(value, old_value).map_err(|source| Error::Effect {
                name: name.clone(),
                source,
            })?;
        }

        debug!("Ran {} effects for {}", callbacks.len(), name);
        Ok(())
    }

    /// Save every entry when persistence is engaged
    fn persist(&mut self) -> Result<()> {
        if !self.configs.persist {
            return Ok(());
        }

        match self.persistence.as_mut() {
            Some(persistence) if persistence.is_available() => persistence.save(&self.data),
            _ => Ok(()),
        }
    }
}

impl<V> Store<V> {
    /// Whether mutations are mirrored to host storage
    pub fn is_persisting(&self) -> bool {
        self.configs.persist
            && self
                .persistence
                .as_ref()
                .is_some_and(Persistence::is_available)
    }

    /// Configuration the store was built with
    pub fn config(&self) -> &StoreConfig {
        &self.configs
    }

    /// Number of effects bound to `name`, including ones left by a delete
    pub fn effect_count(&self, name: impl Into<Name>) -> usize {
        self.effects.get(&name.into()).map_or(0, Vec::len)
    }

    /// Get number of entries in store
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if store is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl<V> Default for Store<V>
where
    V: Clone + Serialize + DeserializeOwned,
{
    fn default() -> Self {
        Store::new(StoreConfig::default())
    }
}

impl<V: fmt::Debug> fmt::Debug for Store<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("data", &self.data)
            .field("effects", &self.effects.len())
            .field("configs", &self.configs)
            .field("persisting", &self.is_persisting())
            .finish()
    }
}
