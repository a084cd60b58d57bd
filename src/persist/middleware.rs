use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::envelope::{merge_over, Envelope};
use super::error::PersistError;
use crate::storage::StorageAdapter;
use crate::store::{Creator, Middleware, State, WeakStore};

/// Receives persistence failures. Failures never reach the caller of `set`.
pub type ErrorSink = Arc<dyn Fn(&PersistError) + Send + Sync>;

type Partialize<S> = Arc<dyn Fn(&S) -> Value + Send + Sync>;
type Migrate = Arc<dyn Fn(Value, u32) -> Result<Value, String> + Send + Sync>;

/// Start configuring persistence for a store under the storage key `name`.
pub fn persist<S>(name: impl Into<String>, storage: Arc<dyn StorageAdapter>) -> PersistOptions<S> {
    PersistOptions::new(name, storage)
}

/// Options for the persistence middleware.
pub struct PersistOptions<S> {
    name: String,
    version: u32,
    storage: Arc<dyn StorageAdapter>,
    partialize: Option<Partialize<S>>,
    migrate: Option<Migrate>,
    on_error: Option<ErrorSink>,
}

impl<S> PersistOptions<S> {
    /// Options with version 0, no projection, no migration and the logging sink.
    pub fn new(name: impl Into<String>, storage: Arc<dyn StorageAdapter>) -> Self {
        Self {
            name: name.into(),
            version: 0,
            storage,
            partialize: None,
            migrate: None,
            on_error: None,
        }
    }

    /// Schema version written with every envelope.
    pub fn version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    /// Persist only a projection of the state. Fields left out of the
    /// projection keep their defaults on hydration.
    pub fn partialize<F>(mut self, f: F) -> Self
    where
        F: Fn(&S) -> Value + Send + Sync + 'static,
    {
        self.partialize = Some(Arc::new(f));
        self
    }

    /// Upgrade a stored state written under an older version.
    ///
    /// Without a migration, a version mismatch falls back to defaults.
    pub fn migrate<F>(mut self, f: F) -> Self
    where
        F: Fn(Value, u32) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.migrate = Some(Arc::new(f));
        self
    }

    /// Replace the default error sink, which logs a warning.
    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: Fn(&PersistError) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(f));
        self
    }

    /// Finish configuration. The result is passed to `StoreBuilder::with`.
    pub fn build(self) -> Persist<S> {
        let on_error = self.on_error.unwrap_or_else(|| {
            let name = self.name.clone();
            Arc::new(move |err: &PersistError| {
                tracing::warn!(store = %name, error = %err, "persistence failure");
            })
        });

        Persist {
            inner: Arc::new(PersistInner {
                name: self.name,
                version: self.version,
                storage: self.storage,
                partialize: self.partialize,
                migrate: self.migrate,
                on_error,
                hydrated: AtomicBool::new(false),
                store: OnceLock::new(),
            }),
        }
    }
}

struct PersistInner<S> {
    name: String,
    version: u32,
    storage: Arc<dyn StorageAdapter>,
    partialize: Option<Partialize<S>>,
    migrate: Option<Migrate>,
    on_error: ErrorSink,
    hydrated: AtomicBool,
    store: OnceLock<WeakStore<S>>,
}

impl<S> PersistInner<S>
where
    S: State + Serialize + DeserializeOwned,
{
    fn malformed(&self, source: serde_json::Error) -> PersistError {
        PersistError::Malformed {
            name: self.name.clone(),
            source,
        }
    }

    /// Read the stored envelope and merge it over `base`.
    ///
    /// `Ok(None)` means nothing is stored. The flag is set when the state went
    /// through a migration.
    fn read(&self, base: &S) -> Result<Option<(S, bool)>, PersistError> {
        let Some(raw) = self.storage.get_item(&self.name)? else {
            return Ok(None);
        };
        let envelope: Envelope = serde_json::from_str(&raw).map_err(|e| self.malformed(e))?;

        let (persisted, migrated) = if envelope.version == self.version {
            (envelope.state, false)
        } else {
            let migrate = self
                .migrate
                .as_ref()
                .ok_or_else(|| PersistError::VersionMismatch {
                    name: self.name.clone(),
                    stored: envelope.version,
                    current: self.version,
                })?;
            let state =
                migrate(envelope.state, envelope.version).map_err(|message| {
                    PersistError::Migrate {
                        name: self.name.clone(),
                        message,
                    }
                })?;
            (state, true)
        };

        let defaults = serde_json::to_value(base).map_err(PersistError::Serialize)?;
        let state = serde_json::from_value(merge_over(defaults, persisted))
            .map_err(|e| self.malformed(e))?;
        Ok(Some((state, migrated)))
    }

    fn write(&self, state: &S) -> Result<(), PersistError> {
        let state = match &self.partialize {
            Some(partialize) => partialize(state),
            None => serde_json::to_value(state).map_err(PersistError::Serialize)?,
        };
        let raw = serde_json::to_string(&Envelope {
            state,
            version: self.version,
        })
        .map_err(PersistError::Serialize)?;
        self.storage.set_item(&self.name, &raw)?;
        Ok(())
    }

    fn write_or_report(&self, state: &S) {
        if let Err(err) = self.write(state) {
            (self.on_error)(&err);
        }
    }
}

/// The persistence middleware.
///
/// At creation it hydrates the store from storage, merging the stored state
/// over the default initial state; a missing or unreadable record leaves the
/// defaults untouched. After creation every commit is written back.
pub struct Persist<S> {
    inner: Arc<PersistInner<S>>,
}

impl<S> Persist<S> {
    /// Handle for inspecting and driving persistence after the store exists.
    pub fn handle(&self) -> PersistHandle<S> {
        PersistHandle {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S> Middleware<S> for Persist<S>
where
    S: State + Serialize + DeserializeOwned,
{
    fn wrap(self: Box<Self>, next: Creator<S>) -> Creator<S> {
        let inner = self.inner;
        Creator::new(move |defaults| {
            let (initial, migrated) = match inner.read(&defaults) {
                Ok(Some(found)) => found,
                Ok(None) => (defaults, false),
                Err(err) => {
                    (inner.on_error)(&err);
                    (defaults, false)
                }
            };

            let store = next.create(initial);
            if migrated {
                inner.write_or_report(&store.get());
            }

            let hook = Arc::clone(&inner);
            store.add_commit_hook(move |next, _prev| hook.write_or_report(next));

            let _ = inner.store.set(store.downgrade());
            inner.hydrated.store(true, Ordering::Release);
            tracing::debug!(store = %inner.name, version = inner.version, "store hydrated");
            store
        })
    }
}

/// Runtime access to a persisted store's storage record.
pub struct PersistHandle<S> {
    inner: Arc<PersistInner<S>>,
}

impl<S> Clone for PersistHandle<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S> PersistHandle<S>
where
    S: State + Serialize + DeserializeOwned,
{
    /// Storage key.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Schema version written with every envelope.
    pub fn version(&self) -> u32 {
        self.inner.version
    }

    /// Whether the store has finished loading from storage.
    pub fn has_hydrated(&self) -> bool {
        self.inner.hydrated.load(Ordering::Acquire)
    }

    /// Re-read storage into the live store.
    ///
    /// The stored state is merged over the current state and committed like
    /// any other update. Returns whether anything changed.
    pub fn rehydrate(&self) -> Result<bool, PersistError> {
        let store = self
            .inner
            .store
            .get()
            .and_then(WeakStore::upgrade)
            .ok_or_else(|| PersistError::NotAttached(self.inner.name.clone()))?;

        self.inner.hydrated.store(false, Ordering::Release);
        let result = self
            .inner
            .read(&store.get())
            .map(|found| found.is_some_and(|(state, _)| store.set(state)));
        self.inner.hydrated.store(true, Ordering::Release);
        result
    }

    /// Remove the stored record. The in-memory state is untouched.
    pub fn clear_storage(&self) -> Result<(), PersistError> {
        self.inner.storage.remove_item(&self.inner.name)?;
        Ok(())
    }
}
