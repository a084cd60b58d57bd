use thiserror::Error;

use crate::storage::StorageError;

/// Failure while hydrating or writing a persisted store.
///
/// These never escape a store update; they go to the persistence error sink.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("failed to serialize state: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("malformed persisted state for {name:?}: {source}")]
    Malformed {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("persisted state for {name:?} has version {stored}, expected {current} and no migration is set")]
    VersionMismatch {
        name: String,
        stored: u32,
        current: u32,
    },

    #[error("migration of {name:?} failed: {message}")]
    Migrate { name: String, message: String },

    #[error("no live store is attached to persisted key {0:?}")]
    NotAttached(String),
}
