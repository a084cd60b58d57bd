use thiserror::Error;

/// Failure reported by a storage adapter.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage i/o failed for key {key:?}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("storage quota of {limit} bytes exceeded writing key {key:?}")]
    QuotaExceeded { key: String, limit: usize },

    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("storage lock poisoned during {0}")]
    LockPoisoned(&'static str),
}
