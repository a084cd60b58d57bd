use super::error::StorageError;

/// Synchronous key-value access to a durable per-device medium.
///
/// Implementations catch every fault of the underlying medium and return it
/// as a [`StorageError`]; callers decide whether it is fatal.
pub trait StorageAdapter: Send + Sync {
    /// Read the value stored under `key`, or `None` if there is none.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}
