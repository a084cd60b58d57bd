use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::adapter::StorageAdapter;
use super::error::StorageError;

/// In-process storage backed by `Arc<RwLock<HashMap>>`.
///
/// Clone-friendly: clones share the same map, which is how tests simulate a
/// reload against the same device storage. An optional quota caps the total
/// size of keys plus values in bytes.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    items: Arc<RwLock<HashMap<String, String>>>,
    quota: Option<usize>,
}

impl MemoryStorage {
    /// Empty storage with no quota.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty storage rejecting writes that would push keys plus values
    /// past `limit` bytes.
    pub fn with_quota(limit: usize) -> Self {
        Self {
            items: Arc::default(),
            quota: Some(limit),
        }
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.items.read().map(|items| items.len()).unwrap_or(0)
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl StorageAdapter for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let items = self
            .items
            .read()
            .map_err(|_| StorageError::LockPoisoned("storage read"))?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = self
            .items
            .write()
            .map_err(|_| StorageError::LockPoisoned("storage write"))?;

        if let Some(limit) = self.quota {
            let others: usize = items
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            if others + key.len() + value.len() > limit {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    limit,
                });
            }
        }

        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut items = self
            .items
            .write()
            .map_err(|_| StorageError::LockPoisoned("storage write"))?;
        items.remove(key);
        Ok(())
    }
}
