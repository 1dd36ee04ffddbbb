use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::errors::CoreError;

use super::backend::StorageBackend;

/// In-memory storage area.
///
/// Clones share the same map, like several scripts sharing one
/// `localStorage`. An optional quota (keys + values, in bytes) makes
/// writes fail with `QuotaExceeded` once reached. Also serves as
/// session storage: nothing survives the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    items: Arc<Mutex<BTreeMap<String, String>>>,
    capacity: Option<usize>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend refusing writes that would grow it past `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Arc::default(),
            capacity: Some(capacity),
        }
    }

    /// Number of raw entries, namespaced or not.
    pub fn len(&self) -> usize {
        self.lock().map(|items| items.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<String, String>>, CoreError> {
        self.items.lock().map_err(|e| {
            CoreError::StorageUnavailable(format!("memory storage lock poisoned: {e}"))
        })
    }
}

impl StorageBackend for MemoryBackend {
    fn name(&self) -> &str {
        "memory"
    }

    fn get_item(&self, key: &str) -> Result<Option<String>, CoreError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), CoreError> {
        let mut items = self.lock()?;

        if let Some(capacity) = self.capacity {
            let used: usize = items
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = used + key.len() + value.len();
            if needed > capacity {
                return Err(CoreError::QuotaExceeded { needed, capacity });
            }
        }

        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), CoreError> {
        self.lock()?.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, CoreError> {
        Ok(self.lock()?.keys().cloned().collect())
    }
}
