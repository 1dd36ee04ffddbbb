use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::errors::CoreError;
use crate::models::settings::Settings;
use crate::models::storage_info::{key_group, KeyGroup, StorageStats, StorageUsage};

use super::backend::StorageBackend;

/// Version tag written into backup documents.
pub const BACKUP_VERSION: &str = "1.0";

/// Raw backend key written to check that the backend accepts writes.
/// Never namespaced, so no `put` can address it.
const WRITE_CHECK_KEY: &str = "__smartbudget_write_check__";

/// Envelope stored under every namespaced key.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredEntry {
    value: Value,
    /// Write time, ms since the Unix epoch
    timestamp: i64,
    /// Expiry time, ms since the Unix epoch
    #[serde(default)]
    expires: Option<i64>,
}

impl StoredEntry {
    fn is_expired(&self, now_ms: i64) -> bool {
        self.expires.is_some_and(|expires| now_ms > expires)
    }
}

/// Options for [`KeyValueStore::put_with_options`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PutOptions {
    /// Lifetime relative to now; negative values are already expired.
    pub expires_in_ms: Option<i64>,
}

/// Portable backup of every namespaced key.
///
/// Layout: `{ "timestamp": <ms-epoch>, "version": "1.0", "data": { key: value } }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupDocument {
    pub timestamp: i64,
    pub version: String,
    pub data: Map<String, Value>,
}

/// Only `data` is required when restoring.
#[derive(Deserialize)]
struct RestoreDocument {
    data: Map<String, Value>,
}

/// Namespaced, optionally-expiring key/value persistence over a [`StorageBackend`].
///
/// Backend failures never escape: writes report `false`, reads fall back to
/// `None`/the default, and each swallowed failure is logged.
#[derive(Clone)]
pub struct KeyValueStore {
    backend: Arc<dyn StorageBackend>,
    namespace: String,
    capacity: usize,
    available: bool,
}

impl std::fmt::Debug for KeyValueStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyValueStore")
            .field("backend", &self.backend.name())
            .field("namespace", &self.namespace)
            .field("available", &self.available)
            .finish()
    }
}

impl KeyValueStore {
    /// Open a store over `backend` using the namespace and capacity from `settings`.
    ///
    /// Checks the backend with a throwaway write and purges entries that
    /// have already expired.
    pub fn new(backend: Arc<dyn StorageBackend>, settings: &Settings) -> Self {
        let mut store = Self {
            backend,
            namespace: settings.namespace.clone(),
            capacity: settings.storage_capacity_bytes,
            available: false,
        };
        store.available = store.check_writable();
        if store.available {
            store.purge_expired();
        }
        store
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Whether the backend accepted the write check at construction.
    pub fn is_available(&self) -> bool {
        self.available
    }

    /// Write to the check key, leaving any value already there in place.
    fn check_writable(&self) -> bool {
        let result = self.backend.get_item(WRITE_CHECK_KEY).and_then(|existing| match existing {
            Some(value) => self.backend.set_item(WRITE_CHECK_KEY, &value),
            None => self
                .backend
                .set_item(WRITE_CHECK_KEY, "test")
                .and_then(|_| self.backend.remove_item(WRITE_CHECK_KEY)),
        });
        match result {
            Ok(()) => true,
            Err(e) => {
                warn!("Storage backend '{}' is not available: {e}", self.backend.name());
                false
            }
        }
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}{}", self.namespace, key)
    }

    fn now_ms() -> i64 {
        Utc::now().timestamp_millis()
    }

    // ── Writes ──────────────────────────────────────────────────────

    /// Store `value` under `key` without expiry. Returns `false` on any failure.
    pub fn put<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        self.put_with_options(key, value, PutOptions::default())
    }

    /// Store `value` under `key`, expiring after `minutes`.
    pub fn put_with_expiration_minutes<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        minutes: i64,
    ) -> bool {
        self.put_with_options(
            key,
            value,
            PutOptions {
                expires_in_ms: Some(minutes.saturating_mul(60 * 1000)),
            },
        )
    }

    /// Store `value` under `key` as `{value, timestamp, expires}`.
    /// Returns `false` if storage is unavailable or the write fails (e.g., quota).
    pub fn put_with_options<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        options: PutOptions,
    ) -> bool {
        if !self.available {
            warn!("Storage not available, dropping write of '{key}'");
            return false;
        }

        let now = Self::now_ms();
        let value = match serde_json::to_value(value) {
            Ok(v) => v,
            Err(e) => {
                warn!("Failed to serialize value for '{key}': {e}");
                return false;
            }
        };
        let entry = StoredEntry {
            value,
            timestamp: now,
            expires: options.expires_in_ms.map(|ms| now.saturating_add(ms)),
        };
        let text = match serde_json::to_string(&entry) {
            Ok(t) => t,
            Err(e) => {
                warn!("Failed to serialize storage entry for '{key}': {e}");
                return false;
            }
        };

        match self.backend.set_item(&self.full_key(key), &text) {
            Ok(()) => {
                debug!(key, bytes = text.len(), "Stored item");
                true
            }
            Err(e) => {
                warn!("Error setting storage item '{key}': {e}");
                false
            }
        }
    }

    /// Remove `key`. Returns `false` if storage is unavailable or the removal fails.
    pub fn remove(&self, key: &str) -> bool {
        if !self.available {
            return false;
        }
        match self.backend.remove_item(&self.full_key(key)) {
            Ok(()) => true,
            Err(e) => {
                warn!("Error removing storage item '{key}': {e}");
                false
            }
        }
    }

    /// Remove every namespaced key; keys outside the namespace are untouched.
    pub fn clear(&self) -> bool {
        if !self.available {
            return false;
        }
        let mut ok = true;
        for key in self.list_keys() {
            if let Err(e) = self.backend.remove_item(&self.full_key(&key)) {
                warn!("Error clearing storage item '{key}': {e}");
                ok = false;
            }
        }
        ok
    }

    // ── Reads ───────────────────────────────────────────────────────

    /// Read and deserialize `key`.
    ///
    /// `None` when the key is missing, expired (the key is then removed),
    /// unreadable, or does not deserialize into `T`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        if !self.available {
            return None;
        }

        let raw = match self.backend.get_item(&self.full_key(key)) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("Error reading storage item '{key}': {e}");
                return None;
            }
        };

        let entry: StoredEntry = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Corrupted storage item '{key}': {e}");
                return None;
            }
        };

        if entry.is_expired(Self::now_ms()) {
            debug!(key, "Storage item expired");
            self.remove(key);
            return None;
        }

        match serde_json::from_value(entry.value) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Storage item '{key}' has unexpected shape: {e}");
                None
            }
        }
    }

    /// [`get`](Self::get), falling back to `default`.
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    /// Whether a raw entry exists under `key` (expiry is not checked).
    pub fn has(&self, key: &str) -> bool {
        if !self.available {
            return false;
        }
        matches!(self.backend.get_item(&self.full_key(key)), Ok(Some(_)))
    }

    /// Keys in this namespace, with the prefix stripped.
    pub fn list_keys(&self) -> Vec<String> {
        if !self.available {
            return Vec::new();
        }
        match self.backend.keys() {
            Ok(keys) => keys
                .into_iter()
                .filter_map(|k| k.strip_prefix(&self.namespace).map(str::to_string))
                .collect(),
            Err(e) => {
                warn!("Error listing storage keys: {e}");
                Vec::new()
            }
        }
    }

    // ── Maintenance ─────────────────────────────────────────────────

    /// Remove expired entries and entries that no longer parse.
    /// Returns the number of keys removed.
    pub fn purge_expired(&self) -> usize {
        if !self.available {
            return 0;
        }

        let now = Self::now_ms();
        let mut removed = 0;
        for key in self.list_keys() {
            let full_key = self.full_key(&key);
            let stale = match self.backend.get_item(&full_key) {
                Ok(Some(raw)) => match serde_json::from_str::<StoredEntry>(&raw) {
                    Ok(entry) => entry.is_expired(now),
                    // Corrupted entries cannot be repaired.
                    Err(_) => true,
                },
                Ok(None) => false,
                Err(e) => {
                    warn!("Error reading storage item '{key}' during cleanup: {e}");
                    false
                }
            };
            if stale && self.remove(&key) {
                removed += 1;
            }
        }

        if removed > 0 {
            info!(removed, "Purged expired storage entries");
        }
        removed
    }

    /// Space used by this namespace against the configured capacity.
    pub fn usage_info(&self) -> StorageUsage {
        if !self.available {
            return StorageUsage::unavailable();
        }

        let mut used_bytes = 0;
        let mut item_count = 0;
        for key in self.list_keys() {
            if let Ok(Some(raw)) = self.backend.get_item(&self.full_key(&key)) {
                used_bytes += raw.len();
                item_count += 1;
            }
        }

        let percentage = if self.capacity > 0 {
            used_bytes as f64 / self.capacity as f64 * 100.0
        } else {
            0.0
        };

        StorageUsage {
            available: true,
            used_bytes,
            capacity_bytes: self.capacity,
            percentage,
            item_count,
        }
    }

    /// [`usage_info`](Self::usage_info) plus the key list and a per-prefix
    /// breakdown of entry counts and sizes.
    pub fn stats(&self) -> StorageStats {
        let usage = self.usage_info();
        let keys_list = self.list_keys();

        let mut categories: BTreeMap<String, KeyGroup> = BTreeMap::new();
        for key in &keys_list {
            let size = match self.backend.get_item(&self.full_key(key)) {
                Ok(Some(raw)) => raw.len(),
                _ => 0,
            };
            let group = categories.entry(key_group(key).to_string()).or_default();
            group.count += 1;
            group.size += size;
        }

        StorageStats {
            usage,
            keys: keys_list.len(),
            keys_list,
            categories,
        }
    }

    // ── Backup / Restore ────────────────────────────────────────────

    /// Snapshot every readable namespaced value.
    pub fn backup_document(&self) -> Option<BackupDocument> {
        if !self.available {
            return None;
        }

        let mut data = Map::new();
        for key in self.list_keys() {
            if let Some(value) = self.get::<Value>(&key) {
                if !value.is_null() {
                    data.insert(key, value);
                }
            }
        }

        Some(BackupDocument {
            timestamp: Self::now_ms(),
            version: BACKUP_VERSION.to_string(),
            data,
        })
    }

    /// [`backup_document`](Self::backup_document) as pretty-printed JSON.
    pub fn backup(&self) -> Option<String> {
        let document = self.backup_document()?;
        match serde_json::to_string_pretty(&document) {
            Ok(json) => Some(json),
            Err(e) => {
                warn!("Error creating backup: {e}");
                None
            }
        }
    }

    /// Replace the namespace's contents with the entries of a backup document.
    ///
    /// The document is parsed and checked before anything is touched; a
    /// malformed document leaves the store unchanged. Returns the number of
    /// entries restored.
    pub fn restore(&self, json: &str) -> Result<usize, CoreError> {
        let document: RestoreDocument = serde_json::from_str(json).map_err(|e| {
            CoreError::MalformedDocument(format!("Invalid backup format: {e}"))
        })?;

        if !self.available {
            return Err(CoreError::StorageUnavailable(format!(
                "backend '{}' rejected writes",
                self.backend.name()
            )));
        }

        if !self.clear() {
            return Err(CoreError::StorageWrite("Failed to clear storage before restore".into()));
        }

        let total = document.data.len();
        let mut failed = Vec::new();
        for (key, value) in &document.data {
            if !self.put(key, value) {
                failed.push(key.clone());
            }
        }

        if !failed.is_empty() {
            return Err(CoreError::StorageWrite(format!(
                "Restored {} of {total} entries, failed: {}",
                total - failed.len(),
                failed.join(", ")
            )));
        }

        info!(entries = total, "Restored storage from backup");
        Ok(total)
    }
}
