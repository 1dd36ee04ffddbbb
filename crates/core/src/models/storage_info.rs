use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Snapshot of how much of the storage quota the namespaced keys use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageUsage {
    pub available: bool,
    /// Sum of stored value lengths in bytes
    pub used_bytes: usize,
    pub capacity_bytes: usize,
    pub percentage: f64,
    pub item_count: usize,
}

impl StorageUsage {
    pub fn unavailable() -> Self {
        Self {
            available: false,
            used_bytes: 0,
            capacity_bytes: 0,
            percentage: 0.0,
            item_count: 0,
        }
    }

    pub fn used_formatted(&self) -> String {
        format_bytes(self.used_bytes)
    }

    pub fn capacity_formatted(&self) -> String {
        format_bytes(self.capacity_bytes)
    }
}

/// Entry count and size of the keys sharing one prefix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyGroup {
    pub count: usize,
    /// Sum of stored value lengths in bytes
    pub size: usize,
}

/// Usage report plus the namespaced keys, grouped by the text before
/// their first `_` (`other` when that text is empty).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageStats {
    #[serde(flatten)]
    pub usage: StorageUsage,
    pub keys: usize,
    pub keys_list: Vec<String>,
    pub categories: BTreeMap<String, KeyGroup>,
}

/// Group name of a namespaced key (namespace already stripped).
pub fn key_group(key: &str) -> &str {
    match key.split('_').next() {
        Some(group) if !group.is_empty() => group,
        _ => "other",
    }
}

/// Human-readable byte count: `0 Bytes`, `512 Bytes`, `1.5 KB`, `5 MB`.
pub fn format_bytes(bytes: usize) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = (value * 100.0).round() / 100.0;
    // f64 Display drops trailing zeros: 1.50 -> "1.5", 5.00 -> "5"
    format!("{} {}", rounded, UNITS[unit])
}
