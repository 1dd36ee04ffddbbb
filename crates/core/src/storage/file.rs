use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::errors::CoreError;

use super::backend::StorageBackend;

/// Storage area persisted as a single JSON object on disk (native only).
///
/// Every operation re-reads the file and every mutation re-writes it
/// whole, so two backends on the same path observe each other's writes.
/// A missing file reads as an empty storage area.
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, CoreError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let text = std::fs::read_to_string(&self.path)?;
        if text.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&text).map_err(|e| {
            CoreError::Deserialization(format!(
                "Failed to parse storage file {}: {e}",
                self.path.display()
            ))
        })
    }

    fn write_all(&self, items: &BTreeMap<String, String>) -> Result<(), CoreError> {
        let text = serde_json::to_string_pretty(items).map_err(|e| {
            CoreError::Serialization(format!("Failed to serialize storage file: {e}"))
        })?;
        std::fs::write(&self.path, text)?;
        Ok(())
    }
}

impl StorageBackend for FileBackend {
    fn name(&self) -> &str {
        "file"
    }

    fn get_item(&self, key: &str) -> Result<Option<String>, CoreError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), CoreError> {
        let mut items = self.read_all()?;
        items.insert(key.to_string(), value.to_string());
        self.write_all(&items)
    }

    fn remove_item(&self, key: &str) -> Result<(), CoreError> {
        let mut items = self.read_all()?;
        if items.remove(key).is_some() {
            self.write_all(&items)?;
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, CoreError> {
        Ok(self.read_all()?.into_keys().collect())
    }
}
