use crate::errors::CoreError;

/// Trait abstraction over a flat string key/value storage area
/// (browser `localStorage`/`sessionStorage`, a JSON file, memory).
///
/// Backends see raw keys; namespacing, envelopes and expiry live in
/// [`KeyValueStore`](super::store::KeyValueStore). Methods take `&self`
/// so one storage area can be shared by several namespaced stores.
pub trait StorageBackend: Send + Sync {
    /// Human-readable name of this backend (for logs/errors).
    fn name(&self) -> &str;

    /// Read the raw value under `key`, `None` if absent.
    fn get_item(&self, key: &str) -> Result<Option<String>, CoreError>;

    /// Write `value` under `key`, replacing any previous value.
    fn set_item(&self, key: &str, value: &str) -> Result<(), CoreError>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove_item(&self, key: &str) -> Result<(), CoreError>;

    /// Every key currently present, unfiltered.
    fn keys(&self) -> Result<Vec<String>, CoreError>;
}
