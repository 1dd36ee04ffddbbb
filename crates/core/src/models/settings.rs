use serde::{Deserialize, Serialize};

/// Nominal browser storage quota (5 MiB).
pub const DEFAULT_STORAGE_CAPACITY: usize = 5 * 1024 * 1024;

/// Application settings, passed explicitly to every component that needs them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Prefix prepended to every storage key (e.g., "smartbudget_").
    pub namespace: String,

    /// Key (without namespace) holding the transaction collection.
    pub transactions_key: String,

    /// Storage capacity in bytes used for usage reports and in-memory quotas.
    pub storage_capacity_bytes: usize,

    /// Load the built-in sample transactions when the collection is empty.
    pub seed_sample_data: bool,

    /// Default number of records returned by `recent`.
    pub recent_limit: usize,

    /// Where to fetch static reference data (categories, payment methods).
    pub reference_url: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            namespace: "smartbudget_".to_string(),
            transactions_key: "transactions".to_string(),
            storage_capacity_bytes: DEFAULT_STORAGE_CAPACITY,
            seed_sample_data: false,
            recent_limit: 10,
            reference_url: None,
        }
    }
}

impl Settings {
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }
}
