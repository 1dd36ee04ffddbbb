pub mod errors;
pub mod models;
pub mod providers;
pub mod services;
pub mod storage;

use chrono::NaiveDate;
use models::{
    backup::RestoreReport,
    reference::ReferenceData,
    settings::Settings,
    statistics::{CategoryTotal, CategoryUsage, MonthTotal, Summary, TransactionStats},
    storage_info::{StorageStats, StorageUsage},
    transaction::{
        SearchOptions, SortField, SortOrder, TransactionInput, TransactionKind, TransactionRecord,
    },
};
use providers::{http::HttpReferenceSource, traits::ReferenceSource};
use services::{
    csv_service::{CsvService, ImportReport},
    sample_data::sample_transactions,
    statistics_service::StatisticsService,
    transaction_repository::TransactionRepository,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use storage::{backend::StorageBackend, memory::MemoryBackend, migration, store::KeyValueStore};
use tracing::{info, warn};

use errors::CoreError;

/// Main entry point for the SmartBudget core library.
///
/// One instance per application/session context. Owns the repository over
/// an injected storage backend plus the stateless statistics and CSV
/// services; statistics and exports work on a fresh snapshot of the
/// collection on every call.
#[must_use]
pub struct SmartBudget {
    settings: Settings,
    repository: TransactionRepository,
    statistics_service: StatisticsService,
    csv_service: CsvService,
    /// Last reference document fetched, if any.
    reference: Option<ReferenceData>,
}

impl std::fmt::Debug for SmartBudget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmartBudget")
            .field("namespace", &self.settings.namespace)
            .field("transactions", &self.repository.count())
            .field("available", &self.repository.store().is_available())
            .field("reference_loaded", &self.reference.is_some())
            .finish()
    }
}

impl SmartBudget {
    /// Open the application over `backend`.
    ///
    /// Expired entries are purged on the way in, and with
    /// `seed_sample_data` an empty collection receives the sample records.
    pub fn new(backend: Arc<dyn StorageBackend>, settings: Settings) -> Self {
        let store = KeyValueStore::new(backend, &settings);
        let repository = TransactionRepository::new(store, &settings);

        if settings.seed_sample_data {
            match repository.seed(&sample_transactions()) {
                Ok(0) => {}
                Ok(count) => info!(count, "Loaded sample transactions"),
                Err(e) => warn!("Could not load sample transactions: {e}"),
            }
        }

        Self {
            settings,
            repository,
            statistics_service: StatisticsService::new(),
            csv_service: CsvService::new(),
            reference: None,
        }
    }

    /// Open over a fresh, non-persistent storage area.
    pub fn in_memory(settings: Settings) -> Self {
        let backend = MemoryBackend::with_capacity(settings.storage_capacity_bytes);
        Self::new(Arc::new(backend), settings)
    }

    /// Open over a JSON storage file on disk (native only).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn open_file(path: impl Into<std::path::PathBuf>, settings: Settings) -> Self {
        let backend = storage::file::FileBackend::new(path);
        Self::new(Arc::new(backend), settings)
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[must_use]
    pub fn repository(&self) -> &TransactionRepository {
        &self.repository
    }

    #[must_use]
    pub fn store(&self) -> &KeyValueStore {
        self.repository.store()
    }

    // ── Transaction Management ──────────────────────────────────────

    /// Validate and store a new transaction.
    pub fn add_transaction(&self, input: TransactionInput) -> Result<TransactionRecord, CoreError> {
        self.repository.add(input)
    }

    /// Replace the supplied fields of transaction `id`.
    pub fn update_transaction(
        &self,
        id: u64,
        patch: TransactionInput,
    ) -> Result<TransactionRecord, CoreError> {
        self.repository.update(id, patch)
    }

    pub fn delete_transaction(&self, id: u64) -> Result<TransactionRecord, CoreError> {
        self.repository.delete(id)
    }

    /// Delete every listed transaction; returns how many existed.
    pub fn delete_transactions(&self, ids: &[u64]) -> Result<usize, CoreError> {
        self.repository.delete_many(ids)
    }

    pub fn get_transaction(&self, id: u64) -> Result<TransactionRecord, CoreError> {
        self.repository.get_by_id(id)
    }

    /// All transactions in storage order.
    #[must_use]
    pub fn get_transactions(&self) -> Vec<TransactionRecord> {
        self.repository.get_all()
    }

    #[must_use]
    pub fn search(&self, term: &str, options: &SearchOptions) -> Vec<TransactionRecord> {
        self.repository.search(term, options)
    }

    #[must_use]
    pub fn get_transactions_by_kind(&self, kind: TransactionKind) -> Vec<TransactionRecord> {
        self.repository.filter_by_kind(kind)
    }

    #[must_use]
    pub fn get_transactions_by_category(&self, category: &str) -> Vec<TransactionRecord> {
        self.repository.filter_by_category(category)
    }

    /// Transactions dated within `[from, to]` (inclusive).
    pub fn get_transactions_in_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<TransactionRecord>, CoreError> {
        if from > to {
            return Err(CoreError::Validation(vec![format!(
                "'from' date ({from}) must not be after 'to' date ({to})"
            )]));
        }
        Ok(self.repository.filter_by_date_range(from, to))
    }

    /// Newest transactions first, up to the configured `recent_limit`.
    #[must_use]
    pub fn recent_transactions(&self) -> Vec<TransactionRecord> {
        self.repository.recent_default()
    }

    #[must_use]
    pub fn sorted_transactions(
        &self,
        field: SortField,
        order: SortOrder,
    ) -> Vec<TransactionRecord> {
        self.repository.sorted(field, order)
    }

    // ── Statistics ──────────────────────────────────────────────────

    #[must_use]
    pub fn summary(&self) -> Summary {
        self.statistics_service.summarize(&self.repository.get_all())
    }

    #[must_use]
    pub fn summary_in_range(&self, from: NaiveDate, to: NaiveDate) -> Summary {
        self.statistics_service
            .summarize_range(&self.repository.get_all(), from, to)
    }

    #[must_use]
    pub fn category_totals(&self) -> BTreeMap<String, CategoryTotal> {
        self.statistics_service.by_category(&self.repository.get_all())
    }

    #[must_use]
    pub fn monthly_totals(&self) -> BTreeMap<String, MonthTotal> {
        self.statistics_service.by_month(&self.repository.get_all())
    }

    #[must_use]
    pub fn overview(&self) -> TransactionStats {
        self.statistics_service.overview(&self.repository.get_all())
    }

    #[must_use]
    pub fn category_usage(&self) -> Vec<CategoryUsage> {
        self.statistics_service
            .category_usage(&self.repository.get_all())
    }

    // ── Import / Export ─────────────────────────────────────────────

    /// Export every transaction as CSV.
    pub fn export_csv(&self) -> Result<String, CoreError> {
        self.csv_service.export(&self.repository.get_all())
    }

    /// Import CSV rows as new transactions (partial success allowed).
    pub fn import_csv(&self, text: &str) -> Result<ImportReport, CoreError> {
        self.csv_service.import(&self.repository, text)
    }

    // ── Storage ─────────────────────────────────────────────────────

    /// JSON backup of every namespaced key, `None` if storage is unavailable.
    #[must_use]
    pub fn backup(&self) -> Option<String> {
        self.store().backup()
    }

    /// Replace all namespaced data with a backup document.
    pub fn restore(&self, json: &str) -> Result<usize, CoreError> {
        self.store().restore(json)
    }

    #[must_use]
    pub fn storage_usage(&self) -> StorageUsage {
        self.store().usage_info()
    }

    #[must_use]
    pub fn storage_stats(&self) -> StorageStats {
        self.store().stats()
    }

    /// JSON backup of the transaction collection alone.
    pub fn backup_transactions(&self) -> Result<String, CoreError> {
        self.repository.backup()
    }

    /// Replace the transaction collection with a transaction backup.
    pub fn restore_transactions(&self, json: &str) -> Result<RestoreReport, CoreError> {
        self.repository.restore_backup(json)
    }

    /// Upgrade stored data between layout versions.
    pub fn migrate(&self, from: &str, to: &str) -> Result<usize, CoreError> {
        migration::migrate(self.store(), &self.settings, from, to)
    }

    /// Delete every transaction.
    pub fn clear_transactions(&self) -> Result<(), CoreError> {
        self.repository.clear_all()
    }

    // ── Reference Data ──────────────────────────────────────────────

    /// Fetch reference data from `source` and keep it for later lookups.
    /// A failed fetch keeps the previously loaded document.
    pub async fn load_reference_data(
        &mut self,
        source: &dyn ReferenceSource,
    ) -> Result<&ReferenceData, CoreError> {
        let data = source.fetch().await?;
        info!(
            source = source.name(),
            categories = data.categories.len(),
            payment_methods = data.payment_methods.len(),
            "Loaded reference data"
        );
        let data: &ReferenceData = self.reference.insert(data);
        Ok(data)
    }

    /// Fetch reference data from the configured `reference_url`.
    pub async fn load_configured_reference_data(&mut self) -> Result<&ReferenceData, CoreError> {
        let url = self.settings.reference_url.clone().ok_or_else(|| CoreError::Reference {
            source_name: "settings".into(),
            message: "No reference_url configured".into(),
        })?;
        let source = HttpReferenceSource::new(url);
        self.load_reference_data(&source).await
    }

    #[must_use]
    pub fn reference_data(&self) -> Option<&ReferenceData> {
        self.reference.as_ref()
    }

    /// Seed an empty collection with the reference document's transactions.
    /// Returns the number of records written.
    pub fn seed_from_reference(&self) -> Result<usize, CoreError> {
        let Some(reference) = &self.reference else {
            return Ok(0);
        };
        let inputs: Vec<TransactionInput> = reference
            .transactions
            .iter()
            .map(TransactionInput::from)
            .collect();
        self.repository.seed(&inputs)
    }
}
