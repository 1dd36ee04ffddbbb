// ═══════════════════════════════════════════════════════════════════
// Integration Tests — SmartBudget facade end to end
// ═══════════════════════════════════════════════════════════════════

use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;

use smartbudget_core::errors::CoreError;
use smartbudget_core::models::reference::ReferenceData;
use smartbudget_core::models::settings::Settings;
use smartbudget_core::models::transaction::{
    SearchOptions, SortField, SortOrder, TransactionInput, TransactionKind,
};
use smartbudget_core::providers::static_json::StaticReferenceSource;
use smartbudget_core::providers::traits::ReferenceSource;
use smartbudget_core::storage::memory::MemoryBackend;
use smartbudget_core::SmartBudget;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn with_samples() -> Settings {
    Settings {
        seed_sample_data: true,
        ..Settings::default()
    }
}

fn rent() -> TransactionInput {
    TransactionInput::new("Rent", 900.0, "housing", TransactionKind::Expense, "2024-02-01")
}

struct DownSource;

#[async_trait]
impl ReferenceSource for DownSource {
    fn name(&self) -> &str {
        "down"
    }

    async fn fetch(&self) -> Result<ReferenceData, CoreError> {
        Err(CoreError::Network("timed out".into()))
    }
}

// ═══════════════════════════════════════════════════════════════════
// Construction
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_new_instance_is_empty_by_default() {
    let app = SmartBudget::in_memory(Settings::default());
    assert!(app.get_transactions().is_empty());
    assert!(app.store().is_available());
    assert!(app.reference_data().is_none());
}

#[test]
fn test_sample_data_seeded_once() {
    let backend = MemoryBackend::new();
    let app = SmartBudget::new(Arc::new(backend.clone()), with_samples());
    assert_eq!(app.get_transactions().len(), 8);

    app.delete_transaction(1).unwrap();
    let reopened = SmartBudget::new(Arc::new(backend), with_samples());
    assert_eq!(reopened.get_transactions().len(), 7);
}

#[test]
fn test_instances_share_backend_but_not_namespace() {
    let backend = MemoryBackend::new();
    let a = SmartBudget::new(Arc::new(backend.clone()), Settings::default().with_namespace("a_"));
    let b = SmartBudget::new(Arc::new(backend), Settings::default().with_namespace("b_"));
    a.add_transaction(rent()).unwrap();
    assert_eq!(a.get_transactions().len(), 1);
    assert!(b.get_transactions().is_empty());
}

#[test]
fn test_debug_output_names_namespace() {
    let app = SmartBudget::in_memory(Settings::default());
    let debug = format!("{app:?}");
    assert!(debug.contains("smartbudget_"));
}

// ═══════════════════════════════════════════════════════════════════
// Transaction workflow
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_full_transaction_lifecycle() {
    let app = SmartBudget::in_memory(Settings::default());

    let added = app.add_transaction(rent()).unwrap();
    assert_eq!(added.id, 1);
    assert_eq!(added.amount, -900.0);

    let updated = app
        .update_transaction(added.id, TransactionInput::default().amount(950.0))
        .unwrap();
    assert_eq!(updated.amount, -950.0);
    assert_eq!(app.get_transaction(added.id).unwrap(), updated);

    app.delete_transaction(added.id).unwrap();
    assert!(matches!(
        app.get_transaction(added.id),
        Err(CoreError::TransactionNotFound(1))
    ));
}

#[test]
fn test_queries_through_facade() {
    let app = SmartBudget::in_memory(with_samples());

    assert_eq!(app.search("supermarket", &SearchOptions::default()).len(), 1);
    assert_eq!(app.get_transactions_by_kind(TransactionKind::Income).len(), 3);
    assert_eq!(app.get_transactions_by_category("Food").len(), 2);
    assert_eq!(app.delete_transactions(&[7, 8]).unwrap(), 2);

    let newest = app.sorted_transactions(SortField::Date, SortOrder::Desc);
    assert_eq!(newest[0].description, "Monthly salary");
}

#[test]
fn test_recent_transactions_respects_limit() {
    let settings = Settings {
        recent_limit: 3,
        ..with_samples()
    };
    let app = SmartBudget::in_memory(settings);
    let recent = app.recent_transactions();
    assert_eq!(recent.len(), 3);
    assert_eq!(recent[0].date, d(2024, 1, 15));
}

#[test]
fn test_date_range_queries() {
    let app = SmartBudget::in_memory(with_samples());
    let in_range = app.get_transactions_in_range(d(2024, 1, 8), d(2024, 1, 9)).unwrap();
    assert_eq!(in_range.len(), 2);

    let err = app
        .get_transactions_in_range(d(2024, 1, 9), d(2024, 1, 8))
        .unwrap_err();
    assert!(matches!(err, CoreError::Validation(_)));
}

#[test]
fn test_clear_transactions() {
    let app = SmartBudget::in_memory(with_samples());
    app.clear_transactions().unwrap();
    assert!(app.get_transactions().is_empty());
    assert_eq!(app.summary().balance, 0.0);
}

// ═══════════════════════════════════════════════════════════════════
// Statistics
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_statistics_follow_mutations() {
    let app = SmartBudget::in_memory(Settings::default());
    assert_eq!(app.summary().count, 0);

    app.add_transaction(rent()).unwrap();
    app.add_transaction(TransactionInput::new(
        "Salary",
        3000.0,
        "salary",
        TransactionKind::Income,
        "2024-02-28",
    ))
    .unwrap();

    let summary = app.summary();
    assert_eq!(summary.balance, 2100.0);
    assert!((summary.savings_rate - 70.0).abs() < 1e-9);

    assert_eq!(app.monthly_totals()["2024-02"].net(), 2100.0);
    assert_eq!(app.category_totals()["housing"].total, 900.0);
    assert_eq!(app.overview().categories.len(), 2);
    assert_eq!(app.category_usage().len(), 2);
    assert_eq!(app.summary_in_range(d(2024, 2, 1), d(2024, 2, 1)).count, 1);
}

// ═══════════════════════════════════════════════════════════════════
// CSV
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_csv_between_instances() {
    let source = SmartBudget::in_memory(with_samples());
    let csv = source.export_csv().unwrap();

    let target = SmartBudget::in_memory(Settings::default());
    let report = target.import_csv(&csv).unwrap();
    assert_eq!(report.imported_count, 8);
    assert!(report.errors.is_none());
    assert_eq!(target.summary().balance, source.summary().balance);
}

#[test]
fn test_import_report_serializes_camel_case() {
    let app = SmartBudget::in_memory(Settings::default());
    let report = app
        .import_csv("description,amount,category,kind,date\nTea,2,food,expense,2024-01-02\n")
        .unwrap();
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["importedCount"], 1);
    assert!(json["errors"].is_null());
}

// ═══════════════════════════════════════════════════════════════════
// Persistence, backup, migration
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_file_persistence_across_instances() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("smartbudget.json");

    {
        let app = SmartBudget::open_file(&path, Settings::default());
        app.add_transaction(rent().with_account("Checking")).unwrap();
    }

    let reopened = SmartBudget::open_file(&path, Settings::default());
    let all = reopened.get_transactions();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].account.as_deref(), Some("Checking"));
}

#[test]
fn test_backup_and_restore_between_instances() {
    let source = SmartBudget::in_memory(with_samples());
    let backup = source.backup().unwrap();

    let target = SmartBudget::in_memory(Settings::default());
    target.add_transaction(rent()).unwrap();
    assert_eq!(target.restore(&backup).unwrap(), 1);
    assert_eq!(target.get_transactions(), source.get_transactions());
}

#[test]
fn test_restore_empty_backup_clears_collection() {
    let app = SmartBudget::in_memory(with_samples());
    app.restore(r#"{"data":{}}"#).unwrap();
    assert!(app.get_transactions().is_empty());
}

#[test]
fn test_malformed_backup_keeps_data() {
    let app = SmartBudget::in_memory(with_samples());
    assert!(matches!(
        app.restore("{\"timestamp\": 1}"),
        Err(CoreError::MalformedDocument(_))
    ));
    assert_eq!(app.get_transactions().len(), 8);
}

#[test]
fn test_transaction_backup_between_instances() {
    let source = SmartBudget::in_memory(with_samples());
    let backup = source.backup_transactions().unwrap();

    let target = SmartBudget::in_memory(Settings::default());
    let report = target.restore_transactions(&backup).unwrap();
    assert_eq!(report.restored_count, 8);
    assert!(report.backup_date.is_some());
    assert_eq!(target.get_transactions(), source.get_transactions());
    // Ids continue after the restored maximum.
    assert_eq!(target.add_transaction(rent()).unwrap().id, 9);
}

#[test]
fn test_transaction_backup_requires_data_array() {
    let app = SmartBudget::in_memory(with_samples());
    assert!(matches!(
        app.restore_transactions(r#"{"version": "1.0", "data": {}}"#),
        Err(CoreError::MalformedDocument(_))
    ));
    assert_eq!(app.get_transactions().len(), 8);
}

#[test]
fn test_storage_stats_list_collection_key() {
    let app = SmartBudget::in_memory(with_samples());
    let stats = app.storage_stats();
    assert_eq!(stats.keys_list, vec!["transactions".to_string()]);
    assert_eq!(stats.categories["transactions"].count, 1);
    assert_eq!(stats.categories["transactions"].size, stats.usage.used_bytes);
}

#[test]
fn test_storage_usage_grows_with_data() {
    let app = SmartBudget::in_memory(Settings::default());
    let empty = app.storage_usage();
    app.add_transaction(rent()).unwrap();
    let used = app.storage_usage();
    assert!(used.used_bytes > empty.used_bytes);
    assert_eq!(used.item_count, 1);
}

#[test]
fn test_small_capacity_rejects_writes() {
    let settings = Settings {
        storage_capacity_bytes: 100,
        ..Settings::default()
    };
    let app = SmartBudget::in_memory(settings);
    assert!(matches!(app.add_transaction(rent()), Err(CoreError::StorageWrite(_))));
    assert!(app.get_transactions().is_empty());
}

#[test]
fn test_migrate_records_version() {
    let app = SmartBudget::in_memory(with_samples());
    // Records written by this version already carry timestamps.
    assert_eq!(app.migrate("1.0", "1.1").unwrap(), 0);
    assert_eq!(app.store().get::<String>("appVersion").as_deref(), Some("1.1"));
}

// ═══════════════════════════════════════════════════════════════════
// Reference data
// ═══════════════════════════════════════════════════════════════════

const REFERENCE_JSON: &str = r#"{
    "categories": [{"id": "food", "nombre": "Alimentación", "tipo": "gasto"}],
    "paymentMethods": [{"id": "cash", "nombre": "Efectivo"}],
    "transactions": [
        {"id": 1, "descripcion": "Salario", "monto": 3500, "categoria": "salary",
         "tipo": "ingreso", "fecha": "2024-01-15", "banco": "Banco Nacional"},
        {"id": 2, "descripcion": "Almuerzo", "monto": 25, "categoria": "food",
         "tipo": "gasto", "fecha": "2024-01-08"},
        {"id": 3, "descripcion": "", "monto": 10, "categoria": "food",
         "tipo": "gasto", "fecha": "2024-01-08"}
    ]
}"#;

#[tokio::test]
async fn test_load_reference_and_seed() {
    let mut app = SmartBudget::in_memory(Settings::default());
    let source = StaticReferenceSource::new(REFERENCE_JSON);

    let data = app.load_reference_data(&source).await.unwrap();
    assert_eq!(data.categories[0].name, "Alimentación");
    assert!(app.reference_data().is_some());

    // The blank-description row is skipped.
    assert_eq!(app.seed_from_reference().unwrap(), 2);
    let all = app.get_transactions();
    assert_eq!(all[0].amount, 3500.0);
    assert_eq!(all[0].account.as_deref(), Some("Banco Nacional"));
    assert_eq!(all[1].amount, -25.0);

    // A second seed is a no-op once data exists.
    assert_eq!(app.seed_from_reference().unwrap(), 0);
}

#[tokio::test]
async fn test_seed_without_reference_is_noop() {
    let app = SmartBudget::in_memory(Settings::default());
    assert_eq!(app.seed_from_reference().unwrap(), 0);
}

#[tokio::test]
async fn test_failed_fetch_keeps_previous_reference() {
    let mut app = SmartBudget::in_memory(Settings::default());
    app.load_reference_data(&StaticReferenceSource::new(REFERENCE_JSON))
        .await
        .unwrap();

    assert!(app.load_reference_data(&DownSource).await.is_err());
    assert_eq!(app.reference_data().unwrap().payment_methods[0].name, "Efectivo");
}

#[tokio::test]
async fn test_configured_reference_requires_url() {
    let mut app = SmartBudget::in_memory(Settings::default());
    let err = app.load_configured_reference_data().await.unwrap_err();
    assert!(matches!(err, CoreError::Reference { .. }));
}
