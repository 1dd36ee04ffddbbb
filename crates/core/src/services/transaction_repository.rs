use chrono::{NaiveDate, Utc};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::errors::CoreError;
use crate::models::backup::{RestoreReport, TransactionBackup, TRANSACTION_BACKUP_VERSION};
use crate::models::settings::Settings;
use crate::models::transaction::{
    SearchOptions, SortField, SortOrder, TransactionInput, TransactionKind, TransactionRecord,
    MAX_ACCOUNT_LEN, MAX_DESCRIPTION_LEN,
};
use crate::storage::store::KeyValueStore;

/// Fields of a `TransactionInput` that passed validation.
struct ValidatedInput {
    description: String,
    amount: f64,
    category: String,
    kind: TransactionKind,
    date: NaiveDate,
    account: Option<String>,
}

/// CRUD and query operations over the transaction collection.
///
/// The collection lives in the [`KeyValueStore`] under one key and is never
/// cached here: every operation re-reads it, and every mutation writes the
/// whole collection back. Interleaved mutations are last-write-wins.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    store: KeyValueStore,
    key: String,
    recent_limit: usize,
}

impl TransactionRepository {
    pub fn new(store: KeyValueStore, settings: &Settings) -> Self {
        Self {
            store,
            key: settings.transactions_key.clone(),
            recent_limit: settings.recent_limit,
        }
    }

    pub fn store(&self) -> &KeyValueStore {
        &self.store
    }

    fn save(&self, records: &[TransactionRecord]) -> Result<(), CoreError> {
        if self.store.put(&self.key, records) {
            Ok(())
        } else {
            Err(CoreError::StorageWrite(format!(
                "Failed to persist {} transactions",
                records.len()
            )))
        }
    }

    // ── Reads ───────────────────────────────────────────────────────

    /// The full collection, empty if nothing is stored.
    pub fn get_all(&self) -> Vec<TransactionRecord> {
        self.store.get(&self.key).unwrap_or_default()
    }

    pub fn count(&self) -> usize {
        self.get_all().len()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    pub fn get_by_id(&self, id: u64) -> Result<TransactionRecord, CoreError> {
        self.get_all()
            .into_iter()
            .find(|t| t.id == id)
            .ok_or(CoreError::TransactionNotFound(id))
    }

    // ── Mutations ───────────────────────────────────────────────────

    /// Validate `input` and append it as a new record.
    ///
    /// Assigns `max(id) + 1`, forces the amount's sign to match the kind and
    /// stamps both timestamps. Nothing is written if validation fails.
    pub fn add(&self, input: TransactionInput) -> Result<TransactionRecord, CoreError> {
        let valid = validate(&input)?;
        let mut records = self.get_all();

        let id = match records.iter().map(|t| t.id).max() {
            None => 1,
            Some(max) => max.checked_add(1).ok_or_else(|| {
                CoreError::StorageWrite(format!("No transaction id left after {max}"))
            })?,
        };
        let now = Utc::now();
        let record = TransactionRecord {
            id,
            description: valid.description,
            amount: valid.amount,
            category: valid.category,
            kind: valid.kind,
            date: valid.date,
            account: valid.account,
            created_at: now,
            updated_at: now,
        };

        records.push(record.clone());
        self.save(&records)?;
        debug!(id, kind = %record.kind, amount = record.amount, "Added transaction");
        Ok(record)
    }

    /// Merge the supplied fields of `patch` over record `id`.
    ///
    /// Fields absent from `patch` keep their value; the merged record is
    /// validated and its sign re-normalized before it replaces the old one.
    pub fn update(&self, id: u64, patch: TransactionInput) -> Result<TransactionRecord, CoreError> {
        let mut records = self.get_all();
        let idx = records
            .iter()
            .position(|t| t.id == id)
            .ok_or(CoreError::TransactionNotFound(id))?;

        let merged = TransactionInput::from(&records[idx]).merged_with(patch);
        let valid = validate(&merged)?;

        let existing = &records[idx];
        let updated = TransactionRecord {
            id: existing.id,
            description: valid.description,
            amount: valid.amount,
            category: valid.category,
            kind: valid.kind,
            date: valid.date,
            account: valid.account,
            created_at: existing.created_at,
            updated_at: Utc::now(),
        };

        records[idx] = updated.clone();
        self.save(&records)?;
        debug!(id, "Updated transaction");
        Ok(updated)
    }

    /// Remove record `id` and return it.
    pub fn delete(&self, id: u64) -> Result<TransactionRecord, CoreError> {
        let mut records = self.get_all();
        let idx = records
            .iter()
            .position(|t| t.id == id)
            .ok_or(CoreError::TransactionNotFound(id))?;

        let removed = records.remove(idx);
        self.save(&records)?;
        debug!(id, "Deleted transaction");
        Ok(removed)
    }

    /// Remove every record whose id is in `ids`; unknown ids are ignored.
    /// Returns how many records were removed.
    pub fn delete_many(&self, ids: &[u64]) -> Result<usize, CoreError> {
        let records = self.get_all();
        let before = records.len();
        let remaining: Vec<TransactionRecord> =
            records.into_iter().filter(|t| !ids.contains(&t.id)).collect();
        let deleted = before - remaining.len();

        if deleted > 0 {
            self.save(&remaining)?;
            info!(deleted, "Deleted transactions");
        }
        Ok(deleted)
    }

    /// Remove the whole collection.
    pub fn clear_all(&self) -> Result<(), CoreError> {
        if self.store.remove(&self.key) {
            info!("Cleared all transactions");
            Ok(())
        } else {
            Err(CoreError::StorageWrite("Failed to clear transactions".into()))
        }
    }

    /// Store `inputs` as the initial collection if it is currently empty.
    ///
    /// Ids are assigned from 1 in input order. Inputs failing validation are
    /// skipped. Returns the number of records written (0 if the collection
    /// already had data).
    pub fn seed(&self, inputs: &[TransactionInput]) -> Result<usize, CoreError> {
        if !self.is_empty() {
            return Ok(0);
        }

        let now = Utc::now();
        let mut records = Vec::with_capacity(inputs.len());
        for input in inputs {
            match validate(input) {
                Ok(valid) => records.push(TransactionRecord {
                    id: records.len() as u64 + 1,
                    description: valid.description,
                    amount: valid.amount,
                    category: valid.category,
                    kind: valid.kind,
                    date: valid.date,
                    account: valid.account,
                    created_at: now,
                    updated_at: now,
                }),
                Err(e) => debug!("Skipping seed transaction: {e}"),
            }
        }

        if records.is_empty() {
            return Ok(0);
        }
        self.save(&records)?;
        info!(count = records.len(), "Seeded transactions");
        Ok(records.len())
    }

    // ── Backup / Restore ────────────────────────────────────────────

    /// The collection as a pretty-printed [`TransactionBackup`].
    pub fn backup(&self) -> Result<String, CoreError> {
        let backup = TransactionBackup {
            timestamp: Utc::now(),
            version: TRANSACTION_BACKUP_VERSION.to_string(),
            data: self.get_all(),
        };
        serde_json::to_string_pretty(&backup)
            .map_err(|e| CoreError::Serialization(format!("Failed to create backup: {e}")))
    }

    /// Replace the collection with the records of a transaction backup.
    ///
    /// `data` must be an array of complete records; anything else is
    /// rejected before the stored collection is touched.
    pub fn restore_backup(&self, json: &str) -> Result<RestoreReport, CoreError> {
        let document: Value = serde_json::from_str(json)
            .map_err(|e| CoreError::MalformedDocument(format!("Invalid backup format: {e}")))?;

        let data = match document.get("data") {
            Some(data) if data.is_array() => data.clone(),
            _ => {
                return Err(CoreError::MalformedDocument(
                    "Invalid backup format: `data` must be an array".into(),
                ))
            }
        };
        let records: Vec<TransactionRecord> = serde_json::from_value(data).map_err(|e| {
            CoreError::MalformedDocument(format!("Invalid transaction in backup: {e}"))
        })?;

        let backup_date = match document.get("timestamp") {
            None | Some(Value::Null) => None,
            Some(Value::String(text)) => Some(text.clone()),
            Some(other) => Some(other.to_string()),
        };

        self.save(&records)?;
        info!(restored = records.len(), "Restored transactions from backup");
        Ok(RestoreReport {
            restored_count: records.len(),
            backup_date,
        })
    }

    // ── Queries ─────────────────────────────────────────────────────

    /// Case-insensitive substring (or exact) match of `term` over the
    /// selected fields. Storage order is preserved.
    pub fn search(&self, term: &str, options: &SearchOptions) -> Vec<TransactionRecord> {
        let term = term.to_lowercase();
        self.get_all()
            .into_iter()
            .filter(|t| {
                options.fields.iter().any(|field| {
                    let value = field.value_of(t).to_lowercase();
                    if options.exact {
                        value == term
                    } else {
                        value.contains(&term)
                    }
                })
            })
            .collect()
    }

    pub fn filter_by_kind(&self, kind: TransactionKind) -> Vec<TransactionRecord> {
        self.get_all().into_iter().filter(|t| t.kind == kind).collect()
    }

    /// Records whose category equals `category`, ignoring case.
    pub fn filter_by_category(&self, category: &str) -> Vec<TransactionRecord> {
        let category = category.to_lowercase();
        self.get_all()
            .into_iter()
            .filter(|t| t.category.to_lowercase() == category)
            .collect()
    }

    /// Records dated within `[start, end]`, both ends inclusive.
    pub fn filter_by_date_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<TransactionRecord> {
        filter_by_date_range(self.get_all(), start, end)
    }

    /// The `limit` most recent records by date, newest first.
    pub fn recent(&self, limit: usize) -> Vec<TransactionRecord> {
        let mut records = sort_records(self.get_all(), SortField::Date, SortOrder::Desc);
        records.truncate(limit);
        records
    }

    /// [`recent`](Self::recent) with the configured default limit.
    pub fn recent_default(&self) -> Vec<TransactionRecord> {
        self.recent(self.recent_limit)
    }

    pub fn sorted(&self, field: SortField, order: SortOrder) -> Vec<TransactionRecord> {
        sort_records(self.get_all(), field, order)
    }

    pub fn grouped_by_category(&self) -> BTreeMap<String, Vec<TransactionRecord>> {
        let mut groups: BTreeMap<String, Vec<TransactionRecord>> = BTreeMap::new();
        for record in self.get_all() {
            groups.entry(record.category.clone()).or_default().push(record);
        }
        groups
    }

    /// Records bucketed by `YYYY-MM`.
    pub fn grouped_by_month(&self) -> BTreeMap<String, Vec<TransactionRecord>> {
        let mut groups: BTreeMap<String, Vec<TransactionRecord>> = BTreeMap::new();
        for record in self.get_all() {
            groups.entry(record.month_key()).or_default().push(record);
        }
        groups
    }
}

/// Keep the records dated within `[start, end]`.
pub fn filter_by_date_range(
    records: Vec<TransactionRecord>,
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<TransactionRecord> {
    records
        .into_iter()
        .filter(|t| t.date >= start && t.date <= end)
        .collect()
}

/// Stable sort of `records` by `field`.
pub fn sort_records(
    mut records: Vec<TransactionRecord>,
    field: SortField,
    order: SortOrder,
) -> Vec<TransactionRecord> {
    records.sort_by(|a, b| {
        let ordering = match field {
            SortField::Date => a.date.cmp(&b.date),
            SortField::Amount => a.amount.total_cmp(&b.amount),
            SortField::Description => a
                .description
                .to_lowercase()
                .cmp(&b.description.to_lowercase()),
            SortField::Category => a.category.to_lowercase().cmp(&b.category.to_lowercase()),
        };
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
    records
}

/// Check every rule at once so the caller can show all problems together.
///
/// Rules:
/// - description, category, kind and date are required
/// - description at most 100 characters, account at most 50
/// - amount must be a finite, non-zero number
/// - date must be `YYYY-MM-DD`
fn validate(input: &TransactionInput) -> Result<ValidatedInput, CoreError> {
    let mut errors = Vec::new();

    let description = input.description.clone().unwrap_or_default();
    if description.trim().is_empty() {
        errors.push("Description is required".to_string());
    } else if description.chars().count() > MAX_DESCRIPTION_LEN {
        errors.push(format!("Description cannot exceed {MAX_DESCRIPTION_LEN} characters"));
    }

    let amount = input.amount.unwrap_or(0.0);
    if !amount.is_finite() || amount == 0.0 {
        errors.push("Amount must be a valid non-zero number".to_string());
    }

    let category = input.category.clone().unwrap_or_default();
    if category.trim().is_empty() {
        errors.push("Category is required".to_string());
    }

    if input.kind.is_none() {
        errors.push("Kind must be 'income' or 'expense'".to_string());
    }

    let date = match input.date.as_deref().map(str::trim) {
        None | Some("") => {
            errors.push("Date is required".to_string());
            None
        }
        Some(text) => match NaiveDate::parse_from_str(text, "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(_) => {
                errors.push(format!("Date '{text}' is not a valid YYYY-MM-DD date"));
                None
            }
        },
    };

    let account = input
        .account
        .clone()
        .filter(|a| !a.trim().is_empty());
    if let Some(account) = &account {
        if account.chars().count() > MAX_ACCOUNT_LEN {
            errors.push(format!("Account cannot exceed {MAX_ACCOUNT_LEN} characters"));
        }
    }

    match (input.kind, date) {
        (Some(kind), Some(date)) if errors.is_empty() => Ok(ValidatedInput {
            description,
            amount: kind.normalize_amount(amount),
            category,
            kind,
            date,
            account,
        }),
        _ => Err(CoreError::Validation(errors)),
    }
}
