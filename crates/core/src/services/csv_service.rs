use csv::{QuoteStyle, ReaderBuilder, StringRecord, WriterBuilder};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::CoreError;
use crate::models::transaction::{TransactionInput, TransactionKind, TransactionRecord};
use crate::services::transaction_repository::TransactionRepository;

/// Column order of exported files.
pub const EXPORT_HEADER: [&str; 7] = [
    "id",
    "date",
    "description",
    "category",
    "kind",
    "amount",
    "account",
];

/// Importable fields, in the order header cells are matched against them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ImportField {
    Description,
    Amount,
    Category,
    Kind,
    Date,
    Account,
}

impl ImportField {
    const ALL: [ImportField; 6] = [
        ImportField::Description,
        ImportField::Amount,
        ImportField::Category,
        ImportField::Kind,
        ImportField::Date,
        ImportField::Account,
    ];

    /// Substrings that identify this field in a lowercased header cell.
    fn aliases(self) -> &'static [&'static str] {
        match self {
            ImportField::Description => &["description", "descripcion", "descripción"],
            ImportField::Amount => &["amount", "monto"],
            ImportField::Category => &["category", "categoria", "categoría"],
            ImportField::Kind => &["kind", "type", "tipo"],
            ImportField::Date => &["date", "fecha"],
            ImportField::Account => &["account", "banco", "bank"],
        }
    }

    fn name(self) -> &'static str {
        self.aliases()[0]
    }

    fn is_required(self) -> bool {
        self != ImportField::Account
    }

    /// Field with the longest alias occurring in `header`, case-insensitively.
    /// Ties go to the field listed first.
    fn match_header(header: &str) -> Option<ImportField> {
        let header = header.trim().to_lowercase();
        let mut best: Option<(ImportField, usize)> = None;
        for field in Self::ALL {
            let longest = field
                .aliases()
                .iter()
                .filter(|alias| header.contains(*alias))
                .map(|alias| alias.chars().count())
                .max();
            match (longest, best) {
                (Some(len), Some((_, best_len))) if len <= best_len => {}
                (Some(len), _) => best = Some((field, len)),
                (None, _) => {}
            }
        }
        best.map(|(field, _)| field)
    }
}

/// Outcome of an import: partial success is allowed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub imported_count: usize,
    /// Row-indexed messages, `None` when every row was imported
    pub errors: Option<Vec<String>>,
    pub transactions: Vec<TransactionRecord>,
}

/// Converts the record collection to and from comma-separated text.
///
/// Export is lossy only in `id` and the timestamps: an exported file
/// re-imports to the same descriptions, amounts, categories, kinds, dates
/// and accounts.
pub struct CsvService;

impl CsvService {
    pub fn new() -> Self {
        Self
    }

    /// Header row plus one fully-quoted row per record.
    pub fn export(&self, records: &[TransactionRecord]) -> Result<String, CoreError> {
        let mut writer = WriterBuilder::new()
            .quote_style(QuoteStyle::Always)
            .from_writer(Vec::new());

        writer.write_record(EXPORT_HEADER)?;
        for record in records {
            writer.write_record([
                record.id.to_string(),
                record.date.format("%Y-%m-%d").to_string(),
                record.description.clone(),
                record.category.clone(),
                record.kind.to_string(),
                record.amount.to_string(),
                record.account.clone().unwrap_or_default(),
            ])?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| CoreError::Serialization(format!("Failed to flush CSV: {e}")))?;
        String::from_utf8(bytes)
            .map_err(|e| CoreError::Serialization(format!("CSV output is not UTF-8: {e}")))
    }

    /// Parse `text` and add every data row through `repository`.
    ///
    /// The document is rejected before any row is processed if it has no
    /// data row or its header lacks a required column. Invalid rows are
    /// reported as `Row N: ...` (N = line in the file) and skipped.
    pub fn import(
        &self,
        repository: &TransactionRepository,
        text: &str,
    ) -> Result<ImportReport, CoreError> {
        let text = text.trim_start_matches('\u{feff}');
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(text.as_bytes());

        let rows = reader
            .records()
            .collect::<Result<Vec<StringRecord>, csv::Error>>()?;

        if rows.len() < 2 {
            return Err(CoreError::InvalidCsv(
                "CSV must contain a header row and at least one data row".into(),
            ));
        }

        let columns: Vec<Option<ImportField>> =
            rows[0].iter().map(ImportField::match_header).collect();

        let missing: Vec<&str> = ImportField::ALL
            .into_iter()
            .filter(|field| field.is_required() && !columns.contains(&Some(*field)))
            .map(ImportField::name)
            .collect();
        if !missing.is_empty() {
            return Err(CoreError::InvalidCsv(format!(
                "Missing required columns: {}",
                missing.join(", ")
            )));
        }

        let mut transactions = Vec::new();
        let mut errors = Vec::new();

        for (i, row) in rows.iter().enumerate().skip(1) {
            let line = row.position().map_or(i as u64 + 1, |p| p.line());

            let input = match Self::row_to_input(&columns, row) {
                Ok(input) => input,
                Err(message) => {
                    errors.push(format!("Row {line}: {message}"));
                    continue;
                }
            };

            match repository.add(input) {
                Ok(record) => transactions.push(record),
                Err(CoreError::Validation(messages)) => {
                    errors.push(format!("Row {line}: {}", messages.join("; ")));
                }
                Err(e) => {
                    warn!("Import of row {line} failed: {e}");
                    errors.push(format!("Row {line}: {e}"));
                }
            }
        }

        info!(
            imported = transactions.len(),
            rejected = errors.len(),
            "Imported transactions from CSV"
        );

        Ok(ImportReport {
            imported_count: transactions.len(),
            errors: if errors.is_empty() { None } else { Some(errors) },
            transactions,
        })
    }

    fn row_to_input(
        columns: &[Option<ImportField>],
        row: &StringRecord,
    ) -> Result<TransactionInput, String> {
        let mut input = TransactionInput::default();

        for (idx, field) in columns.iter().enumerate() {
            let Some(field) = field else {
                continue;
            };
            let value = row.get(idx).unwrap_or("");
            let trimmed = value.trim();

            match field {
                ImportField::Description => input.description = Some(value.to_string()),
                ImportField::Category => input.category = Some(value.to_string()),
                ImportField::Date => input.date = Some(trimmed.to_string()),
                ImportField::Account => {
                    input.account = (!trimmed.is_empty()).then(|| value.to_string());
                }
                ImportField::Amount => {
                    if !trimmed.is_empty() {
                        let amount = trimmed
                            .parse::<f64>()
                            .map_err(|_| format!("Amount '{trimmed}' is not a number"))?;
                        input.amount = Some(amount);
                    }
                }
                ImportField::Kind => {
                    if !trimmed.is_empty() {
                        input.kind = Some(trimmed.parse::<TransactionKind>()?);
                    }
                }
            }
        }

        Ok(input)
    }
}

impl Default for CsvService {
    fn default() -> Self {
        Self::new()
    }
}
