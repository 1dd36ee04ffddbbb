use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Longest accepted description, in characters.
pub const MAX_DESCRIPTION_LEN: usize = 100;

/// Longest accepted account label, in characters.
pub const MAX_ACCOUNT_LEN: usize = 50;

/// Categories offered to users. Records may use any other name.
pub const RECOMMENDED_CATEGORIES: &[&str] = &[
    "food",
    "transport",
    "housing",
    "utilities",
    "entertainment",
    "health",
    "education",
    "shopping",
    "salary",
    "freelance",
    "investment",
    "other",
];

/// Income/expense discriminator of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    #[serde(alias = "ingreso")]
    Income,
    #[serde(alias = "gasto")]
    Expense,
}

impl TransactionKind {
    /// Force the sign of `amount` to match this kind:
    /// positive for income, negative for expense.
    pub fn normalize_amount(self, amount: f64) -> f64 {
        match self {
            TransactionKind::Income => amount.abs(),
            TransactionKind::Expense => -amount.abs(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = String;

    /// Accepts `income`/`expense` and the legacy `ingreso`/`gasto`, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" | "ingreso" => Ok(TransactionKind::Income),
            "expense" | "gasto" => Ok(TransactionKind::Expense),
            other => Err(format!("Kind must be 'income' or 'expense', got '{other}'")),
        }
    }
}

/// A single financial event (income or expense).
///
/// Records are only ever created by the repository: `id`, the sign of
/// `amount` and both timestamps are assigned there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    /// Unique within the collection
    pub id: u64,

    pub description: String,

    /// Signed: negative for expenses, positive for income
    pub amount: f64,

    pub category: String,

    pub kind: TransactionKind,

    /// Calendar date, serialized as `YYYY-MM-DD`
    pub date: NaiveDate,

    /// Bank or card label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl TransactionRecord {
    /// `YYYY-MM` bucket this record belongs to.
    pub fn month_key(&self) -> String {
        self.date.format("%Y-%m").to_string()
    }

    pub fn is_income(&self) -> bool {
        self.kind == TransactionKind::Income
    }
}

/// Caller-supplied fields for creating or updating a record.
///
/// Every field is optional: `add` reports each missing required field,
/// `update` only replaces the fields that are present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionInput {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub kind: Option<TransactionKind>,
    /// Raw date text; must parse as `YYYY-MM-DD`
    #[serde(default)]
    pub date: Option<String>,
    /// An empty string clears the account on update
    #[serde(default)]
    pub account: Option<String>,
}

impl TransactionInput {
    /// Input with every required field set.
    pub fn new(
        description: impl Into<String>,
        amount: f64,
        category: impl Into<String>,
        kind: TransactionKind,
        date: impl Into<String>,
    ) -> Self {
        Self {
            description: Some(description.into()),
            amount: Some(amount),
            category: Some(category.into()),
            kind: Some(kind),
            date: Some(date.into()),
            account: None,
        }
    }

    pub fn with_account(mut self, account: impl Into<String>) -> Self {
        self.account = Some(account.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn amount(mut self, amount: f64) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn kind(mut self, kind: TransactionKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    /// Overlay the fields present in `patch` onto `self`.
    pub fn merged_with(mut self, patch: TransactionInput) -> Self {
        if patch.description.is_some() {
            self.description = patch.description;
        }
        if patch.amount.is_some() {
            self.amount = patch.amount;
        }
        if patch.category.is_some() {
            self.category = patch.category;
        }
        if patch.kind.is_some() {
            self.kind = patch.kind;
        }
        if patch.date.is_some() {
            self.date = patch.date;
        }
        if patch.account.is_some() {
            self.account = patch.account;
        }
        self
    }
}

impl From<&TransactionRecord> for TransactionInput {
    fn from(record: &TransactionRecord) -> Self {
        Self {
            description: Some(record.description.clone()),
            amount: Some(record.amount),
            category: Some(record.category.clone()),
            kind: Some(record.kind),
            date: Some(record.date.format("%Y-%m-%d").to_string()),
            account: record.account.clone(),
        }
    }
}

/// Text fields `search` may look in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    Description,
    Category,
    Account,
}

impl SearchField {
    /// Value of this field on `record`, empty when absent.
    pub fn value_of<'a>(&self, record: &'a TransactionRecord) -> &'a str {
        match self {
            SearchField::Description => &record.description,
            SearchField::Category => &record.category,
            SearchField::Account => record.account.as_deref().unwrap_or(""),
        }
    }
}

/// Options for `TransactionRepository::search`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    pub fields: Vec<SearchField>,
    /// Whole-value match instead of substring
    pub exact: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            fields: vec![
                SearchField::Description,
                SearchField::Category,
                SearchField::Account,
            ],
            exact: false,
        }
    }
}

/// Key for explicit ordering of a record listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Date,
    Amount,
    Description,
    Category,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}
