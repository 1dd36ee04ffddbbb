use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::transaction::{TransactionKind, TransactionRecord};

/// Totals over a record collection.
///
/// Income and expense totals are absolute values, so `balance` is
/// `total_income - total_expense`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub count: usize,
    pub total_income: f64,
    pub total_expense: f64,
    pub balance: f64,
    pub income_count: usize,
    pub expense_count: usize,
    /// Mean of |amount| over all records, 0 when empty
    pub average_absolute_amount: f64,
    pub largest_income: Option<TransactionRecord>,
    pub largest_expense: Option<TransactionRecord>,
    /// balance / total_income × 100, 0 when there is no income
    pub savings_rate: f64,
}

/// Per-category totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    /// Sum of |amount|
    pub total: f64,
    pub count: usize,
    /// Kind of the first record seen in the category
    pub kind: TransactionKind,
}

/// Per-month totals, keyed by `YYYY-MM`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthTotal {
    pub income: f64,
    pub expense: f64,
    pub count: usize,
}

impl MonthTotal {
    pub fn net(&self) -> f64 {
        self.income - self.expense
    }
}

/// How often a category is used, for category pickers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryUsage {
    pub name: String,
    pub count: usize,
    pub total_amount: f64,
    pub kind: TransactionKind,
}

/// Combined report: summary plus category and month breakdowns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionStats {
    pub summary: Summary,
    pub categories: BTreeMap<String, CategoryTotal>,
    pub monthly: BTreeMap<String, MonthTotal>,
}
