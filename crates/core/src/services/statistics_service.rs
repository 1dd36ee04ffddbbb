use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::models::statistics::{
    CategoryTotal, CategoryUsage, MonthTotal, Summary, TransactionStats,
};
use crate::models::transaction::{TransactionKind, TransactionRecord};
use crate::services::transaction_repository::filter_by_date_range;

/// Derives read-only statistics from a supplied record collection.
///
/// Pure computation: never touches storage and caches nothing, every call
/// is a single pass over `records`. Amounts are aggregated as absolute values.
pub struct StatisticsService;

impl StatisticsService {
    pub fn new() -> Self {
        Self
    }

    /// Totals, counts, extremes and savings rate.
    pub fn summarize(&self, records: &[TransactionRecord]) -> Summary {
        let mut summary = Summary {
            count: records.len(),
            ..Summary::default()
        };

        for record in records {
            let amount = record.amount.abs();
            match record.kind {
                TransactionKind::Income => {
                    summary.total_income += amount;
                    summary.income_count += 1;
                    if summary
                        .largest_income
                        .as_ref()
                        .map_or(true, |largest| amount > largest.amount.abs())
                    {
                        summary.largest_income = Some(record.clone());
                    }
                }
                TransactionKind::Expense => {
                    summary.total_expense += amount;
                    summary.expense_count += 1;
                    if summary
                        .largest_expense
                        .as_ref()
                        .map_or(true, |largest| amount > largest.amount.abs())
                    {
                        summary.largest_expense = Some(record.clone());
                    }
                }
            }
        }

        summary.balance = summary.total_income - summary.total_expense;
        summary.average_absolute_amount = if summary.count > 0 {
            (summary.total_income + summary.total_expense) / summary.count as f64
        } else {
            0.0
        };
        summary.savings_rate = if summary.total_income > 0.0 {
            summary.balance / summary.total_income * 100.0
        } else {
            0.0
        };

        summary
    }

    /// [`summarize`](Self::summarize) restricted to records dated within `[start, end]`.
    pub fn summarize_range(
        &self,
        records: &[TransactionRecord],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Summary {
        let in_range = filter_by_date_range(records.to_vec(), start, end);
        self.summarize(&in_range)
    }

    /// Totals per category.
    ///
    /// The `kind` of a category is that of the first record seen in it;
    /// a category mixing income and expense is not detected.
    pub fn by_category(&self, records: &[TransactionRecord]) -> BTreeMap<String, CategoryTotal> {
        let mut categories: BTreeMap<String, CategoryTotal> = BTreeMap::new();
        for record in records {
            let entry = categories
                .entry(record.category.clone())
                .or_insert_with(|| CategoryTotal {
                    total: 0.0,
                    count: 0,
                    kind: record.kind,
                });
            entry.total += record.amount.abs();
            entry.count += 1;
        }
        categories
    }

    /// Income/expense totals per `YYYY-MM`.
    pub fn by_month(&self, records: &[TransactionRecord]) -> BTreeMap<String, MonthTotal> {
        let mut months: BTreeMap<String, MonthTotal> = BTreeMap::new();
        for record in records {
            let entry = months.entry(record.month_key()).or_default();
            match record.kind {
                TransactionKind::Income => entry.income += record.amount.abs(),
                TransactionKind::Expense => entry.expense += record.amount.abs(),
            }
            entry.count += 1;
        }
        months
    }

    /// Summary plus category and month breakdowns in one report.
    pub fn overview(&self, records: &[TransactionRecord]) -> TransactionStats {
        TransactionStats {
            summary: self.summarize(records),
            categories: self.by_category(records),
            monthly: self.by_month(records),
        }
    }

    /// Categories by usage, most used first (ties by name).
    pub fn category_usage(&self, records: &[TransactionRecord]) -> Vec<CategoryUsage> {
        let mut usage: Vec<CategoryUsage> = self
            .by_category(records)
            .into_iter()
            .map(|(name, total)| CategoryUsage {
                name,
                count: total.count,
                total_amount: total.total,
                kind: total.kind,
            })
            .collect();
        usage.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
        usage
    }
}

impl Default for StatisticsService {
    fn default() -> Self {
        Self::new()
    }
}
