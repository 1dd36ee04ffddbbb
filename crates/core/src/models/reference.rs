use serde::{Deserialize, Serialize};

use super::transaction::{TransactionInput, TransactionKind};

/// Static reference data published alongside the app as JSON.
///
/// Read-only: it may seed an empty collection but is never written back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReferenceData {
    pub categories: Vec<CategoryInfo>,
    pub payment_methods: Vec<PaymentMethod>,
    pub transactions: Vec<ReferenceTransaction>,
}

impl ReferenceData {
    /// Category names for the given kind (categories without a kind match both).
    pub fn category_names(&self, kind: TransactionKind) -> Vec<&str> {
        self.categories
            .iter()
            .filter(|c| c.kind.map_or(true, |k| k == kind))
            .map(|c| c.name.as_str())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryInfo {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(alias = "nombre")]
    pub name: String,
    #[serde(default, alias = "type", alias = "tipo")]
    pub kind: Option<TransactionKind>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentMethod {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(alias = "nombre")]
    pub name: String,
}

/// Seed transaction as published in the reference JSON.
///
/// Accepts the legacy field names. Converted into a `TransactionInput`
/// and validated before anything is stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReferenceTransaction {
    #[serde(alias = "descripcion")]
    pub description: Option<String>,
    #[serde(alias = "monto")]
    pub amount: Option<f64>,
    #[serde(alias = "categoria")]
    pub category: Option<String>,
    #[serde(alias = "type", alias = "tipo")]
    pub kind: Option<String>,
    #[serde(alias = "fecha")]
    pub date: Option<String>,
    #[serde(alias = "paymentMethod", alias = "banco")]
    pub account: Option<String>,
}

impl From<&ReferenceTransaction> for TransactionInput {
    fn from(t: &ReferenceTransaction) -> Self {
        Self {
            description: t.description.clone(),
            amount: t.amount,
            category: t.category.clone(),
            kind: t.kind.as_deref().and_then(|k| k.parse().ok()),
            date: t.date.clone(),
            account: t.account.clone(),
        }
    }
}
