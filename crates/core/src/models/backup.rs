use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::transaction::TransactionRecord;

/// Version tag written into transaction backups.
pub const TRANSACTION_BACKUP_VERSION: &str = "1.0";

/// Backup of the transaction collection alone.
///
/// Layout: `{ "timestamp": <RFC 3339>, "version": "1.0", "data": [records] }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionBackup {
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub data: Vec<TransactionRecord>,
}

/// Outcome of restoring a transaction backup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreReport {
    pub restored_count: usize,
    /// The backup's `timestamp` as written, if it had one
    pub backup_date: Option<String>,
}
