use thiserror::Error;

/// Unified error type for the entire smartbudget-core library.
/// Every fallible public function returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Storage ─────────────────────────────────────────────────────
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Storage quota exceeded: {needed} bytes needed, capacity is {capacity} bytes")]
    QuotaExceeded { needed: usize, capacity: usize },

    #[error("Storage write failed: {0}")]
    StorageWrite(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    // ── File I/O (native only) ──────────────────────────────────────
    #[error("File I/O error: {0}")]
    FileIO(String),

    // ── Documents (backup / CSV) ────────────────────────────────────
    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    #[error("Invalid CSV: {0}")]
    InvalidCsv(String),

    // ── Reference data / Network ────────────────────────────────────
    #[error("Reference data error ({source_name}): {message}")]
    Reference {
        source_name: String,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(String),

    // ── Business Logic ──────────────────────────────────────────────
    #[error("Transaction validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Transaction not found: {0}")]
    TransactionNotFound(u64),
}

impl CoreError {
    /// Field-level messages of a validation failure, empty for any other error.
    pub fn validation_messages(&self) -> &[String] {
        match self {
            CoreError::Validation(messages) => messages,
            _ => &[],
        }
    }
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::FileIO(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

impl From<csv::Error> for CoreError {
    fn from(e: csv::Error) -> Self {
        CoreError::InvalidCsv(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // Query strings may carry tokens; keep only the path part of any URL.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        CoreError::Network(sanitized)
    }
}
