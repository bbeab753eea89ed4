//! Error types for the cscout core library.

/// Top-level error type for the core library.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Unknown bug category: {0}")]
    UnknownCategory(String),

    #[error("Unknown severity: {0}")]
    UnknownSeverity(String),

    #[error("Unknown detector: {0}")]
    UnknownDetector(String),

    #[error("Unknown fix edit kind: {0}")]
    UnknownFixEdit(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the finding store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Corrupt row in '{table}': {message}")]
    Corrupt { table: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store lock poisoned")]
    Poisoned,
}

impl StoreError {
    pub(crate) fn corrupt(table: &str, message: impl std::fmt::Display) -> Self {
        Self::Corrupt {
            table: table.to_string(),
            message: message.to_string(),
        }
    }
}
