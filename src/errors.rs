use thiserror::Error;

/// Error type that captures common ledger failures.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Persistence error: {0}")]
    Storage(String),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Operation cancelled: {0}")]
    Declined(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

impl LedgerError {
    pub fn is_validation(&self) -> bool {
        matches!(self, LedgerError::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
