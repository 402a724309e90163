pub mod codec;
pub mod json_backend;

use std::collections::BTreeMap;

use crate::errors::LedgerError;

pub type Result<T> = std::result::Result<T, LedgerError>;

pub const TRANSACTIONS_KEY: &str = "transactions";
pub const BUDGET_KEY: &str = "budget";
pub const GOAL_YEAR_KEY: &str = "goalYear";
pub const GOAL_18_KEY: &str = "goal18";
pub const SAVINGS_KEY: &str = "savingsBalance";
pub const REPORTS_KEY: &str = "reports";

/// Synchronous string key/value persistence that survives restarts.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: String) -> Result<()>;

    /// Writes several keys as one unit. Backends that can commit atomically
    /// should override the per-key default.
    fn set_many(&mut self, entries: Vec<(&'static str, String)>) -> Result<()> {
        for (key, value) in entries {
            self.set(key, value)?;
        }
        Ok(())
    }
}

/// Volatile store for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

pub use codec::{load_ledger, load_reports, save_ledger, save_reports};
pub use json_backend::JsonFileStore;
