//! Mapping between the ledger and its store keys.

use tracing::warn;

use super::{
    KeyValueStore, Result, BUDGET_KEY, GOAL_18_KEY, GOAL_YEAR_KEY, REPORTS_KEY, SAVINGS_KEY,
    TRANSACTIONS_KEY,
};
use crate::{
    ledger::{Ledger, SavingsBalance, Settings, Transaction},
    reports::ReportRecord,
};

/// Reads the ledger; absent keys fall back to defaults.
pub fn load_ledger(store: &dyn KeyValueStore) -> Result<Ledger> {
    let defaults = Settings::default();
    let transactions: Vec<Transaction> = match store.get(TRANSACTIONS_KEY)? {
        Some(raw) if !raw.trim().is_empty() => serde_json::from_str(&raw)?,
        _ => Vec::new(),
    };
    let settings = Settings {
        budget: read_integer(store, BUDGET_KEY, defaults.budget)?,
        goal_year: read_integer(store, GOAL_YEAR_KEY, defaults.goal_year)?,
        goal_18: read_integer(store, GOAL_18_KEY, defaults.goal_18)?,
        savings: SavingsBalance::new(read_integer(store, SAVINGS_KEY, 0)?),
    };
    Ok(Ledger {
        transactions,
        settings,
    })
}

/// Writes transactions and every setting in a single store call.
pub fn save_ledger(store: &mut dyn KeyValueStore, ledger: &Ledger) -> Result<()> {
    let settings = &ledger.settings;
    store.set_many(vec![
        (TRANSACTIONS_KEY, serde_json::to_string(&ledger.transactions)?),
        (BUDGET_KEY, settings.budget.to_string()),
        (GOAL_YEAR_KEY, settings.goal_year.to_string()),
        (GOAL_18_KEY, settings.goal_18.to_string()),
        (SAVINGS_KEY, settings.savings.amount().to_string()),
    ])
}

pub fn load_reports(store: &dyn KeyValueStore) -> Result<Vec<ReportRecord>> {
    match store.get(REPORTS_KEY)? {
        Some(raw) if !raw.trim().is_empty() => Ok(serde_json::from_str(&raw)?),
        _ => Ok(Vec::new()),
    }
}

pub fn save_reports(store: &mut dyn KeyValueStore, reports: &[ReportRecord]) -> Result<()> {
    store.set(REPORTS_KEY, serde_json::to_string(reports)?)
}

fn read_integer(store: &dyn KeyValueStore, key: &str, fallback: i64) -> Result<i64> {
    let Some(raw) = store.get(key)? else {
        return Ok(fallback);
    };
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value.trunc() as i64),
        _ => {
            warn!(key, value = %raw, fallback, "unreadable setting, using fallback");
            Ok(fallback)
        }
    }
}
