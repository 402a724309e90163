use chrono::NaiveDate;
use tracing::{debug, info};
use uuid::Uuid;

use crate::core::services::{
    Dashboard, RecurrenceService, Removal, RemovalPreview, SavingsService, SummaryService,
    TransactionService,
};
use crate::core::time::Clock;
use crate::errors::LedgerError;
use crate::ledger::{
    BudgetPoint, BudgetStatus, CategoryTotal, GoalProgress, Ledger, MonthlyBalance, MonthlySeries,
    ReversalDecision, SavingsAdjustment, SettingKey, Settings, Transaction, TransactionDraft,
    YearMonth,
};
use crate::reports::{ReportJournal, ReportRecord};
use crate::storage::{self, KeyValueStore};

/// Facade that owns the ledger state, its store, and the clock.
///
/// Mutations run against a clone of the current ledger. The clone is flushed in full
/// and only replaces the live state once the store accepted it.
pub struct LedgerManager {
    ledger: Ledger,
    reports: ReportJournal,
    store: Box<dyn KeyValueStore>,
    clock: Box<dyn Clock>,
}

impl LedgerManager {
    /// Builds a manager over an empty ledger without touching the store.
    pub fn new(store: Box<dyn KeyValueStore>, clock: Box<dyn Clock>) -> Self {
        Self {
            ledger: Ledger::default(),
            reports: ReportJournal::default(),
            store,
            clock,
        }
    }

    /// Loads the stored state and runs the recurring materializer for the current month.
    pub fn open(store: Box<dyn KeyValueStore>, clock: Box<dyn Clock>) -> Result<Self, LedgerError> {
        let mut manager = Self::new(store, clock);
        manager.load()?;
        manager.activate()?;
        Ok(manager)
    }

    pub fn load(&mut self) -> Result<(), LedgerError> {
        let ledger = storage::load_ledger(self.store.as_ref())?;
        let reports = storage::load_reports(self.store.as_ref())?;
        info!(
            transactions = ledger.transaction_count(),
            reports = reports.len(),
            savings = ledger.savings_balance(),
            "ledger loaded"
        );
        self.ledger = ledger;
        self.reports = ReportJournal::new(reports);
        Ok(())
    }

    /// Writes settings and the full transaction list.
    pub fn flush(&mut self) -> Result<(), LedgerError> {
        storage::save_ledger(self.store.as_mut(), &self.ledger)
    }

    /// Materializes recurring entries and returns their ids. Flushes only when
    /// something was inserted.
    pub fn activate(&mut self) -> Result<Vec<Uuid>, LedgerError> {
        let today = self.today();
        let ids = self.stage(|ledger| Ok(RecurrenceService::materialize(ledger, today)))?;
        if ids.is_empty() {
            debug!(%today, "no recurring entries to materialize");
        }
        Ok(ids)
    }

    pub fn add_transaction(&mut self, draft: TransactionDraft) -> Result<Transaction, LedgerError> {
        let today = self.today();
        self.stage(|ledger| TransactionService::add(ledger, draft, today))
    }

    pub fn preview_removal(&self, id: Uuid) -> Result<RemovalPreview, LedgerError> {
        TransactionService::preview_removal(&self.ledger, id)
    }

    pub fn remove_transaction(
        &mut self,
        id: Uuid,
        decision: ReversalDecision,
    ) -> Result<Removal, LedgerError> {
        self.stage(|ledger| TransactionService::remove(ledger, id, decision))
    }

    pub fn clear_category(&mut self, id: Uuid) -> Result<String, LedgerError> {
        self.stage(|ledger| TransactionService::clear_category(ledger, id))
    }

    pub fn bank_transaction(&mut self, id: Uuid) -> Result<SavingsAdjustment, LedgerError> {
        self.stage(|ledger| SavingsService::bank(ledger, id))
    }

    pub fn set_setting(&mut self, key: SettingKey, value: i64) -> Result<(), LedgerError> {
        if value < 0 {
            return Err(LedgerError::Validation(format!(
                "{} must be a non-negative integer, got {value}",
                key.label()
            )));
        }
        self.stage(|ledger| {
            ledger.settings.set(key, value);
            Ok(())
        })?;
        info!(setting = key.label(), value, "setting updated");
        Ok(())
    }

    /// Zeroes savings and returns the previous balance.
    pub fn reset_savings(&mut self) -> Result<i64, LedgerError> {
        self.stage(|ledger| Ok(SavingsService::reset(ledger)))
    }

    pub fn add_report(&mut self, record: ReportRecord) -> Result<usize, LedgerError> {
        let mut staged = self.reports.clone();
        staged.append(record);
        storage::save_reports(self.store.as_mut(), staged.records())?;
        self.reports = staged;
        info!(count = self.reports.len(), "report added");
        Ok(self.reports.len())
    }

    /// Removes the report at zero-based `index`.
    pub fn remove_report(&mut self, index: usize) -> Result<ReportRecord, LedgerError> {
        let mut staged = self.reports.clone();
        let removed = staged.remove(index)?;
        storage::save_reports(self.store.as_mut(), staged.records())?;
        self.reports = staged;
        info!(month = %removed.month, "report removed");
        Ok(removed)
    }

    pub fn reports(&self) -> &[ReportRecord] {
        self.reports.records()
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn transactions(&self) -> Vec<&Transaction> {
        TransactionService::list(&self.ledger)
    }

    pub fn today_transactions(&self) -> Vec<&Transaction> {
        TransactionService::on(&self.ledger, self.today())
    }

    pub fn monthly_balance(&self, month: YearMonth) -> MonthlyBalance {
        self.ledger.monthly_balance(month)
    }

    pub fn budget_status(&self, month: YearMonth) -> BudgetStatus {
        self.ledger.budget_status(month)
    }

    pub fn category_totals(&self) -> Vec<CategoryTotal> {
        self.ledger.category_totals()
    }

    pub fn monthly_series(&self) -> MonthlySeries {
        self.ledger.monthly_series()
    }

    pub fn budget_series(&self) -> Vec<BudgetPoint> {
        self.ledger.budget_series()
    }

    pub fn goal_progress(&self) -> GoalProgress {
        self.ledger.goal_progress(self.today())
    }

    pub fn dashboard(&self) -> Dashboard<'_> {
        SummaryService::dashboard(&self.ledger, self.today())
    }

    pub fn settings(&self) -> &Settings {
        &self.ledger.settings
    }

    pub fn savings_balance(&self) -> i64 {
        self.ledger.savings_balance()
    }

    pub fn current_month(&self) -> YearMonth {
        YearMonth::of(self.today())
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Applies `mutation` to a copy and commits it after a successful flush. Errors from
    /// the mutation or the store leave the live ledger as it was.
    fn stage<T, F>(&mut self, mutation: F) -> Result<T, LedgerError>
    where
        F: FnOnce(&mut Ledger) -> Result<T, LedgerError>,
    {
        let mut staged = self.ledger.clone();
        let outcome = mutation(&mut staged)?;
        if staged == self.ledger {
            return Ok(outcome);
        }
        storage::save_ledger(self.store.as_mut(), &staged)?;
        self.ledger = staged;
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::FixedClock;
    use crate::storage::{MemoryStore, Result as StoreResult, SAVINGS_KEY, TRANSACTIONS_KEY};
    use std::sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    };

    fn june() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn manager() -> LedgerManager {
        LedgerManager::open(Box::new(MemoryStore::new()), Box::new(FixedClock(june()))).unwrap()
    }

    /// Store that can be switched to reject writes.
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryStore,
        failing: Arc<AtomicBool>,
    }

    impl KeyValueStore for FlakyStore {
        fn get(&self, key: &str) -> StoreResult<Option<String>> {
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: String) -> StoreResult<()> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(LedgerError::Storage("disk full".into()));
            }
            self.inner.set(key, value)
        }
    }

    #[test]
    fn add_flushes_transactions_and_balance() {
        let mut manager = manager();
        manager
            .add_transaction(TransactionDraft::income("salary", 50_000))
            .unwrap();
        assert_eq!(manager.savings_balance(), 50_000);
        assert_eq!(manager.store.get(SAVINGS_KEY).unwrap().as_deref(), Some("50000"));
        let raw = manager.store.get(TRANSACTIONS_KEY).unwrap().unwrap();
        assert!(raw.contains("salary"));
    }

    #[test]
    fn failed_flush_keeps_memory_state() {
        let failing = Arc::new(AtomicBool::new(false));
        let store = FlakyStore {
            inner: MemoryStore::new(),
            failing: Arc::clone(&failing),
        };
        let mut manager =
            LedgerManager::open(Box::new(store), Box::new(FixedClock(june()))).unwrap();
        manager
            .add_transaction(TransactionDraft::expense("food", 900))
            .unwrap();

        failing.store(true, Ordering::SeqCst);
        let err = manager
            .add_transaction(TransactionDraft::income("salary", 1_000))
            .unwrap_err();
        assert!(matches!(err, LedgerError::Storage(_)));
        assert_eq!(manager.transactions().len(), 1);
        assert_eq!(manager.savings_balance(), 0);
    }

    #[test]
    fn negative_settings_are_rejected() {
        let mut manager = manager();
        assert!(manager
            .set_setting(SettingKey::Budget, -1)
            .unwrap_err()
            .is_validation());
        manager.set_setting(SettingKey::Goal18, 0).unwrap();
        assert_eq!(manager.settings().goal_18, 0);
    }

    #[test]
    fn reset_keeps_transactions() {
        let mut manager = manager();
        manager
            .add_transaction(TransactionDraft::income("salary", 50_000))
            .unwrap();
        assert_eq!(manager.reset_savings().unwrap(), 50_000);
        assert_eq!(manager.savings_balance(), 0);
        assert_eq!(manager.transactions().len(), 1);
    }

    #[test]
    fn reopening_materializes_once() {
        let mut store = MemoryStore::new();
        let may = NaiveDate::from_ymd_opt(2024, 5, 20).unwrap();
        let seed = Ledger {
            transactions: vec![Transaction::new(
                may,
                crate::ledger::TransactionKind::Expense,
                "rent",
                70_000,
            )
            .repeating()],
            settings: Settings::default(),
        };
        storage::save_ledger(&mut store, &seed).unwrap();

        let mut manager =
            LedgerManager::open(Box::new(store), Box::new(FixedClock(june()))).unwrap();
        assert_eq!(manager.transactions().len(), 2);
        assert!(manager.activate().unwrap().is_empty());
        assert_eq!(manager.transactions().len(), 2);
    }

    #[test]
    fn reports_persist_independently() {
        let mut manager = manager();
        let month = manager.current_month();
        assert_eq!(manager.add_report(ReportRecord::new(month)).unwrap(), 1);
        assert!(matches!(
            manager.remove_report(4),
            Err(LedgerError::NotFound(_))
        ));
        manager.load().unwrap();
        assert_eq!(manager.reports().len(), 1);
        manager.remove_report(0).unwrap();
        assert!(manager.reports().is_empty());
    }
}
