//! Keeps the savings balance in step with banked income.
//!
//! The balance is authoritative and only moves through the operations below:
//! credit when income is created, debit when banked income is deleted, explicit
//! banking of an income that is not reflected yet, and an unconditional reset.

use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::LedgerError;
use crate::ledger::{Ledger, SavingsAdjustment, SavingsReversal, Transaction};

use super::ServiceResult;

pub struct SavingsService;

impl SavingsService {
    /// Credits a newly created income and marks it as banked. Expenses pass through.
    pub fn credit_new(
        ledger: &mut Ledger,
        transaction: &mut Transaction,
    ) -> Option<SavingsAdjustment> {
        if !transaction.is_income() {
            return None;
        }
        let adjustment = ledger.settings.savings.credit(transaction.amount);
        transaction.saved = true;
        info!(
            id = %transaction.id,
            amount = transaction.amount,
            balance = adjustment.balance,
            "income credited to savings"
        );
        Some(adjustment)
    }

    /// What deleting `transaction` would take out of savings, if anything.
    pub fn reversal_for(ledger: &Ledger, transaction: &Transaction) -> Option<SavingsReversal> {
        if !(transaction.is_income() && transaction.saved) {
            return None;
        }
        let balance = &ledger.settings.savings;
        Some(SavingsReversal {
            transaction_id: transaction.id,
            amount: transaction.amount,
            balance_before: balance.amount(),
            balance_after: balance.after_debit(transaction.amount),
        })
    }

    /// Debits a banked income that is being deleted, clamping at zero.
    pub fn reverse(ledger: &mut Ledger, transaction: &Transaction) -> Option<SavingsAdjustment> {
        if !(transaction.is_income() && transaction.saved) {
            return None;
        }
        let adjustment = ledger.settings.savings.debit(transaction.amount);
        if adjustment.was_clamped() {
            warn!(
                id = %transaction.id,
                requested = transaction.amount,
                applied = -adjustment.applied,
                "savings debit clamped at zero"
            );
        } else {
            info!(
                id = %transaction.id,
                amount = transaction.amount,
                balance = adjustment.balance,
                "income reversed from savings"
            );
        }
        Some(adjustment)
    }

    /// Banks an existing income whose amount is not reflected in savings yet.
    pub fn bank(ledger: &mut Ledger, id: Uuid) -> ServiceResult<SavingsAdjustment> {
        let transaction = ledger
            .transaction(id)
            .ok_or_else(|| LedgerError::NotFound(format!("transaction {id}")))?;
        if transaction.is_expense() {
            return Err(LedgerError::Validation(
                "expenses cannot be added to savings".into(),
            ));
        }
        if transaction.saved {
            return Err(LedgerError::Validation(
                "transaction is already reflected in savings".into(),
            ));
        }
        let amount = transaction.amount;
        let adjustment = ledger.settings.savings.credit(amount);
        if let Some(txn) = ledger.transaction_mut(id) {
            txn.saved = true;
        }
        info!(%id, amount, balance = adjustment.balance, "income banked");
        Ok(adjustment)
    }

    /// Zeroes the balance regardless of history and returns the previous amount.
    /// Transactions are left as they are.
    pub fn reset(ledger: &mut Ledger) -> i64 {
        let previous = ledger.settings.savings.reset();
        info!(previous, "savings reset");
        previous
    }
}
