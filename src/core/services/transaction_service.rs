//! Business logic helpers for creating and deleting transactions.

use chrono::NaiveDate;
use tracing::info;
use uuid::Uuid;

use crate::errors::LedgerError;
use crate::ledger::{
    Ledger, ReversalDecision, SavingsAdjustment, SavingsReversal, Transaction, TransactionDraft,
};

use super::{SavingsService, ServiceResult};

/// What a deletion would do, shown before the caller decides on the reversal.
#[derive(Debug, Clone, PartialEq)]
pub struct RemovalPreview {
    pub transaction: Transaction,
    /// Present only for income that is currently reflected in savings.
    pub reversal: Option<SavingsReversal>,
}

/// Outcome of a completed deletion.
#[derive(Debug, Clone, PartialEq)]
pub struct Removal {
    pub transaction: Transaction,
    pub adjustment: Option<SavingsAdjustment>,
}

pub struct TransactionService;

impl TransactionService {
    /// Validates `draft` and inserts it. Income is credited to savings on the way in.
    pub fn add(
        ledger: &mut Ledger,
        draft: TransactionDraft,
        today: NaiveDate,
    ) -> ServiceResult<Transaction> {
        let transaction = draft.validate(today)?;
        Ok(Self::insert(ledger, transaction))
    }

    /// Inserts an already valid transaction through the savings credit path.
    pub fn insert(ledger: &mut Ledger, mut transaction: Transaction) -> Transaction {
        SavingsService::credit_new(ledger, &mut transaction);
        info!(
            id = %transaction.id,
            kind = %transaction.kind,
            category = %transaction.category,
            amount = transaction.amount,
            date = %transaction.date,
            "transaction added"
        );
        ledger.add_transaction(transaction.clone());
        transaction
    }

    pub fn preview_removal(ledger: &Ledger, id: Uuid) -> ServiceResult<RemovalPreview> {
        let transaction = Self::find(ledger, id)?.clone();
        let reversal = SavingsService::reversal_for(ledger, &transaction);
        Ok(RemovalPreview {
            transaction,
            reversal,
        })
    }

    /// Deletes the transaction. Banked income is debited from savings only when the
    /// caller chose [`ReversalDecision::Reverse`].
    pub fn remove(
        ledger: &mut Ledger,
        id: Uuid,
        decision: ReversalDecision,
    ) -> ServiceResult<Removal> {
        let transaction = ledger
            .remove_transaction(id)
            .ok_or_else(|| not_found(id))?;
        let adjustment = match decision {
            ReversalDecision::Reverse => SavingsService::reverse(ledger, &transaction),
            ReversalDecision::Keep => None,
        };
        info!(
            %id,
            kind = %transaction.kind,
            amount = transaction.amount,
            reversed = adjustment.is_some(),
            "transaction removed"
        );
        Ok(Removal {
            transaction,
            adjustment,
        })
    }

    /// Blanks the category of a transaction. The returned value is the old category.
    pub fn clear_category(ledger: &mut Ledger, id: Uuid) -> ServiceResult<String> {
        let txn = ledger.transaction_mut(id).ok_or_else(|| not_found(id))?;
        let previous = std::mem::take(&mut txn.category);
        info!(%id, previous = %previous, "category cleared");
        Ok(previous)
    }

    /// Returns a snapshot of the ledger's transactions in insertion order.
    pub fn list(ledger: &Ledger) -> Vec<&Transaction> {
        ledger.transactions.iter().collect()
    }

    pub fn on(ledger: &Ledger, date: NaiveDate) -> Vec<&Transaction> {
        ledger.transactions_on(date)
    }

    fn find(ledger: &Ledger, id: Uuid) -> ServiceResult<&Transaction> {
        ledger.transaction(id).ok_or_else(|| not_found(id))
    }
}

fn not_found(id: Uuid) -> LedgerError {
    LedgerError::NotFound(format!("transaction {id}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    #[test]
    fn rejected_drafts_leave_ledger_untouched() {
        let mut ledger = Ledger::default();
        let blank =
            TransactionService::add(&mut ledger, TransactionDraft::expense(" ", 10), today());
        let zero =
            TransactionService::add(&mut ledger, TransactionDraft::expense("food", 0), today());
        assert!(blank.unwrap_err().is_validation());
        assert!(zero.unwrap_err().is_validation());
        assert_eq!(ledger.transaction_count(), 0);
        assert_eq!(ledger.savings_balance(), 0);
    }

    #[test]
    fn income_is_credited_and_marked() {
        let mut ledger = Ledger::default();
        let txn = TransactionService::add(
            &mut ledger,
            TransactionDraft::income("salary", 50_000),
            today(),
        )
        .unwrap();
        assert!(txn.saved);
        assert_eq!(ledger.savings_balance(), 50_000);
        assert!(ledger.transaction(txn.id).unwrap().saved);

        let expense =
            TransactionService::add(&mut ledger, TransactionDraft::expense("food", 800), today())
                .unwrap();
        assert!(!expense.saved);
        assert_eq!(ledger.savings_balance(), 50_000);
    }

    #[test]
    fn confirmed_removal_reverses_income() {
        let mut ledger = Ledger::default();
        ledger.settings.savings.credit(10_000);
        let txn =
            TransactionService::add(&mut ledger, TransactionDraft::income("bonus", 3_000), today())
                .unwrap();

        let preview = TransactionService::preview_removal(&ledger, txn.id).unwrap();
        let reversal = preview.reversal.unwrap();
        assert_eq!(reversal.amount, 3_000);
        assert_eq!(reversal.balance_after, 10_000);

        let removal =
            TransactionService::remove(&mut ledger, txn.id, ReversalDecision::Reverse).unwrap();
        assert_eq!(removal.adjustment.unwrap().applied, -3_000);
        assert_eq!(ledger.savings_balance(), 10_000);
        assert_eq!(ledger.transaction_count(), 0);
    }

    #[test]
    fn declined_reversal_still_deletes() {
        let mut ledger = Ledger::default();
        let txn =
            TransactionService::add(&mut ledger, TransactionDraft::income("gift", 4_000), today())
                .unwrap();
        let removal =
            TransactionService::remove(&mut ledger, txn.id, ReversalDecision::Keep).unwrap();
        assert!(removal.adjustment.is_none());
        assert_eq!(ledger.savings_balance(), 4_000);
        assert!(ledger.transaction(txn.id).is_none());
    }

    #[test]
    fn expense_removal_has_no_reversal() {
        let mut ledger = Ledger::default();
        let txn =
            TransactionService::add(&mut ledger, TransactionDraft::expense("rent", 60_000), today())
                .unwrap();
        let preview = TransactionService::preview_removal(&ledger, txn.id).unwrap();
        assert!(preview.reversal.is_none());
        let removal =
            TransactionService::remove(&mut ledger, txn.id, ReversalDecision::Reverse).unwrap();
        assert!(removal.adjustment.is_none());
    }

    #[test]
    fn unknown_ids_are_not_found() {
        let mut ledger = Ledger::default();
        let id = Uuid::new_v4();
        assert!(matches!(
            TransactionService::remove(&mut ledger, id, ReversalDecision::Reverse),
            Err(LedgerError::NotFound(_))
        ));
        assert!(TransactionService::preview_removal(&ledger, id).is_err());
        assert!(TransactionService::clear_category(&mut ledger, id).is_err());
    }

    #[test]
    fn clear_category_blanks_the_field() {
        let mut ledger = Ledger::default();
        let txn =
            TransactionService::add(&mut ledger, TransactionDraft::expense("misc", 100), today())
                .unwrap();
        let previous = TransactionService::clear_category(&mut ledger, txn.id).unwrap();
        assert_eq!(previous, "misc");
        assert!(ledger.transaction(txn.id).unwrap().category.is_empty());
    }
}
