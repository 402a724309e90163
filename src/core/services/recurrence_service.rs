use chrono::NaiveDate;
use tracing::info;
use uuid::Uuid;

use crate::ledger::{materialize_month, Ledger};

use super::TransactionService;

pub struct RecurrenceService;

impl RecurrenceService {
    /// Inserts this month's instance of every recurring category that lacks one and
    /// returns the new ids. Running it again in the same month inserts nothing.
    pub fn materialize(ledger: &mut Ledger, today: NaiveDate) -> Vec<Uuid> {
        let pending = materialize_month(today, &ledger.transactions);
        let ids: Vec<Uuid> = pending
            .into_iter()
            .map(|txn| TransactionService::insert(ledger, txn).id)
            .collect();
        if !ids.is_empty() {
            info!(count = ids.len(), %today, "recurring transactions materialized");
        }
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{Transaction, TransactionKind};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn repeated_runs_insert_once() {
        let mut ledger = Ledger::default();
        ledger.add_transaction(
            Transaction::new(date(2024, 5, 25), TransactionKind::Expense, "rent", 70_000)
                .repeating(),
        );
        ledger.add_transaction(
            Transaction::new(date(2024, 5, 10), TransactionKind::Expense, "phone", 3_000)
                .repeating(),
        );

        let today = date(2024, 6, 12);
        assert_eq!(RecurrenceService::materialize(&mut ledger, today).len(), 2);
        for _ in 0..3 {
            assert!(RecurrenceService::materialize(&mut ledger, today).is_empty());
        }
        let june: Vec<_> = ledger
            .transactions
            .iter()
            .filter(|txn| txn.date == date(2024, 6, 1))
            .collect();
        assert_eq!(june.len(), 2);
        assert!(june.iter().all(|txn| txn.repeat));
    }

    #[test]
    fn recurring_income_is_credited() {
        let mut ledger = Ledger::default();
        let mut salary =
            Transaction::new(date(2024, 5, 1), TransactionKind::Income, "salary", 200_000)
                .repeating();
        salary.saved = true;
        ledger.add_transaction(salary);

        let ids = RecurrenceService::materialize(&mut ledger, date(2024, 6, 3));
        assert_eq!(ids.len(), 1);
        assert_eq!(ledger.savings_balance(), 200_000);
        assert!(ledger.transaction(ids[0]).unwrap().saved);
    }
}
