use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{settings::Settings, transaction::Transaction};

/// Transactions plus the scalar settings they are measured against.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Ledger {
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub settings: Settings,
}

impl Ledger {
    pub fn new(settings: Settings) -> Self {
        Self {
            transactions: Vec::new(),
            settings,
        }
    }

    pub fn add_transaction(&mut self, transaction: Transaction) -> Uuid {
        let id = transaction.id;
        self.transactions.push(transaction);
        id
    }

    pub fn remove_transaction(&mut self, id: Uuid) -> Option<Transaction> {
        let index = self.position(id)?;
        Some(self.transactions.remove(index))
    }

    pub fn transaction(&self, id: Uuid) -> Option<&Transaction> {
        self.transactions.iter().find(|txn| txn.id == id)
    }

    pub fn transaction_mut(&mut self, id: Uuid) -> Option<&mut Transaction> {
        self.transactions.iter_mut().find(|txn| txn.id == id)
    }

    pub fn position(&self, id: Uuid) -> Option<usize> {
        self.transactions.iter().position(|txn| txn.id == id)
    }

    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }

    pub fn transactions_on(&self, date: NaiveDate) -> Vec<&Transaction> {
        self.transactions
            .iter()
            .filter(|txn| txn.date == date)
            .collect()
    }

    pub fn savings_balance(&self) -> i64 {
        self.settings.savings.amount()
    }
}
