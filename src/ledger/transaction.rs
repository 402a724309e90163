use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::LedgerError;

use super::period::YearMonth;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn label(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TransactionKind {
    type Err = LedgerError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "income" | "in" => Ok(TransactionKind::Income),
            "expense" | "out" => Ok(TransactionKind::Expense),
            other => Err(LedgerError::Validation(format!(
                "unknown transaction type `{other}` (expected income or expense)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Transaction {
    /// Records written before ids existed receive a fresh one on load.
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub category: String,
    pub amount: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
    #[serde(default)]
    pub repeat: bool,
    /// Set while the amount is reflected in the savings balance.
    #[serde(default)]
    pub saved: bool,
}

impl Transaction {
    pub fn new(
        date: NaiveDate,
        kind: TransactionKind,
        category: impl Into<String>,
        amount: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            kind,
            category: category.into(),
            amount,
            memo: None,
            repeat: false,
            saved: false,
        }
    }

    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = normalize_memo(Some(memo.into()));
        self
    }

    pub fn repeating(mut self) -> Self {
        self.repeat = true;
        self
    }

    pub fn is_income(&self) -> bool {
        self.kind == TransactionKind::Income
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionKind::Expense
    }

    pub fn month(&self) -> YearMonth {
        YearMonth::of(self.date)
    }

    /// Income counts positively, expense negatively.
    pub fn signed_amount(&self) -> i64 {
        match self.kind {
            TransactionKind::Income => self.amount,
            TransactionKind::Expense => self.amount.saturating_neg(),
        }
    }
}

/// Unvalidated user input for a new transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionDraft {
    pub date: Option<NaiveDate>,
    pub kind: TransactionKind,
    pub category: String,
    pub amount: i64,
    pub memo: Option<String>,
    pub repeat: bool,
}

impl TransactionDraft {
    pub fn new(kind: TransactionKind, category: impl Into<String>, amount: i64) -> Self {
        Self {
            date: None,
            kind,
            category: category.into(),
            amount,
            memo: None,
            repeat: false,
        }
    }

    pub fn income(category: impl Into<String>, amount: i64) -> Self {
        Self::new(TransactionKind::Income, category, amount)
    }

    pub fn expense(category: impl Into<String>, amount: i64) -> Self {
        Self::new(TransactionKind::Expense, category, amount)
    }

    pub fn on(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = Some(memo.into());
        self
    }

    pub fn repeating(mut self, repeat: bool) -> Self {
        self.repeat = repeat;
        self
    }

    /// Validates the draft and builds a transaction dated `today` when no date was given.
    pub fn validate(self, today: NaiveDate) -> Result<Transaction, LedgerError> {
        let category = self.category.trim();
        if category.is_empty() {
            return Err(LedgerError::Validation("category is required".into()));
        }
        if self.amount <= 0 {
            return Err(LedgerError::Validation(format!(
                "amount must be a positive number, got {}",
                self.amount
            )));
        }
        Ok(Transaction {
            id: Uuid::new_v4(),
            date: self.date.unwrap_or(today),
            kind: self.kind,
            category: category.to_string(),
            amount: self.amount,
            memo: normalize_memo(self.memo),
            repeat: self.repeat,
            saved: false,
        })
    }
}

fn normalize_memo(memo: Option<String>) -> Option<String> {
    memo.map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    #[test]
    fn validate_defaults_date_and_trims_fields() {
        let txn = TransactionDraft::expense("  food ", 1200)
            .memo("   ")
            .validate(today())
            .unwrap();
        assert_eq!(txn.date, today());
        assert_eq!(txn.category, "food");
        assert_eq!(txn.memo, None);
        assert!(!txn.saved);
    }

    #[test]
    fn validate_rejects_blank_category() {
        let err = TransactionDraft::expense("   ", 100)
            .validate(today())
            .unwrap_err();
        assert!(err.is_validation(), "unexpected error: {err:?}");
    }

    #[test]
    fn validate_rejects_non_positive_amounts() {
        for amount in [0, -5] {
            let err = TransactionDraft::income("salary", amount)
                .validate(today())
                .unwrap_err();
            assert!(err.to_string().contains("positive"), "unexpected: {err}");
        }
    }

    #[test]
    fn deserializes_legacy_records_without_id() {
        let json = r#"{"date":"2024-01-05","type":"income","category":"salary",
            "amount":50000,"memo":"","repeat":false,"saved":true}"#;
        let txn: Transaction = serde_json::from_str(json).unwrap();
        assert!(!txn.id.is_nil());
        assert_eq!(txn.kind, TransactionKind::Income);
        assert!(txn.saved);
        assert_eq!(txn.memo.as_deref(), Some(""));
    }

    #[test]
    fn serializes_kind_under_type_key() {
        let txn = Transaction::new(today(), TransactionKind::Expense, "rent", 80000);
        let value = serde_json::to_value(&txn).unwrap();
        assert_eq!(value["type"], "expense");
        assert_eq!(value["date"], "2024-06-15");
        assert!(value.get("memo").is_none());
    }

    #[test]
    fn kind_parses_common_spellings() {
        assert_eq!("Income".parse::<TransactionKind>().unwrap(), TransactionKind::Income);
        assert_eq!("out".parse::<TransactionKind>().unwrap(), TransactionKind::Expense);
        assert!("transfer".parse::<TransactionKind>().is_err());
    }
}
