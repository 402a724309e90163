use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Banked income kept apart from the raw transaction history.
///
/// The balance never drops below zero; debits larger than the balance clamp.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(transparent)]
pub struct SavingsBalance(i64);

impl SavingsBalance {
    /// Builds a balance from a stored value, clamping negatives to zero.
    pub fn new(amount: i64) -> Self {
        Self(amount.max(0))
    }

    pub fn amount(&self) -> i64 {
        self.0
    }

    pub fn credit(&mut self, amount: i64) -> SavingsAdjustment {
        let before = self.0;
        self.0 = before.saturating_add(amount.max(0));
        SavingsAdjustment {
            requested: amount,
            applied: self.0 - before,
            balance: self.0,
        }
    }

    pub fn debit(&mut self, amount: i64) -> SavingsAdjustment {
        let before = self.0;
        self.0 = before.saturating_sub(amount.max(0)).max(0);
        SavingsAdjustment {
            requested: -amount,
            applied: self.0 - before,
            balance: self.0,
        }
    }

    /// Zeroes the balance and returns what it held.
    pub fn reset(&mut self) -> i64 {
        std::mem::take(&mut self.0)
    }

    /// Balance that a debit of `amount` would leave behind.
    pub fn after_debit(&self, amount: i64) -> i64 {
        self.0.saturating_sub(amount.max(0)).max(0)
    }
}

/// Outcome of a single balance change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SavingsAdjustment {
    /// Signed change that was asked for.
    pub requested: i64,
    /// Signed change actually applied after clamping.
    pub applied: i64,
    pub balance: i64,
}

impl SavingsAdjustment {
    pub fn was_clamped(&self) -> bool {
        self.requested != self.applied
    }
}

/// Confirmation payload shown before a banked income is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SavingsReversal {
    pub transaction_id: Uuid,
    /// Amount the deletion would take out of savings.
    pub amount: i64,
    pub balance_before: i64,
    pub balance_after: i64,
}

/// Caller's answer to the reversal prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReversalDecision {
    Reverse,
    Keep,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debit_clamps_at_zero() {
        let mut balance = SavingsBalance::new(3_000);
        let adjustment = balance.debit(5_000);
        assert_eq!(balance.amount(), 0);
        assert_eq!(adjustment.applied, -3_000);
        assert!(adjustment.was_clamped());
    }

    #[test]
    fn credit_then_debit_round_trips() {
        let mut balance = SavingsBalance::new(10_000);
        balance.credit(2_500);
        let adjustment = balance.debit(2_500);
        assert_eq!(balance.amount(), 10_000);
        assert!(!adjustment.was_clamped());
    }

    #[test]
    fn reset_returns_previous_amount() {
        let mut balance = SavingsBalance::new(42);
        assert_eq!(balance.reset(), 42);
        assert_eq!(balance.amount(), 0);
    }

    #[test]
    fn negative_stored_values_clamp() {
        assert_eq!(SavingsBalance::new(-10).amount(), 0);
        assert_eq!(SavingsBalance::new(100).after_debit(250), 0);
    }
}
