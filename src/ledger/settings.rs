use serde::{Deserialize, Serialize};

use super::savings::SavingsBalance;

pub const DEFAULT_BUDGET: i64 = 100_000;
pub const DEFAULT_GOAL_YEAR: i64 = 900_000;
pub const DEFAULT_GOAL_18: i64 = 1_250_000;

/// Scalar ledger settings persisted next to the transactions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Settings {
    /// Monthly expense ceiling.
    pub budget: i64,
    /// Year-to-date savings target.
    pub goal_year: i64,
    /// Trailing 18-month savings target.
    pub goal_18: i64,
    pub savings: SavingsBalance,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            budget: DEFAULT_BUDGET,
            goal_year: DEFAULT_GOAL_YEAR,
            goal_18: DEFAULT_GOAL_18,
            savings: SavingsBalance::default(),
        }
    }
}

/// Adjustable settings exposed to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKey {
    Budget,
    GoalYear,
    Goal18,
}

impl SettingKey {
    pub fn label(&self) -> &'static str {
        match self {
            SettingKey::Budget => "budget",
            SettingKey::GoalYear => "goal-year",
            SettingKey::Goal18 => "goal-18",
        }
    }
}

impl Settings {
    pub fn get(&self, key: SettingKey) -> i64 {
        match key {
            SettingKey::Budget => self.budget,
            SettingKey::GoalYear => self.goal_year,
            SettingKey::Goal18 => self.goal_18,
        }
    }

    pub fn set(&mut self, key: SettingKey, value: i64) {
        match key {
            SettingKey::Budget => self.budget = value,
            SettingKey::GoalYear => self.goal_year = value,
            SettingKey::Goal18 => self.goal_18 = value,
        }
    }
}
