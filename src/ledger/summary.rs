//! Derived metrics computed from a ledger snapshot.
//!
//! Everything here is a pure read: the functions take the ledger by shared
//! reference and may be called as often as the presentation layer needs.

use std::{cmp::Ordering, collections::HashMap, fmt};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{
    period::{DateWindow, YearMonth},
    Ledger, Transaction, TransactionKind,
};
use crate::utils::format::group_thousands;

const GOOD_THRESHOLD: u8 = 70;
const WARN_THRESHOLD: u8 = 40;
const TRAILING_WINDOW_MONTHS: u32 = 18;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct MonthlyBalance {
    pub month: YearMonth,
    pub income: i64,
    pub expense: i64,
    pub balance: i64,
}

impl MonthlyBalance {
    pub fn is_surplus(&self) -> bool {
        self.balance >= 0
    }
}

impl fmt::Display for MonthlyBalance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = if self.is_surplus() { "surplus" } else { "deficit" };
        write!(f, "{} {}: {}", self.month, label, group_thousands(self.balance))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BudgetState {
    WithinBudget,
    OverBudget,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BudgetStatus {
    pub month: YearMonth,
    pub expense: i64,
    pub budget: i64,
    pub state: BudgetState,
}

impl BudgetStatus {
    fn from_parts(month: YearMonth, expense: i64, budget: i64) -> Self {
        let state = match expense.cmp(&budget) {
            Ordering::Greater => BudgetState::OverBudget,
            Ordering::Less | Ordering::Equal => BudgetState::WithinBudget,
        };
        Self {
            month,
            expense,
            budget,
            state,
        }
    }

    pub fn is_over(&self) -> bool {
        self.state == BudgetState::OverBudget
    }

    /// Expense minus budget: positive when over, negative when under.
    pub fn delta(&self) -> i64 {
        self.expense.saturating_sub(self.budget)
    }

    pub fn over_by(&self) -> i64 {
        self.delta().max(0)
    }

    pub fn remaining(&self) -> i64 {
        self.delta().saturating_neg().max(0)
    }
}

impl fmt::Display for BudgetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let expense = group_thousands(self.expense);
        let budget = group_thousands(self.budget);
        match self.state {
            BudgetState::OverBudget => write!(
                f,
                "expense {expense} exceeds budget {budget} by {}",
                group_thousands(self.over_by())
            ),
            BudgetState::WithinBudget => write!(f, "expense {expense} / budget {budget}"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryTotal {
    pub category: String,
    pub total: i64,
}

/// Parallel per-month series, months ascending.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MonthlySeries {
    pub months: Vec<YearMonth>,
    pub income: Vec<i64>,
    pub expense: Vec<i64>,
    pub net: Vec<i64>,
}

impl MonthlySeries {
    pub fn len(&self) -> usize {
        self.months.len()
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BudgetPoint {
    pub month: YearMonth,
    pub actual: i64,
    pub budget: i64,
    pub over: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ProgressBand {
    Good,
    Warn,
    Bad,
}

impl ProgressBand {
    pub fn classify(percent: u8) -> Self {
        if percent >= GOOD_THRESHOLD {
            ProgressBand::Good
        } else if percent >= WARN_THRESHOLD {
            ProgressBand::Warn
        } else {
            ProgressBand::Bad
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProgressBand::Good => "good",
            ProgressBand::Warn => "warn",
            ProgressBand::Bad => "bad",
        }
    }
}

impl fmt::Display for ProgressBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Net cash flow plus savings over one window, measured against a target.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct WindowProgress {
    pub window: DateWindow,
    pub net: i64,
    pub target: i64,
    /// Unclamped percentage; zero when the target is zero.
    pub ratio: f64,
}

impl WindowProgress {
    fn measure(window: DateWindow, net: i64, target: i64) -> Self {
        let ratio = if target == 0 {
            0.0
        } else {
            net as f64 / target as f64 * 100.0
        };
        Self {
            window,
            net,
            target,
            ratio,
        }
    }

    /// Rounded percentage clamped to `0..=100` for display.
    pub fn percent(&self) -> u8 {
        if !self.ratio.is_finite() {
            return 0;
        }
        self.ratio.round().clamp(0.0, 100.0) as u8
    }

    pub fn band(&self) -> ProgressBand {
        ProgressBand::classify(self.percent())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GoalProgress {
    pub year: WindowProgress,
    pub trailing_18: WindowProgress,
    pub month: WindowProgress,
}

impl Ledger {
    pub fn monthly_balance(&self, month: YearMonth) -> MonthlyBalance {
        let (income, expense) = totals(self.in_month(month));
        MonthlyBalance {
            month,
            income,
            expense,
            balance: income.saturating_sub(expense),
        }
    }

    pub fn budget_status(&self, month: YearMonth) -> BudgetStatus {
        let (_, expense) = totals(self.in_month(month));
        BudgetStatus::from_parts(month, expense, self.settings.budget)
    }

    /// Expense totals per category over the whole history, in first-seen order.
    pub fn category_totals(&self) -> Vec<CategoryTotal> {
        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut result: Vec<CategoryTotal> = Vec::new();
        for txn in self.transactions.iter().filter(|txn| txn.is_expense()) {
            let slot = *index.entry(txn.category.as_str()).or_insert_with(|| {
                result.push(CategoryTotal {
                    category: txn.category.clone(),
                    total: 0,
                });
                result.len() - 1
            });
            result[slot].total = result[slot].total.saturating_add(txn.amount);
        }
        result
    }

    pub fn monthly_series(&self) -> MonthlySeries {
        let mut months: Vec<YearMonth> = self.transactions.iter().map(Transaction::month).collect();
        months.sort();
        months.dedup();

        let mut series = MonthlySeries::default();
        for month in months {
            let (income, expense) = totals(self.in_month(month));
            series.months.push(month);
            series.income.push(income);
            series.expense.push(expense);
            series.net.push(income.saturating_sub(expense));
        }
        series
    }

    /// Actual expense against the current budget for every month in [`Ledger::monthly_series`].
    pub fn budget_series(&self) -> Vec<BudgetPoint> {
        let budget = self.settings.budget;
        let series = self.monthly_series();
        series
            .months
            .iter()
            .zip(series.expense.iter())
            .map(|(month, actual)| BudgetPoint {
                month: *month,
                actual: *actual,
                budget,
                over: *actual > budget,
            })
            .collect()
    }

    pub fn goal_progress(&self, now: NaiveDate) -> GoalProgress {
        let settings = &self.settings;
        let year = DateWindow::year_to_date(now);
        let trailing = DateWindow::trailing_months(now, TRAILING_WINDOW_MONTHS);
        let month = DateWindow::month_to_date(now);
        GoalProgress {
            year: WindowProgress::measure(year, self.window_net(year), settings.goal_year),
            trailing_18: WindowProgress::measure(
                trailing,
                self.window_net(trailing),
                settings.goal_18,
            ),
            month: WindowProgress::measure(month, self.window_net(month), settings.budget),
        }
    }

    /// Income minus expense inside `window`, plus the savings balance.
    /// Sums saturate at the `i64` bounds.
    pub fn window_net(&self, window: DateWindow) -> i64 {
        self.transactions
            .iter()
            .filter(|txn| window.contains(txn.date))
            .map(Transaction::signed_amount)
            .fold(self.savings_balance(), i64::saturating_add)
    }

    fn in_month(&self, month: YearMonth) -> impl Iterator<Item = &Transaction> {
        self.transactions
            .iter()
            .filter(move |txn| month.contains(txn.date))
    }
}

fn totals<'a>(transactions: impl Iterator<Item = &'a Transaction>) -> (i64, i64) {
    transactions.fold((0, 0), |(income, expense), txn| match txn.kind {
        TransactionKind::Income => (income.saturating_add(txn.amount), expense),
        TransactionKind::Expense => (income, expense.saturating_add(txn.amount)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{SavingsBalance, Settings};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn month(value: &str) -> YearMonth {
        value.parse().unwrap()
    }

    fn push(ledger: &mut Ledger, d: NaiveDate, kind: TransactionKind, category: &str, amount: i64) {
        ledger.add_transaction(Transaction::new(d, kind, category, amount));
    }

    #[test]
    fn empty_ledger_yields_zero_aggregates() {
        let ledger = Ledger::default();
        let balance = ledger.monthly_balance(month("2024-06"));
        assert_eq!((balance.income, balance.expense, balance.balance), (0, 0, 0));
        assert!(balance.is_surplus());
        assert!(ledger.category_totals().is_empty());
        assert!(ledger.monthly_series().is_empty());
        assert!(ledger.budget_series().is_empty());

        let progress = ledger.goal_progress(date(2024, 6, 30));
        for window in [progress.year, progress.trailing_18, progress.month] {
            assert_eq!(window.percent(), 0);
            assert_eq!(window.band(), ProgressBand::Bad);
        }
    }

    #[test]
    fn budget_status_reports_overrun() {
        let mut ledger = Ledger::default();
        push(&mut ledger, date(2024, 6, 10), TransactionKind::Expense, "food", 40_000);
        push(&mut ledger, date(2024, 6, 20), TransactionKind::Expense, "food", 70_000);
        push(&mut ledger, date(2024, 7, 1), TransactionKind::Expense, "food", 99_000);

        let status = ledger.budget_status(month("2024-06"));
        assert!(status.is_over());
        assert_eq!(status.over_by(), 10_000);
        assert_eq!(status.remaining(), 0);
        assert_eq!(
            status.to_string(),
            "expense 110,000 exceeds budget 100,000 by 10,000"
        );

        let july = ledger.budget_status(month("2024-07"));
        assert!(!july.is_over());
        assert_eq!(july.remaining(), 1_000);
    }

    #[test]
    fn budget_exactly_met_is_within_budget() {
        let mut ledger = Ledger::default();
        push(&mut ledger, date(2024, 6, 1), TransactionKind::Expense, "rent", 100_000);
        assert_eq!(
            ledger.budget_status(month("2024-06")).state,
            BudgetState::WithinBudget
        );
    }

    #[test]
    fn monthly_balance_flags_deficit() {
        let mut ledger = Ledger::default();
        push(&mut ledger, date(2024, 2, 1), TransactionKind::Income, "salary", 1_000);
        push(&mut ledger, date(2024, 2, 5), TransactionKind::Expense, "food", 1_500);
        let balance = ledger.monthly_balance(month("2024-02"));
        assert_eq!(balance.balance, -500);
        assert!(!balance.is_surplus());
    }

    #[test]
    fn category_totals_match_expense_sum() {
        let mut ledger = Ledger::default();
        push(&mut ledger, date(2024, 1, 3), TransactionKind::Expense, "food", 1_200);
        push(&mut ledger, date(2024, 1, 8), TransactionKind::Expense, "rent", 60_000);
        push(&mut ledger, date(2024, 2, 3), TransactionKind::Expense, "food", 800);
        push(&mut ledger, date(2024, 2, 4), TransactionKind::Income, "salary", 200_000);

        let totals = ledger.category_totals();
        let names: Vec<&str> = totals.iter().map(|t| t.category.as_str()).collect();
        assert_eq!(names, vec!["food", "rent"]);
        assert_eq!(totals[0].total, 2_000);

        let sum: i64 = totals.iter().map(|t| t.total).sum();
        let expected: i64 = ledger
            .transactions
            .iter()
            .filter(|t| t.is_expense())
            .map(|t| t.amount)
            .sum();
        assert_eq!(sum, expected);
    }

    #[test]
    fn monthly_series_is_sorted_with_parallel_values() {
        let mut ledger = Ledger::default();
        push(&mut ledger, date(2024, 3, 3), TransactionKind::Expense, "food", 300);
        push(&mut ledger, date(2023, 12, 1), TransactionKind::Income, "salary", 1_000);
        push(&mut ledger, date(2024, 3, 9), TransactionKind::Income, "salary", 1_000);

        let series = ledger.monthly_series();
        let keys: Vec<String> = series.months.iter().map(ToString::to_string).collect();
        assert_eq!(keys, vec!["2023-12", "2024-03"]);
        assert_eq!(series.income, vec![1_000, 1_000]);
        assert_eq!(series.expense, vec![0, 300]);
        assert_eq!(series.net, vec![1_000, 700]);

        let points = ledger.budget_series();
        assert_eq!(points.len(), 2);
        assert!(!points[1].over);
    }

    #[test]
    fn year_progress_lands_in_warn_band() {
        let mut ledger = Ledger::new(Settings {
            goal_year: 900_000,
            ..Settings::default()
        });
        push(&mut ledger, date(2024, 2, 25), TransactionKind::Income, "salary", 300_000);
        push(&mut ledger, date(2024, 9, 25), TransactionKind::Income, "bonus", 200_000);
        push(&mut ledger, date(2024, 5, 5), TransactionKind::Expense, "travel", 100_000);
        push(&mut ledger, date(2023, 12, 31), TransactionKind::Income, "salary", 999_999);

        let progress = ledger.goal_progress(date(2024, 12, 31));
        assert_eq!(progress.year.net, 400_000);
        assert_eq!(progress.year.percent(), 44);
        assert_eq!(progress.year.band(), ProgressBand::Warn);
    }

    #[test]
    fn savings_balance_is_added_to_every_window() {
        let mut ledger = Ledger::new(Settings {
            budget: 50_000,
            goal_year: 100_000,
            goal_18: 100_000,
            savings: SavingsBalance::new(80_000),
        });
        push(&mut ledger, date(2024, 6, 2), TransactionKind::Expense, "food", 10_000);

        let progress = ledger.goal_progress(date(2024, 6, 30));
        assert_eq!(progress.year.net, 70_000);
        assert_eq!(progress.trailing_18.net, 70_000);
        assert_eq!(progress.month.net, 70_000);
        assert_eq!(progress.month.target, 50_000);
        assert!(progress.month.ratio > 100.0);
        assert_eq!(progress.month.percent(), 100);
        assert_eq!(progress.month.band(), ProgressBand::Good);
    }

    #[test]
    fn negative_ratio_clamps_to_zero_for_display() {
        let mut ledger = Ledger::default();
        push(&mut ledger, date(2024, 6, 2), TransactionKind::Expense, "food", 10_000);
        let progress = ledger.goal_progress(date(2024, 6, 30));
        assert!(progress.month.ratio < 0.0);
        assert_eq!(progress.month.percent(), 0);
    }

    #[test]
    fn zero_target_yields_zero_ratio() {
        let mut ledger = Ledger::new(Settings {
            goal_18: 0,
            ..Settings::default()
        });
        push(&mut ledger, date(2024, 6, 2), TransactionKind::Income, "gift", 10_000);
        let progress = ledger.goal_progress(date(2024, 6, 30));
        assert_eq!(progress.trailing_18.ratio, 0.0);
        assert_eq!(progress.trailing_18.percent(), 0);
    }

    #[test]
    fn trailing_window_excludes_older_entries() {
        let mut ledger = Ledger::default();
        push(&mut ledger, date(2022, 12, 31), TransactionKind::Income, "old", 5_000);
        push(&mut ledger, date(2023, 1, 1), TransactionKind::Income, "edge", 7_000);
        let progress = ledger.goal_progress(date(2024, 7, 1));
        assert_eq!(progress.trailing_18.window.start, date(2023, 1, 1));
        assert_eq!(progress.trailing_18.net, 7_000);
    }

    #[test]
    fn huge_amounts_saturate_instead_of_overflowing() {
        let mut ledger = Ledger::default();
        push(&mut ledger, date(2024, 6, 2), TransactionKind::Income, "salary", i64::MAX);
        let half = i64::MAX / 2 + 1;
        push(&mut ledger, date(2024, 6, 3), TransactionKind::Expense, "rent", half);
        push(&mut ledger, date(2024, 6, 4), TransactionKind::Expense, "rent", half);

        assert_eq!(ledger.category_totals()[0].total, i64::MAX);
        let june = ledger.monthly_balance(month("2024-06"));
        assert_eq!((june.income, june.expense, june.balance), (i64::MAX, i64::MAX, 0));
        assert_eq!(ledger.budget_status(month("2024-06")).over_by(), i64::MAX - 100_000);
        assert_eq!(ledger.monthly_series().net, vec![0]);

        let progress = ledger.goal_progress(date(2024, 6, 30));
        assert_eq!(progress.year.net, -1);
        assert_eq!(progress.month.percent(), 0);
    }

    #[test]
    fn band_thresholds() {
        assert_eq!(ProgressBand::classify(70), ProgressBand::Good);
        assert_eq!(ProgressBand::classify(69), ProgressBand::Warn);
        assert_eq!(ProgressBand::classify(40), ProgressBand::Warn);
        assert_eq!(ProgressBand::classify(39), ProgressBand::Bad);
    }
}
