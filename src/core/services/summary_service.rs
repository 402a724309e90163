use chrono::NaiveDate;

use crate::ledger::{
    BudgetPoint, BudgetStatus, CategoryTotal, GoalProgress, Ledger, MonthlyBalance, MonthlySeries,
    Transaction, YearMonth,
};

/// Everything the overview screen shows, computed in one pass over the ledger.
#[derive(Debug, Clone)]
pub struct Dashboard<'a> {
    pub month: YearMonth,
    pub balance: MonthlyBalance,
    pub budget: BudgetStatus,
    pub categories: Vec<CategoryTotal>,
    pub series: MonthlySeries,
    pub budget_series: Vec<BudgetPoint>,
    pub goals: GoalProgress,
    pub savings: i64,
    pub today: Vec<&'a Transaction>,
}

pub struct SummaryService;

impl SummaryService {
    pub fn month_of(ledger: &Ledger, month: YearMonth) -> (MonthlyBalance, BudgetStatus) {
        (ledger.monthly_balance(month), ledger.budget_status(month))
    }

    pub fn dashboard(ledger: &Ledger, today: NaiveDate) -> Dashboard<'_> {
        let month = YearMonth::of(today);
        let (balance, budget) = Self::month_of(ledger, month);
        Dashboard {
            month,
            balance,
            budget,
            categories: ledger.category_totals(),
            series: ledger.monthly_series(),
            budget_series: ledger.budget_series(),
            goals: ledger.goal_progress(today),
            savings: ledger.savings_balance(),
            today: ledger.transactions_on(today),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::TransactionKind;

    #[test]
    fn empty_ledger_dashboard_is_zeroed() {
        let ledger = Ledger::default();
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let dashboard = SummaryService::dashboard(&ledger, today);
        assert_eq!(dashboard.balance.balance, 0);
        assert!(!dashboard.budget.is_over());
        assert!(dashboard.categories.is_empty());
        assert!(dashboard.series.is_empty());
        assert_eq!(dashboard.goals.year.percent(), 0);
        assert_eq!(dashboard.goals.trailing_18.percent(), 0);
        assert_eq!(dashboard.goals.month.percent(), 0);
        assert!(dashboard.today.is_empty());
    }

    #[test]
    fn dashboard_reflects_current_month() {
        let mut ledger = Ledger::default();
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        ledger.add_transaction(Transaction::new(today, TransactionKind::Expense, "food", 1_500));
        ledger.add_transaction(Transaction::new(
            NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            TransactionKind::Income,
            "salary",
            9_000,
        ));
        let dashboard = SummaryService::dashboard(&ledger, today);
        assert_eq!(dashboard.month.to_string(), "2024-06");
        assert_eq!(dashboard.balance.expense, 1_500);
        assert_eq!(dashboard.balance.income, 0);
        assert_eq!(dashboard.series.len(), 2);
        assert_eq!(dashboard.today.len(), 1);
    }
}
