//! Ledger domain models and the pure computations over them.

#[allow(clippy::module_inception)]
pub mod ledger;
pub mod period;
pub mod recurring;
pub mod savings;
pub mod settings;
pub mod summary;
pub mod transaction;

pub use ledger::Ledger;
pub use period::{DateWindow, YearMonth};
pub use recurring::{materialize_month, RecurringSeries};
pub use savings::{ReversalDecision, SavingsAdjustment, SavingsBalance, SavingsReversal};
pub use settings::{SettingKey, Settings, DEFAULT_BUDGET, DEFAULT_GOAL_18, DEFAULT_GOAL_YEAR};
pub use summary::{
    BudgetPoint, BudgetState, BudgetStatus, CategoryTotal, GoalProgress, MonthlyBalance,
    MonthlySeries, ProgressBand, WindowProgress,
};
pub use transaction::{Transaction, TransactionDraft, TransactionKind};
