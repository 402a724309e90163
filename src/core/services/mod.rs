pub mod recurrence_service;
pub mod savings_service;
pub mod summary_service;
pub mod transaction_service;

pub use recurrence_service::RecurrenceService;
pub use savings_service::SavingsService;
pub use summary_service::{Dashboard, SummaryService};
pub use transaction_service::{Removal, RemovalPreview, TransactionService};

use crate::errors::LedgerError;

pub type ServiceResult<T> = Result<T, LedgerError>;
