pub mod ledger_manager;
pub mod services;
pub mod time;

pub use ledger_manager::LedgerManager;
pub use time::{Clock, FixedClock, SystemClock};
