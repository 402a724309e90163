#![doc(test(attr(deny(warnings))))]

//! Kakeibo Core keeps a household ledger of income and expense, a savings balance
//! fed by income, and the monthly and goal summaries computed from both.

pub mod cli;
pub mod config;
pub mod core;
pub mod errors;
pub mod ledger;
pub mod reports;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Kakeibo Core tracing initialized.");
    });
}
