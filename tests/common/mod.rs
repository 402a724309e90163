#![allow(dead_code)]

use chrono::NaiveDate;
use kakeibo_core::{
    core::{ledger_manager::LedgerManager, time::FixedClock},
    storage::{JsonFileStore, MemoryStore},
};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

/// Manager over an in-memory store with the clock pinned to `today`.
pub fn memory_manager(today: NaiveDate) -> LedgerManager {
    LedgerManager::open(Box::new(MemoryStore::new()), Box::new(FixedClock(today)))
        .expect("open in-memory ledger")
}

/// Temp directory holding a JSON store path; keep the guard alive for the test.
pub fn store_dir() -> (TempDir, PathBuf) {
    let temp = TempDir::new().expect("create temp dir");
    let path = temp.path().join("store.json");
    (temp, path)
}

pub fn file_manager(path: &Path, today: NaiveDate) -> LedgerManager {
    let store = JsonFileStore::open(path).expect("open json store");
    LedgerManager::open(Box::new(store), Box::new(FixedClock(today))).expect("open ledger")
}
