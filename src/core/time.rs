use chrono::{Local, NaiveDate};

/// Clock abstracts access to the current date so the engine stays deterministic in tests.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Clock backed by the local system date.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock pinned to a single date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
