use std::{fmt, str::FromStr};

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::LedgerError;

/// Calendar month key rendered as `YYYY-MM`.
///
/// Field order makes the derived ordering chronological, which matches the
/// lexicographic order of the rendered keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self, LedgerError> {
        if !(1..=12).contains(&month) {
            return Err(LedgerError::Validation(format!(
                "month must be between 1 and 12, got {month}"
            )));
        }
        Ok(Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        // `month` is validated on construction, so day one always exists.
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn last_day(&self) -> NaiveDate {
        let days = days_in_month(self.year, self.month);
        NaiveDate::from_ymd_opt(self.year, self.month, days).unwrap_or(NaiveDate::MAX)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = LedgerError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || LedgerError::Validation(format!("`{value}` is not a YYYY-MM month"));
        let (year, month) = value.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year = year.parse::<i32>().map_err(|_| invalid())?;
        let month = month.parse::<u32>().map_err(|_| invalid())?;
        YearMonth::new(year, month)
    }
}

impl TryFrom<String> for YearMonth {
    type Error = LedgerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<YearMonth> for String {
    fn from(value: YearMonth) -> Self {
        value.to_string()
    }
}

/// Inclusive date range used by the goal windows.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, LedgerError> {
        if end < start {
            return Err(LedgerError::Validation(
                "window end must not precede start".into(),
            ));
        }
        Ok(Self { start, end })
    }

    /// January 1 of `now`'s year through `now`.
    pub fn year_to_date(now: NaiveDate) -> Self {
        let start = NaiveDate::from_ymd_opt(now.year(), 1, 1).unwrap_or(now);
        Self { start, end: now }
    }

    /// `months` calendar months before `now` through `now`.
    pub fn trailing_months(now: NaiveDate, months: u32) -> Self {
        Self {
            start: shift_month(now, -(months as i32)),
            end: now,
        }
    }

    /// First day of `now`'s month through `now`.
    pub fn month_to_date(now: NaiveDate) -> Self {
        Self {
            start: YearMonth::of(now).first_day(),
            end: now,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// Moves `date` by whole calendar months, clamping the day to the target month's length.
pub fn shift_month(date: NaiveDate, months: i32) -> NaiveDate {
    let index = date.year() * 12 + date.month0() as i32 + months;
    let year = index.div_euclid(12);
    let month = index.rem_euclid(12) as u32 + 1;
    let day = date.day().min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(date)
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .map(|first_next| (first_next - Duration::days(1)).day())
        .unwrap_or(28)
}
